//! In-memory `DriveGateway` that records how often each operation is called.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use share_table::error::{DriveError, Result};
use share_table::gateway::DriveGateway;
use share_table::models::{
    CreateRequest, Drive, FileMetadata, Media, ResourceResponse, MIME_TYPE_FOLDER,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calls {
    pub list_drives: usize,
    pub list_files: usize,
    pub create: usize,
    pub update: usize,
    pub export: usize,
    pub download: usize,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub drive_id: String,
    /// Shared drive roots are parented by the drive ID.
    pub parent: String,
    pub mime_type: Option<String>,
    pub trashed: bool,
    pub content: Vec<u8>,
}

#[derive(Default)]
struct State {
    drives: Vec<Drive>,
    files: Vec<StoredFile>,
    next_id: usize,
    calls: Calls,
    fail_list_drives: bool,
    empty_create_response: bool,
    queries: Vec<String>,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drive(self, name: &str, id: &str) -> Self {
        self.state.lock().unwrap().drives.push(Drive {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn failing_drive_listing(self) -> Self {
        self.state.lock().unwrap().fail_list_drives = true;
        self
    }

    pub fn with_empty_create_response(self) -> Self {
        self.state.lock().unwrap().empty_create_response = true;
        self
    }

    pub fn add_folder(&self, name: &str, parent: Option<&str>, drive_id: &str) -> String {
        self.insert(name, parent, drive_id, Some(MIME_TYPE_FOLDER), false, Vec::new())
    }

    pub fn add_file(
        &self,
        name: &str,
        parent: Option<&str>,
        drive_id: &str,
        content: &[u8],
    ) -> String {
        self.insert(name, parent, drive_id, None, false, content.to_vec())
    }

    pub fn add_trashed_file(&self, name: &str, parent: Option<&str>, drive_id: &str) -> String {
        self.insert(name, parent, drive_id, None, true, Vec::new())
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn file(&self, id: &str) -> Option<StoredFile> {
        let state = self.state.lock().unwrap();
        state.files.iter().find(|f| f.id == id).cloned()
    }

    pub fn children(&self, parent: &str, name: &str) -> Vec<StoredFile> {
        let state = self.state.lock().unwrap();
        state
            .files
            .iter()
            .filter(|f| f.parent == parent && f.name == name)
            .cloned()
            .collect()
    }

    fn insert(
        &self,
        name: &str,
        parent: Option<&str>,
        drive_id: &str,
        mime_type: Option<&str>,
        trashed: bool,
        content: Vec<u8>,
    ) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("id-{}", state.next_id);
        state.files.push(StoredFile {
            id: id.clone(),
            name: name.to_string(),
            drive_id: drive_id.to_string(),
            parent: parent.unwrap_or(drive_id).to_string(),
            mime_type: mime_type.map(str::to_string),
            trashed,
            content,
        });
        id
    }

    fn link(id: &str) -> Option<String> {
        Some(format!("https://drive.google.com/file/d/{}/view", id))
    }
}

fn unquote(value: &str) -> String {
    value
        .trim_matches('\'')
        .replace("\\'", "'")
        .replace("\\\\", "\\")
}

/// Evaluate the subset of the Drive query language the resolver emits.
fn matches(file: &StoredFile, query: &str) -> bool {
    query.split(" and ").all(|clause| {
        if let Some(name) = clause.strip_prefix("name = ") {
            file.name == unquote(name)
        } else if let Some(parent) = clause.strip_suffix(" in parents") {
            file.parent == unquote(parent)
        } else if let Some(trashed) = clause.strip_prefix("trashed = ") {
            file.trashed == (trashed == "true")
        } else if let Some(mime_type) = clause.strip_prefix("mimeType = ") {
            file.mime_type.as_deref() == Some(unquote(mime_type).as_str())
        } else {
            panic!("unexpected query clause: {clause}")
        }
    })
}

#[async_trait]
impl DriveGateway for FakeGateway {
    async fn list_drives(&self) -> Result<Vec<Drive>> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_drives += 1;
        if state.fail_list_drives {
            return Err(DriveError::Api {
                status: 500,
                message: "backend error".to_string(),
            });
        }
        Ok(state.drives.clone())
    }

    async fn list_files(&self, query: &str, drive_id: &str) -> Result<Vec<FileMetadata>> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_files += 1;
        state.queries.push(query.to_string());
        Ok(state
            .files
            .iter()
            .filter(|f| f.drive_id == drive_id && matches(f, query))
            .map(|f| FileMetadata {
                id: f.id.clone(),
                name: f.name.clone(),
                mime_type: f.mime_type.clone(),
                web_view_link: Self::link(&f.id),
            })
            .collect())
    }

    async fn create(&self, request: CreateRequest) -> Result<ResourceResponse> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.create += 1;
            if state.empty_create_response {
                return Ok(ResourceResponse::default());
            }
        }

        let (mime_type, content) = match request.media {
            Some(media) => (request.mime_type.or(Some(media.mime_type)), media.bytes),
            None => (request.mime_type, Vec::new()),
        };
        let id = self.insert(
            &request.name,
            request.parent_id.as_deref(),
            &request.drive_id,
            mime_type.as_deref(),
            false,
            content,
        );

        Ok(ResourceResponse {
            web_view_link: Self::link(&id),
            id: Some(id),
        })
    }

    async fn update(&self, file_id: &str, media: Media) -> Result<ResourceResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.update += 1;
        let file = state
            .files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| DriveError::NotFound(file_id.to_string()))?;
        file.content = media.bytes;
        file.mime_type = Some(media.mime_type);

        Ok(ResourceResponse {
            id: Some(file_id.to_string()),
            web_view_link: Self::link(file_id),
        })
    }

    async fn export(&self, file_id: &str, _mime_type: &str) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.calls.export += 1;
        state
            .files
            .iter()
            .find(|f| f.id == file_id)
            .map(|f| f.content.clone())
            .ok_or_else(|| DriveError::Api {
                status: 404,
                message: format!("File not found: {}", file_id),
            })
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.calls.download += 1;
        state
            .files
            .iter()
            .find(|f| f.id == file_id)
            .map(|f| f.content.clone())
            .ok_or_else(|| DriveError::Api {
                status: 404,
                message: format!("File not found: {}", file_id),
            })
    }
}
