//! Google Drive API client for Shared Drive operations.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::debug;

use crate::auth::Authenticator;
use crate::error::{DriveError, Result};
use crate::gateway::DriveGateway;
use crate::models::{
    ApiErrorResponse, CreateRequest, Drive, DriveListResponse, FileListResponse, FileMetadata,
    Media, ResourceResponse,
};

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Upload URL for Google Drive API.
const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Fields requested from files.list.
const FILE_LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, webViewLink)";

/// Fields requested from files.create and files.update.
const RESOURCE_FIELDS: &str = "id,webViewLink";

/// Client for Google Drive, scoped to Shared Drives.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    /// Create a new DriveClient talking to the public Google endpoints.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_endpoints(auth, DRIVE_API_BASE, UPLOAD_API_BASE)
    }

    /// Create a DriveClient against custom API and upload base URLs.
    ///
    /// # Arguments
    /// * `api_base` - Base of the metadata API, e.g. `https://www.googleapis.com/drive/v3`
    /// * `upload_base` - Base of the upload API, e.g. `https://www.googleapis.com/upload/drive/v3`
    pub fn with_endpoints(
        auth: Authenticator,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            upload_base: upload_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Metadata for a new resource. Shared drive roots are addressed by the drive ID.
    fn resource_body(request: &CreateRequest) -> serde_json::Value {
        let parent = request.parent_id.as_deref().unwrap_or(&request.drive_id);
        let mut body = serde_json::json!({
            "name": request.name,
            "parents": [parent],
        });
        if let Some(mime_type) = &request.mime_type {
            body["mimeType"] = serde_json::Value::String(mime_type.clone());
        }
        body
    }

    async fn create_metadata_only(&self, request: &CreateRequest) -> Result<ResourceResponse> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .post(format!("{}/files", self.api_base))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", RESOURCE_FIELDS)])
            .json(&Self::resource_body(request))
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn create_multipart(
        &self,
        request: &CreateRequest,
        media: &Media,
    ) -> Result<ResourceResponse> {
        let token = self.auth.get_access_token().await?;

        let metadata_part =
            Part::text(Self::resource_body(request).to_string()).mime_str("application/json")?;

        let file_part = Part::bytes(media.bytes.clone())
            .file_name(request.name.clone())
            .mime_str(&media.mime_type)?;

        let form = Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&token)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", RESOURCE_FIELDS),
            ])
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DriveGateway for DriveClient {
    async fn list_drives(&self) -> Result<Vec<Drive>> {
        let token = self.auth.get_access_token().await?;
        let mut all_drives = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/drives", self.api_base))
                .bearer_auth(&token)
                .query(&[
                    ("pageSize", "100"),
                    ("fields", "nextPageToken, drives(id, name)"),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = check_status(request.send().await?).await?;
            let list_response: DriveListResponse = response.json().await?;
            all_drives.extend(list_response.drives);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = all_drives.len(), "listed shared drives");
        Ok(all_drives)
    }

    async fn list_files(&self, query: &str, drive_id: &str) -> Result<Vec<FileMetadata>> {
        let token = self.auth.get_access_token().await?;
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/files", self.api_base))
                .bearer_auth(&token)
                .query(&[
                    ("q", query),
                    ("driveId", drive_id),
                    ("corpora", "drive"),
                    ("includeItemsFromAllDrives", "true"),
                    ("supportsAllDrives", "true"),
                    ("fields", FILE_LIST_FIELDS),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = check_status(request.send().await?).await?;
            let list_response: FileListResponse = response.json().await?;
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(query, count = all_files.len(), "listed files");
        Ok(all_files)
    }

    async fn create(&self, request: CreateRequest) -> Result<ResourceResponse> {
        match &request.media {
            Some(media) => self.create_multipart(&request, media).await,
            None => self.create_metadata_only(&request).await,
        }
    }

    async fn update(&self, file_id: &str, media: Media) -> Result<ResourceResponse> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .patch(format!("{}/files/{}", self.upload_base, file_id))
            .bearer_auth(&token)
            .query(&[
                ("uploadType", "media"),
                ("supportsAllDrives", "true"),
                ("fields", RESOURCE_FIELDS),
            ])
            .header("Content-Type", media.mime_type)
            .body(media.bytes)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .get(format!("{}/files/{}/export", self.api_base, file_id))
            .bearer_auth(&token)
            .query(&[("mimeType", mime_type)])
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .get(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(&token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;

        let response = check_status(response).await?;

        let mut content = Vec::new();
        let mut chunks = 0usize;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            content.extend_from_slice(&chunk);
            chunks += 1;
        }

        debug!(file_id, chunks, bytes = content.len(), "downloaded file");
        Ok(content)
    }
}

/// Pass successful responses through; turn anything else into `DriveError::Api`.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::Api {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::Api {
        status: status.as_u16(),
        message: error_body,
    })
}
