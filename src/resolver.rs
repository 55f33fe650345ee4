//! Resolution of human-readable Drive paths to resource IDs.
//!
//! The remote store is flat and tolerates same-named siblings, so every
//! lookup insists on at most one match and reports anything more as
//! [`DriveError::Ambiguous`] instead of picking one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DriveError, Result};
use crate::gateway::DriveGateway;
use crate::models::{FileMetadata, MIME_TYPE_FOLDER};
use crate::path::DrivePath;

/// Memo of shared drive name to drive ID.
///
/// Entries are never invalidated. Clones share the same map, so one cache can
/// serve several resolvers; build separate caches to keep tenants apart.
#[derive(Clone, Default)]
pub struct DriveCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl DriveCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, name: &str) -> Option<String> {
        self.entries.read().await.get(name).cloned()
    }

    pub async fn insert(&self, name: &str, drive_id: &str) {
        self.entries
            .write()
            .await
            .insert(name.to_string(), drive_id.to_string());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Filter for a single-resource lookup within a drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceQuery<'a> {
    pub name: &'a str,
    /// Restrict to direct children of this folder. `None` searches the whole drive.
    pub parent_id: Option<&'a str>,
    pub mime_type: Option<&'a str>,
    /// Match trashed resources instead of live ones.
    pub trashed: bool,
}

impl<'a> ResourceQuery<'a> {
    pub fn named(name: &'a str) -> Self {
        Self {
            name,
            parent_id: None,
            mime_type: None,
            trashed: false,
        }
    }

    pub fn in_parent(mut self, parent_id: Option<&'a str>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_mime_type(mut self, mime_type: &'a str) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    pub fn trashed(mut self, trashed: bool) -> Self {
        self.trashed = trashed;
        self
    }

    /// Render as a Drive `q` expression.
    pub fn to_query_string(&self) -> String {
        let mut query = format!("name = '{}'", escape(self.name));
        if let Some(parent_id) = self.parent_id {
            query.push_str(&format!(" and '{}' in parents", escape(parent_id)));
        }
        query.push_str(&format!(" and trashed = {}", self.trashed));
        if let Some(mime_type) = self.mime_type {
            query.push_str(&format!(" and mimeType = '{}'", escape(mime_type)));
        }
        query
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Walks drive, folder and file names down to resource IDs.
pub struct Resolver<G> {
    pub(crate) gateway: G,
    drives: DriveCache,
}

impl<G: DriveGateway> Resolver<G> {
    /// Create a resolver with a fresh drive cache.
    pub fn new(gateway: G) -> Self {
        Self::with_cache(gateway, DriveCache::new())
    }

    /// Create a resolver sharing an existing drive cache.
    pub fn with_cache(gateway: G, drives: DriveCache) -> Self {
        Self { gateway, drives }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn drive_cache(&self) -> &DriveCache {
        &self.drives
    }

    /// Resolve a shared drive name to its ID, listing drives only on a cache miss.
    pub async fn resolve_drive(&self, name: &str) -> Result<String> {
        if let Some(drive_id) = self.drives.get(name).await {
            debug!(drive = name, "drive cache hit");
            return Ok(drive_id);
        }

        let drives = self
            .gateway
            .list_drives()
            .await
            .map_err(|e| DriveError::LookupFailed {
                what: "Google Drives".to_string(),
                source: Box::new(e),
            })?;

        let drive = drives
            .into_iter()
            .find(|drive| drive.name == name)
            .ok_or_else(|| {
                DriveError::NotFound(format!("no Google Drive named {} for this account", name))
            })?;

        debug!(drive = name, drive_id = %drive.id, "resolved drive");
        self.drives.insert(name, &drive.id).await;
        Ok(drive.id)
    }

    /// Find the single resource matching `query` in `drive_id`.
    ///
    /// Returns `Ok(None)` when nothing matches and [`DriveError::Ambiguous`]
    /// when more than one resource does.
    pub async fn find_resource(
        &self,
        query: &ResourceQuery<'_>,
        drive_id: &str,
    ) -> Result<Option<FileMetadata>> {
        let mut files = self
            .gateway
            .list_files(&query.to_query_string(), drive_id)
            .await?;

        match files.len() {
            0 => Ok(None),
            1 => Ok(files.pop()),
            count => Err(DriveError::Ambiguous {
                count,
                name: query.name.to_string(),
                parent: query.parent_id.map(str::to_string),
            }),
        }
    }

    /// Find an existing folder's ID. Never creates anything.
    pub async fn resolve_folder_id(
        &self,
        name: &str,
        parent_id: Option<&str>,
        drive_id: &str,
        trashed: bool,
    ) -> Result<Option<String>> {
        let query = ResourceQuery::named(name)
            .in_parent(parent_id)
            .with_mime_type(MIME_TYPE_FOLDER)
            .trashed(trashed);

        Ok(self
            .find_resource(&query, drive_id)
            .await?
            .map(|folder| folder.id))
    }

    /// Resolve a `drive/folders.../file` path to the file's ID.
    ///
    /// A missing folder anywhere along the way makes the whole path absent.
    /// `trashed` only applies to the leaf.
    pub async fn resolve_file_id(&self, path: &str, trashed: bool) -> Result<Option<String>> {
        let path = DrivePath::parse(path)?;
        Ok(self
            .resolve_file(&path, trashed)
            .await?
            .map(|file| file.id))
    }

    /// Like [`resolve_file_id`](Self::resolve_file_id) on an already parsed path,
    /// returning the full metadata.
    pub async fn resolve_file(
        &self,
        path: &DrivePath,
        trashed: bool,
    ) -> Result<Option<FileMetadata>> {
        let drive_id = self.resolve_drive(&path.drive).await?;

        let mut parent_id: Option<String> = None;
        for folder in &path.folders {
            match self
                .resolve_folder_id(folder, parent_id.as_deref(), &drive_id, false)
                .await?
            {
                Some(folder_id) => parent_id = Some(folder_id),
                None => {
                    debug!(%path, folder = %folder, "folder missing, path is absent");
                    return Ok(None);
                }
            }
        }

        let query = ResourceQuery::named(&path.leaf)
            .in_parent(parent_id.as_deref())
            .trashed(trashed);
        self.find_resource(&query, &drive_id).await
    }
}
