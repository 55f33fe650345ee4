//! The remote operations the resolver and the table operations are built on.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CreateRequest, Drive, FileMetadata, Media, ResourceResponse};

/// Operations against a drive store that addresses resources by opaque IDs.
///
/// [`DriveClient`](crate::client::DriveClient) implements this against the
/// Google Drive v3 REST API. Every call is a single round trip with no retry.
#[async_trait]
pub trait DriveGateway: Send + Sync {
    /// List every shared drive the account can see.
    async fn list_drives(&self) -> Result<Vec<Drive>>;

    /// List the files of `drive_id` matching a Drive query expression.
    async fn list_files(&self, query: &str, drive_id: &str) -> Result<Vec<FileMetadata>>;

    /// Create a file or folder.
    async fn create(&self, request: CreateRequest) -> Result<ResourceResponse>;

    /// Replace the content of an existing file.
    async fn update(&self, file_id: &str, media: Media) -> Result<ResourceResponse>;

    /// Export a Google-native document converted to `mime_type`.
    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>>;

    /// Download the stored bytes of a file.
    async fn download(&self, file_id: &str) -> Result<Vec<u8>>;
}
