//! Data models for Google Drive API requests and responses.

use serde::{Deserialize, Serialize};

/// MIME type Google Drive uses to mark folders.
pub const MIME_TYPE_FOLDER: &str = "application/vnd.google-apps.folder";

/// MIME type for comma separated values.
pub const MIME_TYPE_CSV: &str = "text/csv";

/// MIME type for Office Open XML spreadsheets.
pub const MIME_TYPE_XLSX: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Metadata for a file or folder in Google Drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Response from the files.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileMetadata>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Shared Drive metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Drive {
    pub id: String,
    pub name: String,
}

/// Response from the drives.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveListResponse {
    #[serde(default)]
    pub drives: Vec<Drive>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Response from files.create and files.update, requested with `fields=id,webViewLink`.
///
/// Both fields are optional so that a response lacking them surfaces as an
/// error in the caller rather than as a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// File content sent along with a create or update call.
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Media {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Arguments of a files.create call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub name: String,
    /// Parent folder; `None` places the resource at the drive root.
    pub parent_id: Option<String>,
    pub drive_id: String,
    pub mime_type: Option<String>,
    pub media: Option<Media>,
}

impl CreateRequest {
    /// A request creating an empty folder.
    pub fn folder(name: &str, parent_id: Option<&str>, drive_id: &str) -> Self {
        Self {
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
            drive_id: drive_id.to_string(),
            mime_type: Some(MIME_TYPE_FOLDER.to_string()),
            media: None,
        }
    }

    /// A request creating a file with the given content.
    pub fn file(name: &str, parent_id: Option<&str>, drive_id: &str, media: Media) -> Self {
        Self {
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
            drive_id: drive_id.to_string(),
            mime_type: None,
            media: Some(media),
        }
    }
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account credentials from JSON.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_metadata_deserialize() {
        let json = r#"{
            "id": "abc123",
            "name": "report.csv",
            "mimeType": "text/csv",
            "webViewLink": "https://drive.google.com/file/d/abc123/view"
        }"#;

        let metadata: FileMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.id, "abc123");
        assert_eq!(metadata.name, "report.csv");
        assert_eq!(metadata.mime_type, Some("text/csv".to_string()));
    }

    #[test]
    fn test_resource_response_tolerates_missing_fields() {
        let response: ResourceResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response, ResourceResponse::default());

        let response: ResourceResponse =
            serde_json::from_str(r#"{"id": "x", "webViewLink": "https://link"}"#).unwrap();
        assert_eq!(response.id.as_deref(), Some("x"));
        assert_eq!(response.web_view_link.as_deref(), Some("https://link"));
    }

    #[test]
    fn test_create_request_folder() {
        let request = CreateRequest::folder("2023", Some("parent"), "drive");
        assert_eq!(request.mime_type.as_deref(), Some(MIME_TYPE_FOLDER));
        assert_eq!(request.parent_id.as_deref(), Some("parent"));
        assert!(request.media.is_none());
    }
}
