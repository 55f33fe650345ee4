//! Error types for the share_table crate.

use thiserror::Error;

/// Errors that can occur when reading or writing tables on Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{count} resources found with name: {name} in parent: {}", .parent.as_deref().unwrap_or("<drive>"))]
    Ambiguous {
        count: usize,
        name: String,
        parent: Option<String>,
    },

    #[error("File {0} already exists")]
    AlreadyExists(String),

    #[error("Unable to create {0}")]
    CreationFailed(String),

    #[error("Response for {context} is missing field `{field}`")]
    MissingResponseField { field: &'static str, context: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Unable to parse Drive URL: {0}")]
    UnparsableUrl(String),

    #[error("Missing environment variable: {0}")]
    MissingCredentials(String),

    #[error("Invalid read source: {0}")]
    InvalidReadSource(String),

    #[error("Unable to read table: {0}")]
    TableRead(String),

    #[error("Unable to write table: {0}")]
    TableWrite(String),

    #[error("Unable to list {what}")]
    LookupFailed {
        what: String,
        #[source]
        source: Box<DriveError>,
    },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParse(#[from] serde_json::Error),

    #[error("JWT encoding error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
