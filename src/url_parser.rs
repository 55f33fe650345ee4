//! URL parser for extracting Google Drive IDs from file and spreadsheet URLs.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// Matches `/spreadsheets/d/<ID>` and `/file/d/<ID>`, case-insensitively.
static DRIVE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(spreadsheets|file)/d/([^&#/]*)").expect("Invalid Drive URL regex")
});

/// What a Drive URL points at, which decides how its content is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// A Google Sheets document; must be exported.
    Spreadsheet,
    /// Any stored file; downloaded as-is.
    File,
}

/// Extract the resource kind and ID from a Drive URL.
///
/// Supports URLs such as:
/// - `https://docs.google.com/spreadsheets/d/<ID>/edit#gid=0`
/// - `https://drive.google.com/file/d/<ID>/view`
///
/// # Examples
///
/// ```
/// use share_table::url_parser::{parse_url, UrlKind};
///
/// let (kind, id) = parse_url("https://docs.google.com/spreadsheets/d/1abc/edit").unwrap();
/// assert_eq!(kind, UrlKind::Spreadsheet);
/// assert_eq!(id, "1abc");
/// ```
pub fn parse_url(url: &str) -> Result<(UrlKind, String)> {
    let captures = DRIVE_URL_REGEX
        .captures(url)
        .ok_or_else(|| DriveError::UnparsableUrl(url.to_string()))?;

    let kind = if captures[1].eq_ignore_ascii_case("spreadsheets") {
        UrlKind::Spreadsheet
    } else {
        UrlKind::File
    };

    Ok((kind, captures[2].to_string()))
}

/// Build the generic file URL for a resource ID.
pub fn file_url(file_id: &str) -> String {
    format!("https://docs.google.com/file/d/{}", file_id)
}
