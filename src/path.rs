//! Slash-delimited Drive paths: `drive/folder1/folder2/file.csv`.
//!
//! There is no escaping, so names containing `/` cannot be addressed.

use crate::error::{DriveError, Result};

/// A path to a file: drive name, folder chain, leaf name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrivePath {
    pub drive: String,
    pub folders: Vec<String>,
    pub leaf: String,
}

impl DrivePath {
    /// Split a path into drive, folders and leaf.
    ///
    /// Fails with [`DriveError::InvalidPath`] when there are fewer than two
    /// segments or when the drive or leaf segment is empty.
    pub fn parse(path: &str) -> Result<Self> {
        let mut segments: Vec<&str> = path.split('/').collect();
        if segments.len() < 2 {
            return Err(DriveError::InvalidPath(path.to_string()));
        }

        let drive = segments.remove(0);
        let leaf = segments.pop().unwrap_or_default();
        if drive.is_empty() || leaf.is_empty() {
            return Err(DriveError::InvalidPath(path.to_string()));
        }

        Ok(Self {
            drive: drive.to_string(),
            folders: segments.into_iter().map(str::to_string).collect(),
            leaf: leaf.to_string(),
        })
    }
}

impl std::fmt::Display for DrivePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/", self.drive)?;
        for folder in &self.folders {
            write!(f, "{}/", folder)?;
        }
        write!(f, "{}", self.leaf)
    }
}

/// A path to a folder: drive name followed by zero or more folder names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPath {
    pub drive: String,
    pub folders: Vec<String>,
}

impl FolderPath {
    /// Split a folder path. A trailing slash is ignored; the drive must be named.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        let mut segments = trimmed.split('/');
        let drive = segments.next().unwrap_or_default();
        if drive.is_empty() {
            return Err(DriveError::InvalidPath(path.to_string()));
        }

        Ok(Self {
            drive: drive.to_string(),
            folders: segments.map(str::to_string).collect(),
        })
    }

    /// The file path for `name` inside this folder.
    pub fn join(&self, name: &str) -> DrivePath {
        DrivePath {
            drive: self.drive.clone(),
            folders: self.folders.clone(),
            leaf: name.to_string(),
        }
    }
}
