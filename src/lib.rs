//! share_table - Read and write tables on Google Shared Drives by path.
//!
//! Files are addressed as `drive/folder1/folder2/file.csv` instead of by ID.
//! This library provides functionality to:
//! - Resolve such paths to Drive IDs, folder by folder
//! - Create missing folders on the way to a file
//! - Read CSV and XLSX files (and Google Sheets) into a [`Table`]
//! - Write a [`Table`] as CSV or XLSX, optionally overwriting
//! - Upload arbitrary local files
//!
//! # Example
//!
//! ```no_run
//! use share_table::{Authenticator, DriveClient, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Authenticator::from_env()?;
//!     let resolver = Resolver::new(DriveClient::new(auth));
//!
//!     if let Some(id) = resolver.resolve_file_id("TeamDrive/Reports/summary.xlsx", false).await? {
//!         println!("{}", id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod gateway;
pub mod materializer;
pub mod models;
pub mod path;
pub mod resolver;
pub mod table;
pub mod transfer;
pub mod url_parser;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::DriveClient;
pub use error::{DriveError, Result};
pub use gateway::DriveGateway;
pub use models::FileMetadata;
pub use path::{DrivePath, FolderPath};
pub use resolver::{DriveCache, ResourceQuery, Resolver};
pub use table::{ReadOptions, Table, TableFormat, Value};
pub use transfer::{ReadSource, TableClient};
pub use url_parser::parse_url;
