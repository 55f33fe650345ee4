//! Reading, writing and uploading files addressed by Drive path.

use std::path::Path;

use tracing::{debug, info};

use crate::auth::Authenticator;
use crate::client::DriveClient;
use crate::error::{DriveError, Result};
use crate::gateway::DriveGateway;
use crate::models::{CreateRequest, Media, ResourceResponse, MIME_TYPE_XLSX};
use crate::path::{DrivePath, FolderPath};
use crate::resolver::{DriveCache, ResourceQuery, Resolver};
use crate::table::{ReadOptions, Table, TableFormat};
use crate::url_parser::{file_url, parse_url, UrlKind};

/// Where to read a table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadSource {
    /// A `/spreadsheets/d/<id>` or `/file/d/<id>` URL.
    Url(String),
    /// A `drive/folders.../file` path.
    Path(String),
}

impl ReadSource {
    /// Build a source from two optional inputs, exactly one of which must be set.
    pub fn from_parts(url: Option<String>, path: Option<String>) -> Result<Self> {
        match (url, path) {
            (Some(url), None) => Ok(ReadSource::Url(url)),
            (None, Some(path)) => Ok(ReadSource::Path(path)),
            (None, None) => Err(DriveError::InvalidReadSource(
                "must provide either path or url".to_string(),
            )),
            (Some(_), Some(_)) => Err(DriveError::InvalidReadSource(
                "must provide either path or url, not both".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for ReadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadSource::Url(url) => f.write_str(url),
            ReadSource::Path(path) => f.write_str(path),
        }
    }
}

/// Reads and writes tables on shared drives by path.
///
/// # Example
///
/// ```no_run
/// use share_table::{ReadSource, TableClient};
///
/// #[tokio::main]
/// async fn main() -> share_table::Result<()> {
///     let client = TableClient::from_env()?;
///     let table = client
///         .read(ReadSource::Path("TeamDrive/Reports/2023/summary.xlsx".into()), &Default::default())
///         .await?;
///     let url = client.write(&table, "TeamDrive/Reports/2023/copy.csv", false).await?;
///     println!("{}", url);
///     Ok(())
/// }
/// ```
pub struct TableClient<G> {
    resolver: Resolver<G>,
}

impl TableClient<DriveClient> {
    /// Build an HTTP-backed client from `GOOGLE_DRIVE_CREDENTIALS`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(DriveClient::new(Authenticator::from_env()?)))
    }
}

impl<G: DriveGateway> TableClient<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            resolver: Resolver::new(gateway),
        }
    }

    pub fn with_cache(gateway: G, cache: DriveCache) -> Self {
        Self {
            resolver: Resolver::with_cache(gateway, cache),
        }
    }

    pub fn resolver(&self) -> &Resolver<G> {
        &self.resolver
    }

    /// Resolve a file path to its ID, or `None` if any segment is missing.
    pub async fn find_file_id(&self, path: &str) -> Result<Option<String>> {
        self.resolver.resolve_file_id(path, false).await
    }

    /// Materialize a `drive/folders...` path and return the deepest folder's ID,
    /// or `None` for a bare drive name.
    pub async fn make_folders(&self, path: &str) -> Result<Option<String>> {
        let path = FolderPath::parse(path)?;
        let drive_id = self.resolver.resolve_drive(&path.drive).await?;
        self.resolver
            .ensure_folder_path(&path.folders, &drive_id, None, true)
            .await
    }

    /// Read a table from a URL or a path.
    pub async fn read(&self, source: ReadSource, options: &ReadOptions) -> Result<Table> {
        let url = match &source {
            ReadSource::Url(url) => url.clone(),
            ReadSource::Path(path) => {
                let file_id = self
                    .resolver
                    .resolve_file_id(path, false)
                    .await?
                    .ok_or_else(|| {
                        DriveError::NotFound(format!("unable to find file on Drive: {}", path))
                    })?;
                file_url(&file_id)
            }
        };

        let content = self.fetch(&url).await?;
        debug!(%source, bytes = content.len(), "fetched file content");
        Table::parse(&content, options)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let (kind, file_id) = parse_url(url)?;
        match kind {
            UrlKind::Spreadsheet => {
                self.resolver
                    .gateway
                    .export(&file_id, MIME_TYPE_XLSX)
                    .await
            }
            UrlKind::File => self.resolver.gateway.download(&file_id).await,
        }
    }

    /// Write `table` to `path`, choosing CSV or XLSX from the file extension.
    ///
    /// Missing folders are created. An existing file is replaced when
    /// `overwrite` is set and is an [`DriveError::AlreadyExists`] error
    /// otherwise. Returns the file's web link.
    pub async fn write(&self, table: &Table, path: &str, overwrite: bool) -> Result<String> {
        let drive_path = DrivePath::parse(path)?;
        let format = TableFormat::from_path(&drive_path.leaf)?;

        let drive_id = self.resolver.resolve_drive(&drive_path.drive).await?;
        let parent_id = self
            .resolver
            .ensure_folder_path(&drive_path.folders, &drive_id, None, true)
            .await?;

        let media = Media::new(table.to_bytes(format)?, format.mime_type());

        let query = ResourceQuery::named(&drive_path.leaf).in_parent(parent_id.as_deref());
        let response = match self.resolver.find_resource(&query, &drive_id).await? {
            Some(_) if !overwrite => return Err(DriveError::AlreadyExists(path.to_string())),
            Some(existing) => {
                info!(path, file_id = %existing.id, "overwriting file");
                self.resolver.gateway.update(&existing.id, media).await?
            }
            None => {
                info!(path, "creating file");
                let request = CreateRequest::file(
                    &drive_path.leaf,
                    parent_id.as_deref(),
                    &drive_id,
                    media,
                );
                self.resolver.gateway.create(request).await?
            }
        };

        web_link(response, path)
    }

    /// Upload a local file's raw bytes to `path`.
    ///
    /// Unlike [`write`](Self::write), this never looks for an existing file:
    /// it always creates, so repeated uploads leave same-named siblings.
    pub async fn upload(&self, local_path: impl AsRef<Path>, path: &str) -> Result<String> {
        let local_path = local_path.as_ref();
        if !local_path.is_file() {
            return Err(DriveError::NotFound(format!(
                "local file {} does not exist",
                local_path.display()
            )));
        }

        let drive_path = DrivePath::parse(path)?;
        let drive_id = self.resolver.resolve_drive(&drive_path.drive).await?;
        let parent_id = self
            .resolver
            .ensure_folder_path(&drive_path.folders, &drive_id, None, true)
            .await?;

        let bytes = tokio::fs::read(local_path).await?;
        let mime_type = mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .to_string();

        info!(path, bytes = bytes.len(), "uploading file");
        let request = CreateRequest::file(
            &drive_path.leaf,
            parent_id.as_deref(),
            &drive_id,
            Media::new(bytes, mime_type),
        );
        let response = self.resolver.gateway.create(request).await?;

        web_link(response, path)
    }
}

fn web_link(response: ResourceResponse, path: &str) -> Result<String> {
    response
        .web_view_link
        .filter(|link| !link.is_empty())
        .ok_or_else(|| DriveError::MissingResponseField {
            field: "webViewLink",
            context: path.to_string(),
        })
}
