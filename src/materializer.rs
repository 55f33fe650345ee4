//! Find-or-create of folder chains.
//!
//! Nothing here guards against concurrent callers: two runs racing on the
//! same path can both create a folder, and the store will keep both.

use tracing::info;

use crate::error::{DriveError, Result};
use crate::gateway::DriveGateway;
use crate::models::CreateRequest;
use crate::resolver::Resolver;

impl<G: DriveGateway> Resolver<G> {
    /// Make sure a folder named `name` exists under `parent_id` and return its ID.
    ///
    /// With `reuse_existing`, an existing folder is returned without any create
    /// call. Otherwise a new folder is always created, even next to a
    /// same-named sibling.
    pub async fn ensure_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        drive_id: &str,
        reuse_existing: bool,
    ) -> Result<String> {
        if reuse_existing {
            if let Some(folder_id) = self
                .resolve_folder_id(name, parent_id, drive_id, false)
                .await?
            {
                return Ok(folder_id);
            }
        }

        let response = self
            .gateway
            .create(CreateRequest::folder(name, parent_id, drive_id))
            .await?;

        let folder_id = response
            .id
            .ok_or_else(|| DriveError::CreationFailed(format!("folder {}", name)))?;

        info!(folder = name, folder_id = %folder_id, "created folder");
        Ok(folder_id)
    }

    /// Materialize `names` as a nested chain below `initial_parent`.
    ///
    /// Returns the deepest folder's ID; an empty chain returns `initial_parent`.
    pub async fn ensure_folder_path<S: AsRef<str>>(
        &self,
        names: &[S],
        drive_id: &str,
        initial_parent: Option<String>,
        reuse_existing: bool,
    ) -> Result<Option<String>> {
        let mut parent_id = initial_parent;
        for name in names {
            let folder_id = self
                .ensure_folder(name.as_ref(), parent_id.as_deref(), drive_id, reuse_existing)
                .await?;
            parent_id = Some(folder_id);
        }
        Ok(parent_id)
    }
}
