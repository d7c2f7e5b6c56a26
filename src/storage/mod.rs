use crate::{
    domain::Board,
    error::Result,
    snapshot::{self, SnapshotToken},
};
use async_trait::async_trait;
use tracing::warn;

pub mod file_storage;

pub use file_storage::FileStorage;

/// Best-effort, client-local persistence of the snapshot token
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Replaces the stored snapshot
    async fn save_snapshot(&self, token: &SnapshotToken) -> Result<()>;

    /// Loads the stored snapshot, if one was ever saved
    async fn load_snapshot(&self) -> Result<Option<SnapshotToken>>;

    /// Checks if the storage has been initialized
    async fn is_initialized(&self) -> bool;
}

/// Loads boards from storage. Read failures and unreadable snapshots fall
/// back to the seed dataset.
pub async fn load_boards(storage: &dyn Storage) -> Vec<Board> {
    let token = match storage.load_snapshot().await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "could not read stored snapshot");
            None
        }
    };
    snapshot::load_or_seed(token.as_ref())
}
