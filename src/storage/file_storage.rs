use crate::{error::Result, snapshot::SnapshotToken, storage::Storage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage implementation
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const LANEBOARD_DIR: &'static str = ".laneboard";
    const SNAPSHOT_FILE: &'static str = "snapshot.txt";

    /// Creates a new FileStorage instance rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().join(Self::LANEBOARD_DIR),
        }
    }

    fn snapshot_file(&self) -> PathBuf {
        self.root_path.join(Self::SNAPSHOT_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await
    }

    async fn save_snapshot(&self, token: &SnapshotToken) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        // Replace atomically through a temp file
        let tmp = self.root_path.join(format!("{}.tmp", Self::SNAPSHOT_FILE));
        fs::write(&tmp, token.as_str()).await?;
        fs::rename(&tmp, self.snapshot_file()).await?;
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<SnapshotToken>> {
        let file_path = self.snapshot_file();

        if !file_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(Some(SnapshotToken::from(contents)))
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{seed_boards, Board},
        snapshot,
        storage::load_boards,
    };
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(!storage.is_initialized().await);

        storage.initialize().await.unwrap();

        assert!(storage.is_initialized().await);
        assert!(storage.load_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        let token = snapshot::serialize(&seed_boards()).unwrap();
        storage.save_snapshot(&token).await.unwrap();

        assert_eq!(storage.load_snapshot().await.unwrap(), Some(token));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let boards = vec![Board::new("Only")];
        storage
            .save_snapshot(&snapshot::serialize(&seed_boards()).unwrap())
            .await
            .unwrap();
        storage
            .save_snapshot(&snapshot::serialize(&boards).unwrap())
            .await
            .unwrap();

        assert_eq!(load_boards(&storage).await, boards);
    }

    #[tokio::test]
    async fn test_load_boards_without_snapshot_uses_seed() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert_eq!(load_boards(&storage).await, seed_boards());
    }

    #[tokio::test]
    async fn test_load_boards_with_corrupt_snapshot_uses_seed() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage
            .save_snapshot(&SnapshotToken::from("garbage!"))
            .await
            .unwrap();

        assert_eq!(load_boards(&storage).await, seed_boards());
    }
}
