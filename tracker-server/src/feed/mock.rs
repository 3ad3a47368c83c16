//! Mock position feed for running without a backend.
//!
//! Serves a snapshot JSON file as if it were the live `get_all_data`
//! response. The file is read again on every fetch, so edits show up on the
//! next poll; a file that stops parsing fails that fetch like a bad upstream
//! response would.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::client::PositionSource;
use super::convert::{ConvertedSnapshot, convert_snapshot};
use super::error::FeedError;
use super::types::RawSnapshot;

/// Mock feed that serves a snapshot loaded from disk.
#[derive(Clone)]
pub struct MockFeed {
    path: PathBuf,
    raw: Arc<RwLock<RawSnapshot>>,
    categories: Vec<String>,
}

impl MockFeed {
    /// Load the snapshot file at `path`.
    pub fn new(path: impl AsRef<Path>, categories: Vec<String>) -> Result<Self, FeedError> {
        let path = path.as_ref().to_path_buf();
        let raw = load(&path)?;

        Ok(Self {
            path,
            raw: Arc::new(RwLock::new(raw)),
            categories,
        })
    }

    /// Re-read the snapshot file.
    pub async fn reload(&self) -> Result<(), FeedError> {
        let raw = load(&self.path)?;
        *self.raw.write().await = raw;
        Ok(())
    }
}

impl PositionSource for MockFeed {
    async fn fetch_snapshot(&self) -> Result<ConvertedSnapshot, FeedError> {
        self.reload().await?;
        let raw = self.raw.read().await;
        Ok(convert_snapshot(&raw, &self.categories))
    }
}

fn load(path: &Path) -> Result<RawSnapshot, FeedError> {
    let json = std::fs::read_to_string(path).map_err(|e| FeedError::Mock {
        message: format!("Failed to read {:?}: {}", path, e),
    })?;

    serde_json::from_str(&json).map_err(|e| FeedError::Mock {
        message: format!("Failed to parse {:?}: {}", path, e),
    })
}
