//! Record storage for per-URL modification histories.
//!
//! The whole store is read into memory, mutated by merging update deltas
//! and written back in one piece. Persisted form:
//!
//! ```text
//! {
//!   "https://example.com": ["2020-01-01T00:00:00Z", "2020-02-01T00:00:00Z"]
//! }
//! ```

pub mod local;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{History, Records, UpdateDelta};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for record persistence backends.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Read the persisted bytes, `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the persisted bytes.
    async fn save(&self, bytes: &[u8]) -> Result<()>;
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding previously saved bytes.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
        }
    }

    /// Snapshot of the currently saved bytes.
    pub fn bytes(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.slot()?.clone())
    }

    fn slot(&self) -> Result<MutexGuard<'_, Option<Vec<u8>>>> {
        self.bytes
            .lock()
            .map_err(|_| AppError::storage("memory storage lock poisoned"))
    }
}

#[async_trait]
impl StoreBackend for MemoryStorage {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        self.bytes()
    }

    async fn save(&self, bytes: &[u8]) -> Result<()> {
        *self.slot()? = Some(bytes.to_vec());
        Ok(())
    }
}

/// All known modification histories, keyed by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Records,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a store. Empty input yields an empty store.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        let records: Records = serde_json::from_slice(bytes).map_err(AppError::StoreParse)?;
        Ok(Self { records })
    }

    /// Serialize the full store.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.records)?)
    }

    /// Load the store from a backend, starting empty if nothing was saved.
    pub async fn load(backend: &dyn StoreBackend) -> Result<Self> {
        match backend.load().await? {
            Some(bytes) => {
                let store = Self::from_bytes(&bytes)?;
                log::info!("Loaded records for {} URLs", store.len());
                Ok(store)
            }
            None => {
                log::info!("No saved records found, starting empty");
                Ok(Self::new())
            }
        }
    }

    /// Persist the full store to a backend.
    pub async fn save(&self, backend: &dyn StoreBackend) -> Result<()> {
        backend.save(&self.to_bytes()?).await?;
        log::info!("Saved records for {} URLs", self.len());
        Ok(())
    }

    /// Histories for the requested URLs.
    ///
    /// Every requested URL is present in the result; unknown URLs map to
    /// an empty history.
    pub fn query(&self, urls: &[String]) -> Records {
        urls.iter()
            .map(|url| {
                let history = self.records.get(url).cloned().unwrap_or_default();
                (url.clone(), history)
            })
            .collect()
    }

    /// Overwrite the histories of every URL in `delta`.
    pub fn merge(&mut self, delta: UpdateDelta) {
        self.records.extend(delta);
    }

    pub fn get(&self, url: &str) -> Option<&History> {
        self.records.get(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Records> for RecordStore {
    fn from(records: Records) -> Self {
        Self { records }
    }
}
