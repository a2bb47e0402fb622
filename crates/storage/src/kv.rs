//! Sled-backed storage origin
//!
//! Durable counterpart of [`MemoryStorage`](crate::MemoryStorage) for native
//! shells: entries live in a sled database and survive restarts. Contexts
//! attached to the same [`SledStorage`] notify each other of writes.

use crate::hub::ContextHub;
use app_platform::{StorageArea, StorageError, StorageEvent, StorageListener, Subscription};
use sled::Db;
use std::sync::Arc;
use thiserror::Error;

/// Key-value store error types
#[derive(Debug, Error)]
pub enum KvError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Stored bytes are not valid UTF-8
    #[error("Invalid UTF-8 value: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl From<KvError> for StorageError {
    fn from(err: KvError) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Enable compression
    pub use_compression: bool,
    /// Flush interval in milliseconds (None for a flush after every write)
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "folio_kv.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            use_compression: true,
            flush_every_ms: Some(500),
        }
    }
}

impl KvConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Durable storage origin backed by sled
#[derive(Clone)]
pub struct SledStorage {
    db: Arc<Db>,
    hub: Arc<ContextHub>,
    flush_on_write: bool,
}

impl SledStorage {
    /// Open (or create) the database described by `config`
    pub fn open(config: KvConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression)
            .flush_every_ms(config.flush_every_ms)
            .open()?;

        tracing::info!("Opened key-value store at {}", config.path);
        Ok(Self {
            db: Arc::new(db),
            hub: Arc::new(ContextHub::default()),
            flush_on_write: config.flush_every_ms.is_none(),
        })
    }

    /// Create a temporary database removed on drop (for testing)
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;

        Ok(Self {
            db: Arc::new(db),
            hub: Arc::new(ContextHub::default()),
            flush_on_write: false,
        })
    }

    /// Attach a new execution context to this origin
    pub fn context(&self) -> SledContext {
        let id = self.hub.register_context();
        SledContext { storage: self.clone(), id }
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether the database holds no entries
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(String::from_utf8(bytes.to_vec())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, key: &str, value: &str) -> Result<Option<String>> {
        let old = self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.after_write()?;
        Ok(old.and_then(|bytes| String::from_utf8(bytes.to_vec()).ok()))
    }

    fn remove(&self, key: &str) -> Result<Option<String>> {
        let old = self.db.remove(key.as_bytes())?;
        self.after_write()?;
        Ok(old.and_then(|bytes| String::from_utf8(bytes.to_vec()).ok()))
    }

    fn after_write(&self) -> Result<()> {
        if self.flush_on_write {
            self.db.flush()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SledStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStorage")
            .field("entries", &self.db.len())
            .field("flush_on_write", &self.flush_on_write)
            .finish()
    }
}

/// One execution context attached to a [`SledStorage`] origin
#[derive(Debug)]
pub struct SledContext {
    storage: SledStorage,
    id: u64,
}

impl StorageArea for SledContext {
    fn get_item(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        Ok(self.storage.get(key)?)
    }

    fn set_item(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
        let old_value = self.storage.insert(key, value)?;
        self.storage.hub.broadcast(self.id, StorageEvent::set(key, old_value, value));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> std::result::Result<(), StorageError> {
        let old_value = self.storage.remove(key)?;
        if old_value.is_some() {
            self.storage.hub.broadcast(self.id, StorageEvent::removed(key, old_value));
        }
        Ok(())
    }

    fn on_change(&self, listener: StorageListener) -> Subscription {
        self.storage.hub.listen(self.id, listener)
    }
}
