//! In-memory storage origin
//!
//! A [`MemoryStorage`] is the shared state of one origin. Each call to
//! [`MemoryStorage::context`] attaches a new execution context that reads and
//! writes the same entries and hears about writes from every other context.

use crate::hub::ContextHub;
use app_platform::{StorageArea, StorageError, StorageEvent, StorageListener, Subscription};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStorageConfig {
    /// Maximum bytes held by the origin (keys plus values), `None` for unbounded
    pub quota_bytes: Option<usize>,
}

impl Default for MemoryStorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: Some(5 * 1024 * 1024), // 5MB
        }
    }
}

impl MemoryStorageConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin quota in bytes
    pub fn quota_bytes(mut self, bytes: Option<usize>) -> Self {
        self.quota_bytes = bytes;
        self
    }
}

struct Origin {
    config: MemoryStorageConfig,
    entries: RwLock<BTreeMap<String, String>>,
    enabled: AtomicBool,
    hub: ContextHub,
}

impl Origin {
    fn used_bytes_with(&self, entries: &BTreeMap<String, String>, key: &str, value: &str) -> usize {
        let others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        others + key.len() + value.len()
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.enabled.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StorageError::Disabled)
        }
    }
}

/// Shared in-memory storage origin
#[derive(Clone)]
pub struct MemoryStorage {
    origin: Arc<Origin>,
}

impl MemoryStorage {
    /// Create an origin with `config`
    pub fn new(config: MemoryStorageConfig) -> Self {
        Self {
            origin: Arc::new(Origin {
                config,
                entries: RwLock::new(BTreeMap::new()),
                enabled: AtomicBool::new(true),
                hub: ContextHub::default(),
            }),
        }
    }

    /// Attach a new execution context to this origin
    pub fn context(&self) -> StorageContext {
        let id = self.origin.hub.register_context();
        StorageContext { origin: self.origin.clone(), id }
    }

    /// Enable or disable the origin; a disabled origin fails every operation
    pub fn set_enabled(&self, enabled: bool) {
        self.origin.enabled.store(enabled, Ordering::Release);
        tracing::debug!("Memory storage enabled: {}", enabled);
    }

    /// Read a raw entry, bypassing contexts
    pub fn peek(&self, key: &str) -> Option<String> {
        self.origin.entries.read().get(key).cloned()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.origin.entries.read().len()
    }

    /// Whether the origin holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cross-context listeners registered on the origin
    pub fn listener_count(&self) -> usize {
        self.origin.hub.listener_count()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(MemoryStorageConfig::default())
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("config", &self.origin.config)
            .field("entries", &self.len())
            .finish()
    }
}

/// One execution context attached to a [`MemoryStorage`] origin
pub struct StorageContext {
    origin: Arc<Origin>,
    id: u64,
}

impl StorageContext {
    /// Remove every entry and notify the other contexts
    pub fn clear(&self) -> Result<(), StorageError> {
        self.origin.check_enabled()?;
        self.origin.entries.write().clear();
        self.origin.hub.broadcast(self.id, StorageEvent::cleared());
        Ok(())
    }
}

impl StorageArea for StorageContext {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.origin.check_enabled()?;
        Ok(self.origin.entries.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.origin.check_enabled()?;

        let old_value = {
            let mut entries = self.origin.entries.write();
            if let Some(quota) = self.origin.config.quota_bytes {
                let needed = self.origin.used_bytes_with(&entries, key, value);
                if needed > quota {
                    return Err(StorageError::QuotaExceeded {
                        key: key.to_string(),
                        needed,
                        quota,
                    });
                }
            }
            entries.insert(key.to_string(), value.to_string())
        };

        self.origin.hub.broadcast(self.id, StorageEvent::set(key, old_value, value));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.origin.check_enabled()?;

        let old_value = self.origin.entries.write().remove(key);
        if old_value.is_some() {
            self.origin.hub.broadcast(self.id, StorageEvent::removed(key, old_value));
        }
        Ok(())
    }

    fn on_change(&self, listener: StorageListener) -> Subscription {
        self.origin.hub.listen(self.id, listener)
    }
}

impl std::fmt::Debug for StorageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageContext").field("id", &self.id).finish()
    }
}
