//! Durable key-value slot interface
//!
//! Mirrors the browser's local storage: string keys to string values, plus a
//! change notification that fires only for writes made by *other* execution
//! contexts attached to the same origin.

use crate::subscription::Subscription;
use std::sync::Arc;
use thiserror::Error;

/// Storage area error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The write would exceed the origin's quota
    #[error("Quota exceeded writing {key}: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Bytes the origin would hold after the write
        needed: usize,
        /// Configured quota in bytes
        quota: usize,
    },

    /// Storage is disabled for this origin
    #[error("Storage is disabled")]
    Disabled,

    /// Backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Change made to a storage area by another context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Changed key, `None` when the whole area was cleared
    pub key: Option<String>,
    /// Value before the change
    pub old_value: Option<String>,
    /// Value after the change, `None` when removed
    pub new_value: Option<String>,
}

impl StorageEvent {
    /// Event for a key being set
    pub fn set(key: impl Into<String>, old_value: Option<String>, new_value: impl Into<String>) -> Self {
        Self { key: Some(key.into()), old_value, new_value: Some(new_value.into()) }
    }

    /// Event for a key being removed
    pub fn removed(key: impl Into<String>, old_value: Option<String>) -> Self {
        Self { key: Some(key.into()), old_value, new_value: None }
    }

    /// Event for the whole area being cleared
    pub fn cleared() -> Self {
        Self { key: None, old_value: None, new_value: None }
    }
}

/// Listener for cross-context storage changes
pub type StorageListener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// A storage area as seen from one execution context
pub trait StorageArea: Send + Sync {
    /// Read a raw value
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a raw value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value; deleting a missing key succeeds
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Listen for changes made by other contexts
    fn on_change(&self, listener: StorageListener) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_constructors() {
        let set = StorageEvent::set("theme", None, "\"dark\"");
        assert_eq!(set.key.as_deref(), Some("theme"));
        assert_eq!(set.new_value.as_deref(), Some("\"dark\""));

        let removed = StorageEvent::removed("theme", Some("\"dark\"".to_string()));
        assert!(removed.new_value.is_none());
        assert_eq!(removed.old_value.as_deref(), Some("\"dark\""));

        let cleared = StorageEvent::cleared();
        assert!(cleared.key.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::QuotaExceeded { key: "k".to_string(), needed: 12, quota: 10 };
        assert_eq!(
            err.to_string(),
            "Quota exceeded writing k: 12 bytes needed, quota is 10 bytes"
        );
        assert_eq!(StorageError::Disabled.to_string(), "Storage is disabled");
    }
}
