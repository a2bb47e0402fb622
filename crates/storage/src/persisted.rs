//! Reactive binding over one durable key-value slot
//!
//! A [`PersistedValue`] keeps an in-memory copy of a serialized value and the
//! storage slot it came from in step:
//!
//! - Binding reads the slot once. An absent slot yields the default; a slot
//!   that fails to decode is retried as a legacy plain string, then falls back
//!   to the default.
//! - `set` and `update` change memory first, then attempt the durable write.
//!   A failed write is logged and the in-memory value is kept.
//! - `remove` resets memory to the default once the durable delete succeeds.
//! - Writes to the same key made by other contexts are decoded strictly and
//!   mirrored into memory. Undecodable updates are logged and dropped.
//!
//! Without a storage area the value lives in memory only.

use app_platform::{Listeners, StorageArea, StorageError, StorageEvent, Subscription};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::watch;

/// Persisted value error types
#[derive(Debug, Error)]
pub enum PersistError {
    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage area error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Raw value could not be decoded by a custom serializer
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for persisted value operations
pub type Result<T> = std::result::Result<T, PersistError>;

/// Conversion between a value and its stored string form
pub trait Serializer<T>: Send + Sync {
    /// Decode a stored string
    fn read(&self, raw: &str) -> Result<T>;

    /// Encode a value for storage
    fn write(&self, value: &T) -> Result<String>;

    /// Decode a stored string found at bind time, accepting legacy forms
    fn read_lenient(&self, raw: &str) -> Result<T> {
        self.read(raw)
    }
}

/// JSON serializer, the default for [`PersistedValue::bind`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<T> Serializer<T> for JsonSerializer
where
    T: Serialize + DeserializeOwned,
{
    fn read(&self, raw: &str) -> Result<T> {
        Ok(serde_json::from_str(raw)?)
    }

    fn write(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Values written before JSON encoding was introduced are bare strings
    fn read_lenient(&self, raw: &str) -> Result<T> {
        match serde_json::from_str(raw) {
            Ok(value) => Ok(value),
            Err(err) => serde_json::from_value(serde_json::Value::String(raw.to_string()))
                .map_err(|_| PersistError::Serialization(err)),
        }
    }
}

struct Shared<T> {
    key: String,
    default: T,
    serializer: Arc<dyn Serializer<T>>,
    storage: Option<Arc<dyn StorageArea>>,
    value: RwLock<T>,
    listeners: Listeners<T>,
    sender: watch::Sender<T>,
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn load(&self) -> Option<T> {
        let storage = self.storage.as_ref()?;

        let raw = match storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Some(self.default.clone()),
            Err(e) => {
                tracing::warn!("Failed to read persisted value {}: {}", self.key, e);
                return Some(self.default.clone());
            }
        };

        match self.serializer.read_lenient(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding malformed persisted value {}: {}", self.key, e);
                Some(self.default.clone())
            }
        }
    }

    fn store(&self, value: T) {
        *self.value.write() = value;
    }

    fn notify(&self) {
        let current = self.value.read().clone();
        self.sender.send_replace(current.clone());
        self.listeners.emit(&current);
    }

    fn persist(&self, value: &T) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let raw = self.serializer.write(value)?;
        storage.set_item(&self.key, &raw)?;
        Ok(())
    }

    fn erase(&self) -> Result<()> {
        if let Some(storage) = &self.storage {
            storage.remove_item(&self.key)?;
        }
        Ok(())
    }

    fn apply_external(&self, event: &StorageEvent) {
        if event.key.as_deref() != Some(self.key.as_str()) {
            return;
        }
        let Some(raw) = event.new_value.as_deref() else {
            return;
        };

        match self.serializer.read(raw) {
            Ok(value) => {
                tracing::debug!("Persisted value {} changed in another context", self.key);
                self.store(value);
                self.notify();
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed update for {}: {}", self.key, e);
            }
        }
    }
}

/// In-memory value mirrored to a durable storage slot
pub struct PersistedValue<T> {
    shared: Arc<Shared<T>>,
    _storage_subscription: Subscription,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Bind `key` in `storage` with JSON serialization
    pub fn bind(storage: Option<Arc<dyn StorageArea>>, key: impl Into<String>, default: T) -> Self {
        Self::bind_with(storage, key, default, JsonSerializer)
    }
}

impl<T> PersistedValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Bind `key` in `storage` with a custom serializer
    pub fn bind_with(
        storage: Option<Arc<dyn StorageArea>>,
        key: impl Into<String>,
        default: T,
        serializer: impl Serializer<T> + 'static,
    ) -> Self {
        let (sender, _) = watch::channel(default.clone());
        let shared = Arc::new(Shared {
            key: key.into(),
            value: RwLock::new(default.clone()),
            default,
            serializer: Arc::new(serializer),
            storage,
            listeners: Listeners::new(),
            sender,
        });

        if let Some(initial) = shared.load() {
            shared.store(initial.clone());
            shared.sender.send_replace(initial);
        }

        let subscription = match &shared.storage {
            Some(storage) => {
                let weak: Weak<Shared<T>> = Arc::downgrade(&shared);
                storage.on_change(Arc::new(move |event: &StorageEvent| {
                    if let Some(shared) = weak.upgrade() {
                        shared.apply_external(event);
                    }
                }))
            }
            None => Subscription::noop(),
        };

        tracing::debug!(
            "Bound persisted value {} (durable: {})",
            shared.key,
            shared.storage.is_some()
        );
        Self { shared, _storage_subscription: subscription }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.shared.value.read().clone()
    }

    /// Borrow the current value
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.shared.value.read())
    }

    /// Replace the value
    pub fn set(&self, value: T) {
        self.shared.store(value.clone());
        if let Err(e) = self.shared.persist(&value) {
            tracing::error!("Failed to persist {}: {}", self.shared.key, e);
        }
        self.shared.notify();
    }

    /// Replace the value with `f` applied to the current value
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with(f);
        self.set(next);
    }

    /// Delete the durable entry and reset to the default
    ///
    /// When the durable delete fails the in-memory value is left as is.
    pub fn remove(&self) {
        match self.shared.erase() {
            Ok(()) => {
                self.shared.store(self.shared.default.clone());
                self.shared.notify();
            }
            Err(e) => {
                tracing::error!("Failed to remove {}: {}", self.shared.key, e);
            }
        }
    }

    /// Re-read the durable slot with the bind-time rules
    pub fn reload(&self) {
        if let Some(value) = self.shared.load() {
            self.shared.store(value);
            self.shared.notify();
        }
    }

    /// Storage key
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Default value
    pub fn default_value(&self) -> &T {
        &self.shared.default
    }

    /// Whether a storage area backs this value
    pub fn is_durable(&self) -> bool {
        self.shared.storage.is_some()
    }

    /// Run `listener` after every change, local or from another context
    pub fn on_change(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.shared.listeners.add(listener)
    }

    /// Watch the value
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.shared.sender.subscribe()
    }
}

impl<T> std::fmt::Debug for PersistedValue<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedValue")
            .field("key", &self.shared.key)
            .field("value", &*self.shared.value.read())
            .field("durable", &self.shared.storage.is_some())
            .finish()
    }
}
