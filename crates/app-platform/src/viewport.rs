//! Viewport size interface

use crate::subscription::Subscription;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Inner window dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Inner width
    pub width: u32,
    /// Inner height
    pub height: u32,
}

impl ViewportSize {
    /// Create a size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Listener receiving the new viewport size
pub type ResizeListener = Arc<dyn Fn(ViewportSize) + Send + Sync>;

/// Source of viewport dimensions
pub trait Viewport: Send + Sync {
    /// Current inner size
    fn inner_size(&self) -> ViewportSize;

    /// Listen for resizes
    ///
    /// Listeners are passive: they observe the resize and cannot block it.
    fn on_resize(&self, listener: ResizeListener) -> Subscription;
}
