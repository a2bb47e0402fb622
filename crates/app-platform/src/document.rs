//! Document interface

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle to an element of the host document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    node: u64,
    id: Option<Arc<str>>,
}

impl ElementRef {
    /// Create a handle for node `node` with an optional `id` attribute
    pub fn new(node: u64, id: Option<&str>) -> Self {
        Self { node, id: id.map(Arc::from) }
    }

    /// Host-assigned node identity
    pub fn node(&self) -> u64 {
        self.node
    }

    /// The element's `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// How a programmatic scroll moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    /// Animated scroll
    #[default]
    Smooth,
    /// Host default
    Auto,
    /// Jump without animation
    Instant,
}

/// The host document
pub trait Document: Send + Sync {
    /// The root (`<html>`) element
    fn root(&self) -> ElementRef;

    /// Look up an element by `id`
    fn get_element_by_id(&self, id: &str) -> Option<ElementRef>;

    /// First element matching a CSS selector
    fn query_selector(&self, selector: &str) -> Option<ElementRef>;

    /// Top edge of the element's bounding rect, relative to the viewport
    fn bounding_client_top(&self, element: &ElementRef) -> f64;

    /// Current vertical scroll offset of the page
    fn page_y_offset(&self) -> f64;

    /// Scroll the page to `top`
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);

    /// Set an attribute on an element
    fn set_attribute(&self, element: &ElementRef, name: &str, value: &str);

    /// Add a class token to an element
    fn add_class(&self, element: &ElementRef, class: &str);

    /// Remove a class token from an element
    fn remove_class(&self, element: &ElementRef, class: &str);
}
