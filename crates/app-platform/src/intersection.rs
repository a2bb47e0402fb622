//! Intersection-based visibility interface

use crate::document::ElementRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options for an intersection observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionOptions {
    /// Element used as the viewport, `None` for the top-level viewport
    #[serde(skip)]
    pub root: Option<ElementRef>,
    /// Margin around the root, CSS syntax
    pub root_margin: String,
    /// Visibility ratios at which a notification fires
    pub thresholds: Vec<f64>,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: "0px".to_string(),
            thresholds: vec![0.1],
        }
    }
}

impl IntersectionOptions {
    /// Set the root element
    pub fn root(mut self, root: Option<ElementRef>) -> Self {
        self.root = root;
        self
    }

    /// Set the root margin
    pub fn root_margin(mut self, margin: impl Into<String>) -> Self {
        self.root_margin = margin.into();
        self
    }

    /// Use a single threshold
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.thresholds = vec![threshold];
        self
    }

    /// Use several thresholds
    pub fn thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// One visibility record in a notification batch
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    /// Observed element
    pub target: ElementRef,
    /// Whether the element intersects the root
    pub is_intersecting: bool,
    /// Fraction of the element inside the root (0.0 - 1.0)
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    /// Create an entry
    pub fn new(target: ElementRef, is_intersecting: bool, intersection_ratio: f64) -> Self {
        Self { target, is_intersecting, intersection_ratio }
    }
}

/// Callback receiving a batch of visibility records
pub type IntersectionCallback = Arc<dyn Fn(&[IntersectionEntry]) + Send + Sync>;

/// A live intersection observer
pub trait IntersectionObserver: Send + Sync {
    /// Start watching `target`
    fn observe(&self, target: &ElementRef);

    /// Stop watching `target`
    fn unobserve(&self, target: &ElementRef);

    /// Stop watching everything; no callbacks are delivered afterwards
    fn disconnect(&self);
}

/// Creates intersection observers
pub trait IntersectionSource: Send + Sync {
    /// Create an observer delivering batches to `callback`
    fn create_observer(
        &self,
        options: &IntersectionOptions,
        callback: IntersectionCallback,
    ) -> Arc<dyn IntersectionObserver>;
}
