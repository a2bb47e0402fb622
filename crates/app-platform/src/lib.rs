//! Host platform abstractions for Folio
//!
//! This crate describes the capabilities the client-state layer consumes from
//! its host (a browser tab, or a native/headless shell):
//!
//! - [`storage`] - Durable key-value slots with cross-context change events
//! - [`media`] - Media queries such as the system color-scheme preference
//! - [`viewport`] - Window dimensions and resize notifications
//! - [`intersection`] - Intersection-based visibility notifications
//! - [`document`] - Element lookup, scrolling, and class/attribute mutation
//! - [`presentation`] - The single-writer document theme service
//!
//! Every capability is optional. A [`Platform`] with no capabilities is a
//! headless host, and every consumer degrades to inert behavior on it.
//!
//! The [`memory`] module provides in-process hosts for native shells and tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod intersection;
pub mod media;
pub mod memory;
pub mod presentation;
pub mod storage;
pub mod subscription;
pub mod viewport;

use std::sync::Arc;

pub use document::{Document, ElementRef, ScrollBehavior};
pub use intersection::{
    IntersectionCallback, IntersectionEntry, IntersectionObserver, IntersectionOptions,
    IntersectionSource,
};
pub use media::{MediaListener, MediaMatcher, MediaQueryList, PREFERS_DARK_QUERY};
pub use presentation::{ColorScheme, Presentation, PresentationError, PresentationWriter};
pub use storage::{StorageArea, StorageError, StorageEvent, StorageListener};
pub use subscription::{Listeners, Subscription};
pub use viewport::{ResizeListener, Viewport, ViewportSize};

/// Which capabilities a [`Platform`] provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Durable storage is present
    pub storage: bool,
    /// Media queries are present
    pub media: bool,
    /// Viewport dimensions are present
    pub viewport: bool,
    /// Intersection observers are present
    pub intersection: bool,
    /// A document is present
    pub document: bool,
}

/// Bundle of host capabilities handed to every state component
///
/// Cloning a platform shares the underlying hosts and the presentation
/// service, so the exclusive-writer claim holds across clones.
#[derive(Clone, Default)]
pub struct Platform {
    storage: Option<Arc<dyn StorageArea>>,
    media: Option<Arc<dyn MediaMatcher>>,
    viewport: Option<Arc<dyn Viewport>>,
    intersection: Option<Arc<dyn IntersectionSource>>,
    document: Option<Arc<dyn Document>>,
    presentation: Presentation,
}

impl Platform {
    /// A platform with no capabilities (server or test harness)
    pub fn headless() -> Self {
        Self::default()
    }

    /// Attach a durable storage area
    pub fn with_storage(mut self, storage: Arc<dyn StorageArea>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Attach a media query matcher
    pub fn with_media(mut self, media: Arc<dyn MediaMatcher>) -> Self {
        self.media = Some(media);
        self
    }

    /// Attach a viewport source
    pub fn with_viewport(mut self, viewport: Arc<dyn Viewport>) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Attach an intersection observer source
    pub fn with_intersection(mut self, intersection: Arc<dyn IntersectionSource>) -> Self {
        self.intersection = Some(intersection);
        self
    }

    /// Attach a document
    ///
    /// This replaces the presentation service with one bound to `document`.
    /// Platforms attached to the same document share its writer claim.
    pub fn with_document(mut self, document: Arc<dyn Document>) -> Self {
        self.presentation = Presentation::new(Some(document.clone()));
        self.document = Some(document);
        self
    }

    /// Durable storage, if available
    pub fn storage(&self) -> Option<Arc<dyn StorageArea>> {
        self.storage.clone()
    }

    /// Media query matcher, if available
    pub fn media(&self) -> Option<Arc<dyn MediaMatcher>> {
        self.media.clone()
    }

    /// Viewport source, if available
    pub fn viewport(&self) -> Option<Arc<dyn Viewport>> {
        self.viewport.clone()
    }

    /// Intersection observer source, if available
    pub fn intersection(&self) -> Option<Arc<dyn IntersectionSource>> {
        self.intersection.clone()
    }

    /// Document, if available
    pub fn document(&self) -> Option<Arc<dyn Document>> {
        self.document.clone()
    }

    /// The document presentation service
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Summary of the capabilities present
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            storage: self.storage.is_some(),
            media: self.media.is_some(),
            viewport: self.viewport.is_some(),
            intersection: self.intersection.is_some(),
            document: self.document.is_some(),
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("capabilities", &self.capabilities())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDocument, MemoryIntersection, MemoryMedia, MemoryViewport};

    #[test]
    fn test_headless_has_no_capabilities() {
        let platform = Platform::headless();
        assert_eq!(platform.capabilities(), Capabilities::default());
        assert!(platform.storage().is_none());
        assert!(platform.document().is_none());
    }

    #[test]
    fn test_builder_attaches_capabilities() {
        let platform = Platform::headless()
            .with_media(Arc::new(MemoryMedia::new()))
            .with_viewport(Arc::new(MemoryViewport::new(800, 600)))
            .with_intersection(Arc::new(MemoryIntersection::new()))
            .with_document(Arc::new(MemoryDocument::new()));

        let caps = platform.capabilities();
        assert!(!caps.storage);
        assert!(caps.media);
        assert!(caps.viewport);
        assert!(caps.intersection);
        assert!(caps.document);
    }

    #[test]
    fn test_clones_share_presentation_claim() {
        let platform = Platform::headless().with_document(Arc::new(MemoryDocument::new()));
        let clone = platform.clone();

        let _writer = platform.presentation().claim().unwrap();
        assert!(clone.presentation().is_claimed());
        assert!(clone.presentation().claim().is_err());
    }

    #[test]
    fn test_platforms_on_one_document_share_claim() {
        let document: Arc<dyn Document> = Arc::new(MemoryDocument::new());
        let base = Platform::headless();
        let first = base.clone().with_document(document.clone());
        let second = base.with_document(document);

        let writer = first.presentation().claim().unwrap();
        assert!(matches!(second.presentation().claim(), Err(PresentationError::WriterClaimed)));

        drop(writer);
        assert!(second.presentation().claim().is_ok());
    }
}
