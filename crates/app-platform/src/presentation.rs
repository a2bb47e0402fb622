//! Document presentation service
//!
//! The document root carries the page-wide color scheme as a `data-theme`
//! attribute plus one of two mutually exclusive class tokens. That state is
//! process-wide, so it is written through a single [`PresentationWriter`]
//! claimed from the [`Presentation`] service. At most one writer exists per
//! document at a time, however many services are bound to it; dropping the
//! writer releases the claim.

use crate::document::Document;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use thiserror::Error;

/// Root attribute carrying the color scheme
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Presentation service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresentationError {
    /// Another writer holds the document presentation state
    #[error("Presentation writer already claimed")]
    WriterClaimed,
}

/// Effective color scheme applied to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Light scheme
    Light,
    /// Dark scheme
    Dark,
}

impl ColorScheme {
    /// Scheme for a derived "is dark" flag
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }

    /// Attribute value and class token
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    /// The other scheme
    pub fn opposite(&self) -> Self {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Light,
        }
    }
}

impl std::fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Default)]
struct PresentationState {
    claimed: AtomicBool,
    applied: Mutex<Option<ColorScheme>>,
}

/// Live presentation state per bound document, keyed by document address.
/// A live entry is always held next to its document, so the address is not
/// reused while the entry can be upgraded.
fn registry() -> &'static Mutex<HashMap<usize, Weak<PresentationState>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<usize, Weak<PresentationState>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn document_key(document: &Arc<dyn Document>) -> usize {
    Arc::as_ptr(document) as *const () as usize
}

fn shared_state(document: &Arc<dyn Document>) -> Arc<PresentationState> {
    let mut registry = registry().lock();
    registry.retain(|_, state| state.strong_count() > 0);

    let key = document_key(document);
    if let Some(state) = registry.get(&key).and_then(Weak::upgrade) {
        return state;
    }

    let state = Arc::new(PresentationState::default());
    registry.insert(key, Arc::downgrade(&state));
    state
}

/// Owner of the document's presentation state
#[derive(Clone, Default)]
pub struct Presentation {
    document: Option<Arc<dyn Document>>,
    state: Arc<PresentationState>,
}

impl Presentation {
    /// Create a service writing to `document`, or recording only when `None`
    ///
    /// Services bound to the same document share one claim and one applied
    /// scheme. Unbound services each get their own.
    pub fn new(document: Option<Arc<dyn Document>>) -> Self {
        let state = match &document {
            Some(document) => shared_state(document),
            None => Arc::new(PresentationState::default()),
        };
        Self { document, state }
    }

    /// Claim the exclusive writer
    pub fn claim(&self) -> Result<PresentationWriter, PresentationError> {
        self.state
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PresentationError::WriterClaimed)?;

        tracing::debug!("Presentation writer claimed");
        Ok(PresentationWriter { presentation: self.clone() })
    }

    /// Whether a writer is currently claimed
    pub fn is_claimed(&self) -> bool {
        self.state.claimed.load(Ordering::Acquire)
    }

    /// Last scheme applied by any writer
    pub fn applied(&self) -> Option<ColorScheme> {
        *self.state.applied.lock()
    }
}

/// Exclusive writer of the document's presentation state
pub struct PresentationWriter {
    presentation: Presentation,
}

impl PresentationWriter {
    /// Last scheme applied to this writer's document
    pub fn applied(&self) -> Option<ColorScheme> {
        self.presentation.applied()
    }

    /// Apply `scheme` to the document root
    pub fn apply(&self, scheme: ColorScheme) {
        *self.presentation.state.applied.lock() = Some(scheme);

        if let Some(document) = &self.presentation.document {
            let root = document.root();
            document.set_attribute(&root, THEME_ATTRIBUTE, scheme.as_str());
            document.add_class(&root, scheme.as_str());
            document.remove_class(&root, scheme.opposite().as_str());
        }
    }
}

impl Drop for PresentationWriter {
    fn drop(&mut self) {
        self.presentation.state.claimed.store(false, Ordering::Release);
        tracing::debug!("Presentation writer released");
    }
}

impl std::fmt::Debug for PresentationWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationWriter")
            .field("applied", &self.presentation.applied())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;

    #[test]
    fn test_color_scheme_helpers() {
        assert_eq!(ColorScheme::from_dark(true), ColorScheme::Dark);
        assert_eq!(ColorScheme::from_dark(false), ColorScheme::Light);
        assert_eq!(ColorScheme::Dark.opposite(), ColorScheme::Light);
        assert_eq!(ColorScheme::Light.to_string(), "light");
    }

    #[test]
    fn test_single_writer() {
        let presentation = Presentation::new(None);
        let writer = presentation.claim().unwrap();
        assert_eq!(presentation.claim().unwrap_err(), PresentationError::WriterClaimed);

        drop(writer);
        assert!(!presentation.is_claimed());
        assert!(presentation.claim().is_ok());
    }

    #[test]
    fn test_apply_sets_attribute_and_exclusive_classes() {
        let document = Arc::new(MemoryDocument::new());
        let presentation = Presentation::new(Some(document.clone()));
        let writer = presentation.claim().unwrap();
        let root = document.root();

        writer.apply(ColorScheme::Dark);
        assert_eq!(document.attribute(&root, THEME_ATTRIBUTE).as_deref(), Some("dark"));
        assert!(document.has_class(&root, "dark"));
        assert!(!document.has_class(&root, "light"));

        writer.apply(ColorScheme::Light);
        assert_eq!(document.attribute(&root, THEME_ATTRIBUTE).as_deref(), Some("light"));
        assert!(document.has_class(&root, "light"));
        assert!(!document.has_class(&root, "dark"));
        assert_eq!(presentation.applied(), Some(ColorScheme::Light));
    }

    #[test]
    fn test_services_on_one_document_share_claim() {
        let document: Arc<dyn Document> = Arc::new(MemoryDocument::new());
        let first = Presentation::new(Some(document.clone()));
        let second = Presentation::new(Some(document.clone()));

        let writer = first.claim().unwrap();
        assert!(second.is_claimed());
        assert_eq!(second.claim().unwrap_err(), PresentationError::WriterClaimed);

        writer.apply(ColorScheme::Dark);
        assert_eq!(second.applied(), Some(ColorScheme::Dark));

        drop(writer);
        let writer = second.claim().unwrap();
        assert_eq!(writer.applied(), Some(ColorScheme::Dark));
    }

    #[test]
    fn test_distinct_documents_claim_independently() {
        let first = Presentation::new(Some(Arc::new(MemoryDocument::new())));
        let second = Presentation::new(Some(Arc::new(MemoryDocument::new())));
        let unbound = Presentation::new(None);

        let _first = first.claim().unwrap();
        let _second = second.claim().unwrap();
        let _unbound = unbound.claim().unwrap();
        assert!(Presentation::new(None).claim().is_ok());
    }

    #[test]
    fn test_apply_without_document_records_scheme() {
        let presentation = Presentation::new(None);
        let writer = presentation.claim().unwrap();
        writer.apply(ColorScheme::Dark);
        assert_eq!(presentation.applied(), Some(ColorScheme::Dark));
    }
}
