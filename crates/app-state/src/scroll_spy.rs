//! Active-section tracking and programmatic scrolling
//!
//! A [`ScrollSpy`] watches a fixed, ordered list of section ids through one
//! grouped [`VisibilityObserver`] and keeps the id of the most visible
//! section. When no section intersects, the previous active section is kept.
//!
//! Ties on the highest ratio keep the current active section if it is among
//! them; otherwise the earliest section in registry order wins.

use crate::visibility::VisibilityObserver;
use app_platform::{
    Document, ElementRef, IntersectionEntry, IntersectionOptions, Platform, ScrollBehavior,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// Default distance kept above a section when scrolling to it
pub const DEFAULT_SPY_OFFSET: f64 = 100.0;

/// Default distance kept above an element for [`SmoothScroll`]
pub const DEFAULT_SMOOTH_OFFSET: f64 = 80.0;

/// Scroll spy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollSpyConfig {
    /// Pixels left above a section when scrolling to it
    pub offset: f64,
    /// Root margin of the shared observer
    pub root_margin: String,
    /// Visibility threshold of the shared observer
    pub threshold: f64,
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            offset: DEFAULT_SPY_OFFSET,
            root_margin: "-20%".to_string(),
            threshold: 0.1,
        }
    }
}

impl ScrollSpyConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scroll offset
    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the observer root margin
    pub fn root_margin(mut self, margin: impl Into<String>) -> Self {
        self.root_margin = margin.into();
        self
    }

    /// Set the observer threshold
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn observer_options(&self) -> IntersectionOptions {
        IntersectionOptions::default()
            .root_margin(self.root_margin.clone())
            .threshold(self.threshold)
    }
}

/// Last visibility record of a section
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Whether the section intersected the root
    pub is_intersecting: bool,
    /// Visible fraction of the section
    pub intersection_ratio: f64,
}

impl From<&IntersectionEntry> for SectionRecord {
    fn from(entry: &IntersectionEntry) -> Self {
        Self {
            is_intersecting: entry.is_intersecting,
            intersection_ratio: entry.intersection_ratio,
        }
    }
}

/// Snapshot of one registered section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionInfo {
    /// Section id
    pub id: String,
    /// Element currently carrying the id
    pub element: Option<ElementRef>,
    /// Whether the section last reported as intersecting
    pub is_visible: bool,
    /// Last reported visible fraction
    pub intersection_ratio: f64,
    /// Whether this is the active section
    pub is_active: bool,
}

/// Most visible intersecting section, or `None` when none intersects
fn most_visible<'a>(
    section_ids: &'a [String],
    records: &HashMap<String, SectionRecord>,
    current: Option<&str>,
) -> Option<&'a str> {
    let candidates: Vec<(&'a str, f64)> = section_ids
        .iter()
        .filter_map(|id| {
            let record = records.get(id)?;
            (record.is_intersecting && record.intersection_ratio > 0.0)
                .then_some((id.as_str(), record.intersection_ratio))
        })
        .collect();

    let best = candidates.iter().map(|(_, ratio)| *ratio).fold(f64::NAN, f64::max);
    if best.is_nan() {
        return None;
    }

    let mut tied = candidates.iter().filter(|(_, ratio)| *ratio == best).map(|(id, _)| *id);
    let first = tied.next()?;
    if Some(first) == current {
        return Some(first);
    }
    Some(tied.find(|id| Some(*id) == current).unwrap_or(first))
}

struct SpyInner {
    section_ids: Vec<String>,
    config: ScrollSpyConfig,
    document: Option<Arc<dyn Document>>,
    records: Mutex<HashMap<String, SectionRecord>>,
    active: RwLock<Option<String>>,
    sender: watch::Sender<Option<String>>,
}

impl SpyInner {
    fn handle(&self, entries: &[IntersectionEntry]) {
        let next = {
            let mut records = self.records.lock();
            for entry in entries {
                if let Some(id) = entry.target.id() {
                    records.insert(id.to_string(), SectionRecord::from(entry));
                }
            }

            let current = self.active.read().clone();
            most_visible(&self.section_ids, &records, current.as_deref()).map(str::to_string)
        };

        if let Some(id) = next {
            self.set_active(id);
        }
    }

    fn set_active(&self, id: String) {
        {
            let mut active = self.active.write();
            if active.as_deref() == Some(id.as_str()) {
                return;
            }
            tracing::debug!("Active section: {}", id);
            *active = Some(id.clone());
        }
        self.sender.send_replace(Some(id));
    }

}

/// Tracks which registered section is most visible
pub struct ScrollSpy {
    inner: Arc<SpyInner>,
    observer: VisibilityObserver,
}

impl ScrollSpy {
    /// Start watching the sections present in the document
    ///
    /// Sections without an element at mount time are skipped by the observer
    /// but stay registered.
    pub fn new<I, S>(platform: &Platform, section_ids: I, config: ScrollSpyConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (sender, _) = watch::channel(None);
        let inner = Arc::new(SpyInner {
            section_ids: section_ids.into_iter().map(Into::into).collect(),
            config,
            document: platform.document(),
            records: Mutex::new(HashMap::new()),
            active: RwLock::new(None),
            sender,
        });

        let mut targets = Vec::new();
        if let Some(document) = &inner.document {
            for id in &inner.section_ids {
                match document.get_element_by_id(id) {
                    Some(element) => targets.push(element),
                    None => tracing::debug!("Section {} not found, skipping", id),
                }
            }
        }
        tracing::debug!(
            "Scroll spy watching {} of {} sections",
            targets.len(),
            inner.section_ids.len()
        );

        let weak: Weak<SpyInner> = Arc::downgrade(&inner);
        let observer = VisibilityObserver::with_targets(
            platform,
            targets,
            inner.config.observer_options(),
            move |entries: &[IntersectionEntry], _| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle(entries);
                }
            },
        );

        Self { inner, observer }
    }

    /// Scroll so the section sits `offset` pixels below the top, and make it active
    ///
    /// Returns the requested scroll offset, or `None` when the section is missing.
    pub fn scroll_to_section(&self, section_id: &str, behavior: ScrollBehavior) -> Option<f64> {
        let document = self.inner.document.as_ref()?;
        let Some(element) = document.get_element_by_id(section_id) else {
            tracing::warn!("Section not found for scroll: {}", section_id);
            return None;
        };

        let element_top = document.bounding_client_top(&element) + document.page_y_offset();
        let top = element_top - self.inner.config.offset;
        document.scroll_to(top, behavior);

        self.inner.set_active(section_id.to_string());
        Some(top)
    }

    /// Every registered section with its latest record
    pub fn get_section_info(&self) -> Vec<SectionInfo> {
        let records = self.inner.records.lock().clone();
        let active = self.active_section();

        self.inner
            .section_ids
            .iter()
            .map(|id| {
                let record = records.get(id).copied().unwrap_or_default();
                SectionInfo {
                    id: id.clone(),
                    element: self.inner.document.as_ref().and_then(|d| d.get_element_by_id(id)),
                    is_visible: record.is_intersecting,
                    intersection_ratio: record.intersection_ratio,
                    is_active: active.as_deref() == Some(id.as_str()),
                }
            })
            .collect()
    }

    /// Active section id
    pub fn active_section(&self) -> Option<String> {
        self.inner.active.read().clone()
    }

    /// Whether `section_id` is the active section
    pub fn is_active(&self, section_id: &str) -> bool {
        self.inner.active.read().as_deref() == Some(section_id)
    }

    /// Registered section ids in order
    pub fn section_ids(&self) -> &[String] {
        &self.inner.section_ids
    }

    /// Whether the shared observer is live
    pub fn is_observing(&self) -> bool {
        self.observer.is_observing()
    }

    /// Disconnect the observer and forget visibility records
    pub fn cleanup(&self) {
        self.observer.cleanup();
        self.inner.records.lock().clear();
    }

    /// Watch the active section
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.inner.sender.subscribe()
    }
}

impl std::fmt::Debug for ScrollSpy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSpy")
            .field("sections", &self.inner.section_ids)
            .field("active", &self.active_section())
            .finish()
    }
}

/// Element to scroll to
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollTarget {
    /// A resolved element
    Element(ElementRef),
    /// A CSS selector, or a bare element id
    Selector(String),
}

impl From<ElementRef> for ScrollTarget {
    fn from(element: ElementRef) -> Self {
        ScrollTarget::Element(element)
    }
}

impl From<&str> for ScrollTarget {
    fn from(selector: &str) -> Self {
        ScrollTarget::Selector(selector.to_string())
    }
}

impl From<String> for ScrollTarget {
    fn from(selector: String) -> Self {
        ScrollTarget::Selector(selector)
    }
}

/// Smooth scrolling with a fixed top offset
#[derive(Clone)]
pub struct SmoothScroll {
    document: Option<Arc<dyn Document>>,
    offset: f64,
}

impl SmoothScroll {
    /// Create a helper keeping `offset` pixels above targets
    pub fn new(platform: &Platform, offset: f64) -> Self {
        Self { document: platform.document(), offset }
    }

    /// Offset kept above targets
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Scroll so `target` sits `offset` pixels below the top
    ///
    /// Returns the requested scroll offset, or `None` when the target cannot
    /// be resolved.
    pub fn scroll_to_element(
        &self,
        target: impl Into<ScrollTarget>,
        behavior: ScrollBehavior,
    ) -> Option<f64> {
        let document = self.document.as_ref()?;
        let Some(element) = resolve(document.as_ref(), target.into()) else {
            tracing::warn!("Element not found for smooth scroll");
            return None;
        };

        let element_top = document.bounding_client_top(&element) + document.page_y_offset();
        let top = element_top - self.offset;
        document.scroll_to(top, behavior);
        Some(top)
    }

    /// Scroll to the top of the page
    pub fn scroll_to_top(&self, behavior: ScrollBehavior) {
        if let Some(document) = &self.document {
            document.scroll_to(0.0, behavior);
        }
    }
}

impl std::fmt::Debug for SmoothScroll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmoothScroll").field("offset", &self.offset).finish()
    }
}

fn resolve(document: &dyn Document, target: ScrollTarget) -> Option<ElementRef> {
    match target {
        ScrollTarget::Element(element) => Some(element),
        ScrollTarget::Selector(selector) => document
            .query_selector(&selector)
            .or_else(|| document.get_element_by_id(&selector)),
    }
}
