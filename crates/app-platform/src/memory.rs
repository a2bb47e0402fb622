//! In-process hosts
//!
//! These implement the host traits without a browser, for native shells and
//! for tests. Each exposes driver methods (`set_matches`, `resize`,
//! `intersect`, ...) that play the role of the browser firing events, plus
//! inspection helpers.

use crate::document::{Document, ElementRef, ScrollBehavior};
use crate::intersection::{
    IntersectionCallback, IntersectionEntry, IntersectionObserver, IntersectionOptions,
    IntersectionSource,
};
use crate::media::{MediaListener, MediaMatcher, MediaQueryList};
use crate::subscription::{Listeners, Subscription};
use crate::viewport::{ResizeListener, Viewport, ViewportSize};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

// =============================================================================
// Media
// =============================================================================

/// A media query whose match state is driven by the caller
pub struct MemoryMediaQuery {
    media: String,
    matches: AtomicBool,
    listeners: Listeners<bool>,
}

impl MemoryMediaQuery {
    /// Create a query with an initial match state
    pub fn new(media: impl Into<String>, matches: bool) -> Self {
        Self {
            media: media.into(),
            matches: AtomicBool::new(matches),
            listeners: Listeners::new(),
        }
    }

    /// Change the match state, notifying listeners when it flips
    pub fn set_matches(&self, matches: bool) {
        let previous = self.matches.swap(matches, Ordering::AcqRel);
        if previous != matches {
            self.listeners.emit(&matches);
        }
    }

    /// Number of registered change listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl MediaQueryList for MemoryMediaQuery {
    fn media(&self) -> &str {
        &self.media
    }

    fn matches(&self) -> bool {
        self.matches.load(Ordering::Acquire)
    }

    fn on_change(&self, listener: MediaListener) -> Subscription {
        self.listeners.add(move |matches: &bool| listener(*matches))
    }
}

/// Media matcher holding one [`MemoryMediaQuery`] per query text
#[derive(Default)]
pub struct MemoryMedia {
    queries: Mutex<HashMap<String, Arc<MemoryMediaQuery>>>,
}

impl MemoryMedia {
    /// Create a matcher where every query starts unmatched
    pub fn new() -> Self {
        Self::default()
    }

    /// The query object for `query`, created on first use
    pub fn query(&self, query: &str) -> Arc<MemoryMediaQuery> {
        self.queries
            .lock()
            .entry(query.to_string())
            .or_insert_with(|| Arc::new(MemoryMediaQuery::new(query, false)))
            .clone()
    }

    /// Change the match state of `query`
    pub fn set_matches(&self, query: &str, matches: bool) {
        let query = self.query(query);
        query.set_matches(matches);
    }
}

impl MediaMatcher for MemoryMedia {
    fn match_media(&self, query: &str) -> Option<Arc<dyn MediaQueryList>> {
        Some(self.query(query))
    }
}

// =============================================================================
// Viewport
// =============================================================================

/// Viewport whose size is driven by the caller
pub struct MemoryViewport {
    size: RwLock<ViewportSize>,
    listeners: Listeners<ViewportSize>,
}

impl MemoryViewport {
    /// Create a viewport with an initial size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new(ViewportSize::new(width, height)),
            listeners: Listeners::new(),
        }
    }

    /// Resize, notifying listeners
    pub fn resize(&self, width: u32, height: u32) {
        let size = ViewportSize::new(width, height);
        *self.size.write() = size;
        self.listeners.emit(&size);
    }

    /// Number of registered resize listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Viewport for MemoryViewport {
    fn inner_size(&self) -> ViewportSize {
        *self.size.read()
    }

    fn on_resize(&self, listener: ResizeListener) -> Subscription {
        self.listeners.add(move |size: &ViewportSize| listener(*size))
    }
}

// =============================================================================
// Intersection
// =============================================================================

/// Observer created by [`MemoryIntersection`]
pub struct MemoryObserver {
    options: IntersectionOptions,
    callback: IntersectionCallback,
    targets: Mutex<Vec<ElementRef>>,
    connected: AtomicBool,
}

impl MemoryObserver {
    /// Options the observer was created with
    pub fn options(&self) -> &IntersectionOptions {
        &self.options
    }

    /// Whether the observer still delivers notifications
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Elements currently watched
    pub fn targets(&self) -> Vec<ElementRef> {
        self.targets.lock().clone()
    }

    fn watches(&self, target: &ElementRef) -> bool {
        self.is_connected() && self.targets.lock().contains(target)
    }
}

impl IntersectionObserver for MemoryObserver {
    fn observe(&self, target: &ElementRef) {
        if !self.is_connected() {
            return;
        }
        let mut targets = self.targets.lock();
        if !targets.contains(target) {
            targets.push(target.clone());
        }
    }

    fn unobserve(&self, target: &ElementRef) {
        self.targets.lock().retain(|t| t != target);
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
        self.targets.lock().clear();
    }
}

/// Intersection source whose notifications are delivered by the caller
///
/// Disconnected observers are released on the next delivery or creation.
#[derive(Default)]
pub struct MemoryIntersection {
    observers: Mutex<Vec<Arc<MemoryObserver>>>,
    created: AtomicUsize,
}

impl MemoryIntersection {
    /// Create a source with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a single record for `target` to every observer watching it
    pub fn intersect(&self, target: &ElementRef, is_intersecting: bool, ratio: f64) {
        self.deliver(vec![IntersectionEntry::new(target.clone(), is_intersecting, ratio)]);
    }

    /// Deliver a batch; each observer receives the records for its targets
    pub fn deliver(&self, entries: Vec<IntersectionEntry>) {
        let observers = {
            let mut observers = self.observers.lock();
            observers.retain(|o| o.is_connected());
            observers.clone()
        };

        for observer in observers {
            let batch: Vec<IntersectionEntry> = entries
                .iter()
                .filter(|entry| observer.watches(&entry.target))
                .cloned()
                .collect();

            if !batch.is_empty() {
                (observer.callback)(&batch);
            }
        }
    }

    /// Connected observers, oldest first
    pub fn observers(&self) -> Vec<Arc<MemoryObserver>> {
        self.observers.lock().iter().filter(|o| o.is_connected()).cloned().collect()
    }

    /// Number of observers ever created
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::Acquire)
    }

    /// Number of observers still held, including disconnected ones not yet released
    pub fn retained_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Number of connected observers
    pub fn connected_count(&self) -> usize {
        self.observers.lock().iter().filter(|o| o.is_connected()).count()
    }

    /// Number of connected observers watching `target`
    pub fn watchers_of(&self, target: &ElementRef) -> usize {
        self.observers.lock().iter().filter(|o| o.watches(target)).count()
    }
}

impl IntersectionSource for MemoryIntersection {
    fn create_observer(
        &self,
        options: &IntersectionOptions,
        callback: IntersectionCallback,
    ) -> Arc<dyn IntersectionObserver> {
        let observer = Arc::new(MemoryObserver {
            options: options.clone(),
            callback,
            targets: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
        });
        {
            let mut observers = self.observers.lock();
            observers.retain(|o| o.is_connected());
            observers.push(observer.clone());
        }
        self.created.fetch_add(1, Ordering::AcqRel);
        observer
    }
}

// =============================================================================
// Document
// =============================================================================

#[derive(Debug, Default)]
struct Node {
    id: Option<String>,
    top: f64,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
}

/// One call to [`Document::scroll_to`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRecord {
    /// Requested offset
    pub top: f64,
    /// Requested behavior
    pub behavior: ScrollBehavior,
}

const ROOT_NODE: u64 = 0;

/// Document with elements laid out at fixed offsets
pub struct MemoryDocument {
    nodes: RwLock<BTreeMap<u64, Node>>,
    next_node: AtomicU64,
    scroll_y: RwLock<f64>,
    scrolls: Mutex<Vec<ScrollRecord>>,
    class_adds: Mutex<Vec<(u64, String)>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a document holding only the root element
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT_NODE, Node::default());
        Self {
            nodes: RwLock::new(nodes),
            next_node: AtomicU64::new(ROOT_NODE + 1),
            scroll_y: RwLock::new(0.0),
            scrolls: Mutex::new(Vec::new()),
            class_adds: Mutex::new(Vec::new()),
        }
    }

    /// Insert an element with an `id`, its top edge `top` pixels into the page
    pub fn insert(&self, id: &str, top: f64) -> ElementRef {
        self.insert_node(Some(id), top)
    }

    /// Insert an element without an `id`
    pub fn insert_anonymous(&self, top: f64) -> ElementRef {
        self.insert_node(None, top)
    }

    fn insert_node(&self, id: Option<&str>, top: f64) -> ElementRef {
        let node = self.next_node.fetch_add(1, Ordering::AcqRel);
        self.nodes.write().insert(
            node,
            Node { id: id.map(str::to_string), top, ..Node::default() },
        );
        ElementRef::new(node, id)
    }

    /// Move an element
    pub fn set_top(&self, element: &ElementRef, top: f64) {
        if let Some(node) = self.nodes.write().get_mut(&element.node()) {
            node.top = top;
        }
    }

    /// Current class tokens of an element
    pub fn classes(&self, element: &ElementRef) -> Vec<String> {
        self.nodes
            .read()
            .get(&element.node())
            .map(|node| node.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether an element carries `class`
    pub fn has_class(&self, element: &ElementRef, class: &str) -> bool {
        self.nodes
            .read()
            .get(&element.node())
            .is_some_and(|node| node.classes.contains(class))
    }

    /// Number of times `class` was added to an element
    pub fn class_add_count(&self, element: &ElementRef, class: &str) -> usize {
        self.class_adds
            .lock()
            .iter()
            .filter(|(node, c)| *node == element.node() && c == class)
            .count()
    }

    /// Attribute value of an element
    pub fn attribute(&self, element: &ElementRef, name: &str) -> Option<String> {
        self.nodes
            .read()
            .get(&element.node())
            .and_then(|node| node.attributes.get(name).cloned())
    }

    /// Every scroll requested so far
    pub fn scroll_history(&self) -> Vec<ScrollRecord> {
        self.scrolls.lock().clone()
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> ElementRef {
        ElementRef::new(ROOT_NODE, None)
    }

    fn get_element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.nodes
            .read()
            .iter()
            .find(|(_, node)| node.id.as_deref() == Some(id))
            .map(|(key, node)| ElementRef::new(*key, node.id.as_deref()))
    }

    fn query_selector(&self, selector: &str) -> Option<ElementRef> {
        if let Some(id) = selector.strip_prefix('#') {
            return self.get_element_by_id(id);
        }

        let class = selector.strip_prefix('.')?;
        self.nodes
            .read()
            .iter()
            .find(|(_, node)| node.classes.contains(class))
            .map(|(key, node)| ElementRef::new(*key, node.id.as_deref()))
    }

    fn bounding_client_top(&self, element: &ElementRef) -> f64 {
        let top = self
            .nodes
            .read()
            .get(&element.node())
            .map(|node| node.top)
            .unwrap_or_default();
        top - *self.scroll_y.read()
    }

    fn page_y_offset(&self) -> f64 {
        *self.scroll_y.read()
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        *self.scroll_y.write() = top.max(0.0);
        self.scrolls.lock().push(ScrollRecord { top, behavior });
    }

    fn set_attribute(&self, element: &ElementRef, name: &str, value: &str) {
        if let Some(node) = self.nodes.write().get_mut(&element.node()) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn add_class(&self, element: &ElementRef, class: &str) {
        if let Some(node) = self.nodes.write().get_mut(&element.node()) {
            node.classes.insert(class.to_string());
        }
        self.class_adds.lock().push((element.node(), class.to_string()));
    }

    fn remove_class(&self, element: &ElementRef, class: &str) {
        if let Some(node) = self.nodes.write().get_mut(&element.node()) {
            node.classes.remove(class);
        }
    }
}
