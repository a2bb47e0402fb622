//! Intersection-driven visibility
//!
//! A [`VisibilityObserver`] watches one target element, or a fixed group of
//! elements, with at most one live intersection observer. Re-observing always
//! disconnects the previous observer first. The observer starts on
//! construction and is disconnected when the [`VisibilityObserver`] is
//! dropped.
//!
//! [`ScrollAnimation`] builds on it to add an animation class to an element
//! when it scrolls into view, either once (latched) or continuously.

use app_platform::{
    ElementRef, IntersectionEntry, IntersectionObserver, IntersectionOptions,
    IntersectionSource, Platform,
};
use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// Observer options: root, root margin and thresholds
pub type ObserverOptions = IntersectionOptions;

/// Callback run with each batch of intersection records
pub type VisibilityCallback = Arc<dyn Fn(&[IntersectionEntry], &ObserverControl) + Send + Sync>;

struct VisibilityInner {
    source: Option<Arc<dyn IntersectionSource>>,
    options: ObserverOptions,
    targets: Mutex<Vec<ElementRef>>,
    observer: Mutex<Option<Arc<dyn IntersectionObserver>>>,
    rebind: ReentrantMutex<()>,
    is_intersecting: AtomicBool,
    last_entry: Mutex<Option<IntersectionEntry>>,
    callback: Option<VisibilityCallback>,
    sender: watch::Sender<bool>,
}

impl VisibilityInner {
    /// Serialized with other rebinds so at most one observer is ever stored
    fn observe(self: &Arc<Self>) {
        let _rebind = self.rebind.lock();
        self.cleanup();

        let targets = self.targets.lock().clone();
        if targets.is_empty() {
            return;
        }
        let Some(source) = &self.source else {
            return;
        };

        let weak: Weak<VisibilityInner> = Arc::downgrade(self);
        let observer = source.create_observer(
            &self.options,
            Arc::new(move |entries: &[IntersectionEntry]| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle(entries);
                }
            }),
        );
        for target in &targets {
            observer.observe(target);
        }

        let displaced = self.observer.lock().replace(observer);
        if let Some(displaced) = displaced {
            displaced.disconnect();
        }
    }

    fn retarget(self: &Arc<Self>, targets: Vec<ElementRef>) {
        let _rebind = self.rebind.lock();
        *self.targets.lock() = targets;
        self.observe();
    }

    fn handle(self: &Arc<Self>, entries: &[IntersectionEntry]) {
        let intersecting = entries.iter().any(|entry| entry.is_intersecting);
        self.is_intersecting.store(intersecting, Ordering::Release);
        if let Some(last) = entries.last() {
            *self.last_entry.lock() = Some(last.clone());
        }
        self.sender.send_replace(intersecting);

        if let Some(callback) = &self.callback {
            let control = ObserverControl { inner: Arc::downgrade(self) };
            callback(entries, &control);
        }
    }

    fn unobserve(&self) {
        let observer = self.observer.lock().clone();
        let targets = self.targets.lock().clone();
        if let Some(observer) = observer {
            for target in &targets {
                observer.unobserve(target);
            }
        }
    }

    fn cleanup(&self) {
        let observer = self.observer.lock().take();
        if let Some(observer) = observer {
            observer.disconnect();
        }
    }

    fn is_observing(&self) -> bool {
        self.observer.lock().is_some()
    }
}

/// Handle passed to observer callbacks for controlling the observer
#[derive(Clone)]
pub struct ObserverControl {
    inner: Weak<VisibilityInner>,
}

impl ObserverControl {
    /// Disconnect and drop the observer
    pub fn cleanup(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cleanup();
        }
    }

    /// Stop watching the targets without disconnecting
    pub fn unobserve(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.unobserve();
        }
    }

    /// Whether the last batch had an intersecting record
    pub fn is_intersecting(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.is_intersecting.load(Ordering::Acquire))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for ObserverControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverControl")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Visibility of one element or a group of elements
pub struct VisibilityObserver {
    inner: Arc<VisibilityInner>,
}

impl VisibilityObserver {
    /// Start observing `target`
    pub fn new(platform: &Platform, target: Option<ElementRef>, options: ObserverOptions) -> Self {
        Self::build(platform, target.into_iter().collect(), options, None)
    }

    /// Start observing `target`, running `callback` with every batch
    pub fn with_callback(
        platform: &Platform,
        target: Option<ElementRef>,
        options: ObserverOptions,
        callback: impl Fn(&[IntersectionEntry], &ObserverControl) + Send + Sync + 'static,
    ) -> Self {
        Self::build(platform, target.into_iter().collect(), options, Some(Arc::new(callback)))
    }

    /// Watch every element of `targets` with one shared observer
    ///
    /// An empty group creates no observer. `is_intersecting` reflects whether
    /// any record of the last batch, for any member, was intersecting.
    pub fn with_targets(
        platform: &Platform,
        targets: Vec<ElementRef>,
        options: ObserverOptions,
        callback: impl Fn(&[IntersectionEntry], &ObserverControl) + Send + Sync + 'static,
    ) -> Self {
        Self::build(platform, targets, options, Some(Arc::new(callback)))
    }

    fn build(
        platform: &Platform,
        targets: Vec<ElementRef>,
        options: ObserverOptions,
        callback: Option<VisibilityCallback>,
    ) -> Self {
        let (sender, _) = watch::channel(false);
        let inner = Arc::new(VisibilityInner {
            source: platform.intersection(),
            options,
            targets: Mutex::new(targets),
            observer: Mutex::new(None),
            rebind: ReentrantMutex::new(()),
            is_intersecting: AtomicBool::new(false),
            last_entry: Mutex::new(None),
            callback,
            sender,
        });
        inner.observe();
        Self { inner }
    }

    /// Tear down any observer, then observe the current targets
    pub fn observe(&self) {
        self.inner.observe();
    }

    /// Stop watching the targets without disconnecting
    pub fn unobserve(&self) {
        self.inner.unobserve();
    }

    /// Disconnect and drop the observer
    pub fn cleanup(&self) {
        self.inner.cleanup();
    }

    /// Replace the targets with `target` and observe it
    pub fn set_target(&self, target: Option<ElementRef>) {
        self.inner.retarget(target.into_iter().collect());
    }

    /// First target
    pub fn target(&self) -> Option<ElementRef> {
        self.inner.targets.lock().first().cloned()
    }

    /// Every target, in observation order
    pub fn targets(&self) -> Vec<ElementRef> {
        self.inner.targets.lock().clone()
    }

    /// Whether any record of the last batch was intersecting
    pub fn is_intersecting(&self) -> bool {
        self.inner.is_intersecting.load(Ordering::Acquire)
    }

    /// Last record received
    pub fn last_entry(&self) -> Option<IntersectionEntry> {
        self.inner.last_entry.lock().clone()
    }

    /// Whether a live observer exists
    pub fn is_observing(&self) -> bool {
        self.inner.is_observing()
    }

    /// Watch the intersecting flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.sender.subscribe()
    }

    /// Control handle equivalent to the one passed to callbacks
    pub fn control(&self) -> ObserverControl {
        ObserverControl { inner: Arc::downgrade(&self.inner) }
    }
}

impl Drop for VisibilityObserver {
    fn drop(&mut self) {
        self.inner.cleanup();
    }
}

impl std::fmt::Debug for VisibilityObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityObserver")
            .field("targets", &self.targets())
            .field("observing", &self.is_observing())
            .field("is_intersecting", &self.is_intersecting())
            .finish()
    }
}

/// Default class added to elements scrolling into view
pub const DEFAULT_ANIMATION_CLASS: &str = "animate-fade-in";

/// Entry animation options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationOptions {
    /// Observer options
    #[serde(flatten)]
    pub observer: ObserverOptions,
    /// Class added to the target when it becomes visible
    pub animation_class: String,
    /// Animate only the first time the target becomes visible
    pub once: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            observer: ObserverOptions::default(),
            animation_class: DEFAULT_ANIMATION_CLASS.to_string(),
            once: true,
        }
    }
}

impl AnimationOptions {
    /// Create the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the observer options
    pub fn observer(mut self, options: ObserverOptions) -> Self {
        self.observer = options;
        self
    }

    /// Set the animation class
    pub fn animation_class(mut self, class: impl Into<String>) -> Self {
        self.animation_class = class.into();
        self
    }

    /// Set whether the animation runs only once
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }
}

#[derive(Default)]
struct AnimationState {
    is_visible: AtomicBool,
    has_animated: AtomicBool,
}

/// Adds an animation class to an element when it scrolls into view
pub struct ScrollAnimation {
    observer: VisibilityObserver,
    state: Arc<AnimationState>,
}

impl ScrollAnimation {
    /// Start watching `target`
    pub fn new(platform: &Platform, target: Option<ElementRef>, options: AnimationOptions) -> Self {
        let state = Arc::new(AnimationState::default());
        let document = platform.document();
        let AnimationOptions { observer: observer_options, animation_class, once } = options;

        let callback_state = state.clone();
        let observer = VisibilityObserver::with_callback(
            platform,
            target,
            observer_options,
            move |entries: &[IntersectionEntry], control: &ObserverControl| {
                for entry in entries {
                    let latched = once && callback_state.has_animated.load(Ordering::Acquire);
                    if entry.is_intersecting && !latched {
                        callback_state.is_visible.store(true, Ordering::Release);
                        callback_state.has_animated.store(true, Ordering::Release);
                        if let Some(document) = &document {
                            document.add_class(&entry.target, &animation_class);
                        }

                        if once {
                            control.cleanup();
                        }
                    } else if !entry.is_intersecting && !once {
                        callback_state.is_visible.store(false, Ordering::Release);
                        if let Some(document) = &document {
                            document.remove_class(&entry.target, &animation_class);
                        }
                    }
                }
            },
        );

        Self { observer, state }
    }

    /// Whether the target is currently considered visible
    pub fn is_visible(&self) -> bool {
        self.state.is_visible.load(Ordering::Acquire)
    }

    /// Whether the animation has run at least once
    pub fn has_animated(&self) -> bool {
        self.state.has_animated.load(Ordering::Acquire)
    }

    /// Tear down any observer, then observe the target again
    pub fn observe(&self) {
        self.observer.observe();
    }

    /// Disconnect the observer
    pub fn cleanup(&self) {
        self.observer.cleanup();
    }

    /// Whether a live observer exists
    pub fn is_observing(&self) -> bool {
        self.observer.is_observing()
    }
}

impl std::fmt::Debug for ScrollAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollAnimation")
            .field("is_visible", &self.is_visible())
            .field("has_animated", &self.has_animated())
            .finish()
    }
}
