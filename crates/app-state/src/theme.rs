//! Theme preference and document color scheme
//!
//! The [`ThemeController`] owns the persisted theme preference and the live
//! system color-scheme signal, derives the effective `is_dark` flag from both,
//! and keeps the document root in sync with it. It holds the document's
//! [`PresentationWriter`], so only one controller can be mounted per document.
//!
//! `is_dark` is recomputed whenever the preference changes (locally or in
//! another tab) and whenever the system preference flips. The document is
//! written on mount and then only when `is_dark` actually changes.

use app_platform::{
    ColorScheme, MediaQueryList, Platform, PresentationError, PresentationWriter, Subscription,
    PREFERS_DARK_QUERY,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use storage::PersistedValue;
use tokio::sync::watch;

/// Default storage key for the theme preference
pub const DEFAULT_STORAGE_KEY: &str = "theme";

/// Theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Always light
    Light,
    /// Always dark
    Dark,
    /// Follow the system color-scheme preference
    #[default]
    System,
}

impl ThemeMode {
    /// Cycle order
    pub const ORDER: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];

    /// Next preference in cycle order, wrapping
    pub fn next(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
            ThemeMode::System => ThemeMode::Light,
        }
    }

    /// Effective darkness given the system preference
    pub fn resolve(&self, prefers_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => prefers_dark,
        }
    }

    /// Stored identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::Light => "Tema Claro",
            ThemeMode::Dark => "Tema Oscuro",
            ThemeMode::System => "Sistema",
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            _ => Err(format!("Unknown theme: {}", s)),
        }
    }
}

/// Theme controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Storage key of the preference
    pub storage_key: String,
    /// Preference used when nothing is stored
    pub default_mode: ThemeMode,
    /// Media query reporting the system dark preference
    pub media_query: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_mode: ThemeMode::System,
            media_query: PREFERS_DARK_QUERY.to_string(),
        }
    }
}

impl ThemeConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage key
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the default preference
    pub fn default_mode(mut self, mode: ThemeMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Set the system preference media query
    pub fn media_query(mut self, query: impl Into<String>) -> Self {
        self.media_query = query.into();
        self
    }
}

/// Derived theme state at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThemeSnapshot {
    /// Stored preference
    pub mode: ThemeMode,
    /// Effective darkness
    pub is_dark: bool,
    /// System color-scheme preference
    pub prefers_dark: bool,
}

impl ThemeSnapshot {
    /// Derive a snapshot from a preference and the system signal
    pub fn derive(mode: ThemeMode, prefers_dark: bool) -> Self {
        Self { mode, is_dark: mode.resolve(prefers_dark), prefers_dark }
    }

    /// Whether the preference follows the system
    pub fn is_system(&self) -> bool {
        self.mode == ThemeMode::System
    }

    /// Effective color scheme
    pub fn scheme(&self) -> ColorScheme {
        ColorScheme::from_dark(self.is_dark)
    }

    /// Icon token for the theme switcher
    pub fn icon(&self) -> &'static str {
        if self.is_system() {
            "fa-circle-half-stroke"
        } else if self.is_dark {
            "fa-moon"
        } else {
            "fa-sun"
        }
    }

    /// Display label of the preference
    pub fn label(&self) -> &'static str {
        self.mode.label()
    }
}

struct ThemeInner {
    preference: PersistedValue<ThemeMode>,
    prefers_dark: Mutex<bool>,
    state: Mutex<Option<ThemeSnapshot>>,
    publish_pending: AtomicBool,
    publishing: Mutex<()>,
    writer: PresentationWriter,
    sender: watch::Sender<ThemeSnapshot>,
}

impl ThemeInner {
    fn refresh(&self) {
        {
            let mut state = self.state.lock();
            let next = ThemeSnapshot::derive(self.preference.get(), *self.prefers_dark.lock());
            if *state == Some(next) {
                return;
            }
            *state = Some(next);
        }

        self.publish();
    }

    /// Bring the document and the watch channel up to the latest state
    ///
    /// No component lock is held while the document runs. A refresh that
    /// lands while another publish is running (on another thread, or from
    /// inside a document callback) is picked up by that publisher's loop.
    fn publish(&self) {
        self.publish_pending.store(true, Ordering::Release);

        loop {
            let Some(guard) = self.publishing.try_lock() else {
                return;
            };

            while self.publish_pending.swap(false, Ordering::AcqRel) {
                let Some(latest) = *self.state.lock() else {
                    continue;
                };

                if self.writer.applied() != Some(latest.scheme()) {
                    tracing::debug!("Applying {} color scheme", latest.scheme());
                    self.writer.apply(latest.scheme());
                }

                self.sender.send_if_modified(|current| {
                    if *current == latest {
                        return false;
                    }
                    *current = latest;
                    true
                });
            }

            drop(guard);
            if !self.publish_pending.load(Ordering::Acquire) {
                return;
            }
        }
    }

    fn set_prefers_dark(&self, prefers_dark: bool) {
        *self.prefers_dark.lock() = prefers_dark;
        self.refresh();
    }

    fn snapshot(&self) -> ThemeSnapshot {
        let state = *self.state.lock();
        state.unwrap_or_else(|| ThemeSnapshot::derive(self.preference.get(), *self.prefers_dark.lock()))
    }
}

/// Owner of the theme preference and the document color scheme
pub struct ThemeController {
    inner: Arc<ThemeInner>,
    _subscriptions: Vec<Subscription>,
}

impl ThemeController {
    /// Mount a controller on `platform`
    ///
    /// Fails only when another controller holds the document presentation.
    pub fn new(platform: &Platform, config: ThemeConfig) -> Result<Self, PresentationError> {
        let writer = platform.presentation().claim()?;
        let preference =
            PersistedValue::bind(platform.storage(), config.storage_key.clone(), config.default_mode);

        let media: Option<Arc<dyn MediaQueryList>> =
            platform.media().and_then(|matcher| matcher.match_media(&config.media_query));

        let (sender, _) = watch::channel(ThemeSnapshot::derive(preference.get(), false));
        let inner = Arc::new(ThemeInner {
            preference,
            prefers_dark: Mutex::new(false),
            state: Mutex::new(None),
            publish_pending: AtomicBool::new(false),
            publishing: Mutex::new(()),
            writer,
            sender,
        });

        let mut subscriptions = Vec::with_capacity(2);

        let weak: Weak<ThemeInner> = Arc::downgrade(&inner);
        subscriptions.push(inner.preference.on_change(move |_: &ThemeMode| {
            if let Some(inner) = weak.upgrade() {
                inner.refresh();
            }
        }));

        // Listen before reading so a flip during mount is not lost
        if let Some(query) = &media {
            let weak: Weak<ThemeInner> = Arc::downgrade(&inner);
            subscriptions.push(query.on_change(Arc::new(move |matches: bool| {
                if let Some(inner) = weak.upgrade() {
                    inner.set_prefers_dark(matches);
                }
            })));
            *inner.prefers_dark.lock() = query.matches();
        }
        inner.refresh();

        let initial = inner.snapshot();
        tracing::debug!(
            "Theme controller mounted (mode: {}, dark: {})",
            initial.mode,
            initial.is_dark
        );
        Ok(Self { inner, _subscriptions: subscriptions })
    }

    /// Set and persist the preference
    pub fn set_theme(&self, mode: ThemeMode) {
        self.inner.preference.set(mode);
    }

    /// Switch between light and dark based on the effective scheme
    pub fn toggle_theme(&self) {
        let mode = if self.is_dark() { ThemeMode::Light } else { ThemeMode::Dark };
        self.set_theme(mode);
    }

    /// Advance to the next preference in cycle order
    pub fn cycle_theme(&self) {
        self.set_theme(self.current_theme().next());
    }

    /// Stored preference
    pub fn current_theme(&self) -> ThemeMode {
        self.snapshot().mode
    }

    /// Effective darkness
    pub fn is_dark(&self) -> bool {
        self.snapshot().is_dark
    }

    /// System color-scheme preference
    pub fn prefers_dark(&self) -> bool {
        self.snapshot().prefers_dark
    }

    /// Whether the preference follows the system
    pub fn is_system(&self) -> bool {
        self.snapshot().is_system()
    }

    /// Icon token for the theme switcher
    pub fn theme_icon(&self) -> &'static str {
        self.snapshot().icon()
    }

    /// Display label of the preference
    pub fn theme_label(&self) -> &'static str {
        self.snapshot().label()
    }

    /// Current derived state
    pub fn snapshot(&self) -> ThemeSnapshot {
        self.inner.snapshot()
    }

    /// Watch the derived state
    pub fn subscribe(&self) -> watch::Receiver<ThemeSnapshot> {
        self.inner.sender.subscribe()
    }
}

impl std::fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeController").field("state", &self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_platform::memory::{MemoryDocument, MemoryMedia};
    use app_platform::presentation::THEME_ATTRIBUTE;
    use app_platform::{
        Document, ElementRef, MediaListener, MediaMatcher, ScrollBehavior, StorageArea,
    };
    use storage::MemoryStorage;

    type Hook = Arc<dyn Fn() + Send + Sync>;

    /// Document running a hook after every attribute write
    #[derive(Default)]
    struct HookedDocument {
        inner: MemoryDocument,
        hook: Mutex<Option<Hook>>,
    }

    impl HookedDocument {
        fn set_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
            *self.hook.lock() = Some(Arc::new(hook));
        }
    }

    impl Document for HookedDocument {
        fn root(&self) -> ElementRef {
            self.inner.root()
        }

        fn get_element_by_id(&self, id: &str) -> Option<ElementRef> {
            self.inner.get_element_by_id(id)
        }

        fn query_selector(&self, selector: &str) -> Option<ElementRef> {
            self.inner.query_selector(selector)
        }

        fn bounding_client_top(&self, element: &ElementRef) -> f64 {
            self.inner.bounding_client_top(element)
        }

        fn page_y_offset(&self) -> f64 {
            self.inner.page_y_offset()
        }

        fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
            self.inner.scroll_to(top, behavior)
        }

        fn set_attribute(&self, element: &ElementRef, name: &str, value: &str) {
            self.inner.set_attribute(element, name, value);
            let hook = self.hook.lock().clone();
            if let Some(hook) = hook {
                hook();
            }
        }

        fn add_class(&self, element: &ElementRef, class: &str) {
            self.inner.add_class(element, class)
        }

        fn remove_class(&self, element: &ElementRef, class: &str) {
            self.inner.remove_class(element, class)
        }
    }

    /// Query whose system preference turns dark while a listener registers,
    /// without notifying it
    struct FlipOnListen {
        matches: AtomicBool,
    }

    impl MediaQueryList for FlipOnListen {
        fn media(&self) -> &str {
            PREFERS_DARK_QUERY
        }

        fn matches(&self) -> bool {
            self.matches.load(Ordering::Acquire)
        }

        fn on_change(&self, _listener: MediaListener) -> Subscription {
            self.matches.store(true, Ordering::Release);
            Subscription::noop()
        }
    }

    struct FlipOnListenMedia;

    impl MediaMatcher for FlipOnListenMedia {
        fn match_media(&self, _query: &str) -> Option<Arc<dyn MediaQueryList>> {
            Some(Arc::new(FlipOnListen { matches: AtomicBool::new(false) }))
        }
    }

    struct Harness {
        storage: MemoryStorage,
        media: Arc<MemoryMedia>,
        document: Arc<MemoryDocument>,
        platform: Platform,
    }

    fn harness(prefers_dark: bool) -> Harness {
        let storage = MemoryStorage::default();
        let media = Arc::new(MemoryMedia::new());
        media.set_matches(PREFERS_DARK_QUERY, prefers_dark);
        let document = Arc::new(MemoryDocument::new());
        let platform = Platform::headless()
            .with_storage(Arc::new(storage.context()))
            .with_media(media.clone())
            .with_document(document.clone());
        Harness { storage, media, document, platform }
    }

    fn root_theme(document: &MemoryDocument) -> Option<String> {
        document.attribute(&document.root(), THEME_ATTRIBUTE)
    }

    #[test]
    fn test_theme_mode_cycle_and_parse() {
        assert_eq!(ThemeMode::Light.next(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.next(), ThemeMode::System);
        assert_eq!(ThemeMode::System.next(), ThemeMode::Light);
        assert_eq!("DARK".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert!("dim".parse::<ThemeMode>().is_err());
        assert_eq!(ThemeMode::System.to_string(), "system");
    }

    #[test]
    fn test_resolve_truth_table() {
        for mode in ThemeMode::ORDER {
            for prefers_dark in [true, false] {
                let expected = match mode {
                    ThemeMode::System => prefers_dark,
                    other => other == ThemeMode::Dark,
                };
                assert_eq!(mode.resolve(prefers_dark), expected, "{} / {}", mode, prefers_dark);
            }
        }
    }

    #[test]
    fn test_snapshot_icons_and_labels() {
        assert_eq!(ThemeSnapshot::derive(ThemeMode::System, true).icon(), "fa-circle-half-stroke");
        assert_eq!(ThemeSnapshot::derive(ThemeMode::Dark, false).icon(), "fa-moon");
        assert_eq!(ThemeSnapshot::derive(ThemeMode::Light, true).icon(), "fa-sun");
        assert_eq!(ThemeSnapshot::derive(ThemeMode::Light, true).label(), "Tema Claro");
        assert_eq!(ThemeSnapshot::derive(ThemeMode::Dark, true).label(), "Tema Oscuro");
        assert_eq!(ThemeSnapshot::derive(ThemeMode::System, true).label(), "Sistema");
    }

    #[test]
    fn test_applies_on_mount() {
        let h = harness(true);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();

        assert_eq!(theme.current_theme(), ThemeMode::System);
        assert!(theme.is_dark());
        assert_eq!(root_theme(&h.document).as_deref(), Some("dark"));
        assert!(h.document.has_class(&h.document.root(), "dark"));
    }

    #[test]
    fn test_set_theme_persists() {
        let h = harness(false);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();

        theme.set_theme(ThemeMode::Dark);
        assert!(theme.is_dark());
        assert_eq!(h.storage.peek("theme").as_deref(), Some("\"dark\""));
        assert_eq!(root_theme(&h.document).as_deref(), Some("dark"));
        assert!(!h.document.has_class(&h.document.root(), "light"));
    }

    #[test]
    fn test_toggle_never_produces_system() {
        let h = harness(true);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();

        theme.toggle_theme();
        assert_eq!(theme.current_theme(), ThemeMode::Light);
        theme.toggle_theme();
        assert_eq!(theme.current_theme(), ThemeMode::Dark);
    }

    #[test]
    fn test_cycle_returns_to_start() {
        let h = harness(false);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();
        let start = theme.current_theme();

        theme.cycle_theme();
        theme.cycle_theme();
        theme.cycle_theme();
        assert_eq!(theme.current_theme(), start);
    }

    #[test]
    fn test_follows_system_signal() {
        let h = harness(false);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();
        assert!(!theme.is_dark());

        h.media.set_matches(PREFERS_DARK_QUERY, true);
        assert!(theme.is_dark());
        assert!(theme.prefers_dark());
        assert_eq!(root_theme(&h.document).as_deref(), Some("dark"));

        theme.set_theme(ThemeMode::Light);
        h.media.set_matches(PREFERS_DARK_QUERY, false);
        h.media.set_matches(PREFERS_DARK_QUERY, true);
        assert!(!theme.is_dark());
    }

    #[test]
    fn test_document_written_only_on_change() {
        let h = harness(false);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();
        let root = h.document.root();
        assert_eq!(h.document.class_add_count(&root, "light"), 1);

        // system (light) -> light keeps the scheme
        theme.set_theme(ThemeMode::Light);
        assert_eq!(h.document.class_add_count(&root, "light"), 1);

        theme.set_theme(ThemeMode::Dark);
        assert_eq!(h.document.class_add_count(&root, "dark"), 1);
    }

    #[test]
    fn test_reads_stored_preference() {
        let h = harness(false);
        h.storage.context().set_item("theme", "\"dark\"").unwrap();

        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();
        assert_eq!(theme.current_theme(), ThemeMode::Dark);
        assert_eq!(theme.theme_icon(), "fa-moon");
    }

    #[test]
    fn test_cross_tab_preference_change() {
        let h = harness(false);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();

        h.storage.context().set_item("theme", "\"dark\"").unwrap();
        assert_eq!(theme.current_theme(), ThemeMode::Dark);
        assert_eq!(root_theme(&h.document).as_deref(), Some("dark"));
    }

    #[test]
    fn test_second_controller_rejected() {
        let h = harness(false);
        let first = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();
        let err = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap_err();
        assert_eq!(err, PresentationError::WriterClaimed);

        drop(first);
        assert!(ThemeController::new(&h.platform, ThemeConfig::default()).is_ok());
    }

    #[test]
    fn test_document_callback_reads_controller() {
        let document = Arc::new(HookedDocument::default());
        let platform = Platform::headless().with_document(document.clone());
        let theme = Arc::new(ThemeController::new(&platform, ThemeConfig::default()).unwrap());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let weak = Arc::downgrade(&theme);
        document.set_hook(move || {
            if let Some(theme) = weak.upgrade() {
                sink.lock().push(theme.is_dark());
            }
        });

        theme.set_theme(ThemeMode::Dark);
        assert_eq!(*seen.lock(), vec![true]);
        let root = document.root();
        assert_eq!(document.inner.attribute(&root, THEME_ATTRIBUTE).as_deref(), Some("dark"));
    }

    #[test]
    fn test_document_callback_changes_theme() {
        let document = Arc::new(HookedDocument::default());
        let platform = Platform::headless().with_document(document.clone());
        let theme = Arc::new(ThemeController::new(&platform, ThemeConfig::default()).unwrap());
        let changes = theme.subscribe();

        let weak = Arc::downgrade(&theme);
        document.set_hook(move || {
            if let Some(theme) = weak.upgrade() {
                if theme.is_dark() {
                    theme.set_theme(ThemeMode::Light);
                }
            }
        });

        theme.set_theme(ThemeMode::Dark);

        let root = document.root();
        assert_eq!(theme.current_theme(), ThemeMode::Light);
        assert!(!theme.is_dark());
        assert_eq!(document.inner.attribute(&root, THEME_ATTRIBUTE).as_deref(), Some("light"));
        assert!(document.inner.has_class(&root, "light"));
        assert!(!document.inner.has_class(&root, "dark"));
        assert_eq!(changes.borrow().mode, ThemeMode::Light);
        assert_eq!(platform.presentation().applied(), Some(ColorScheme::Light));
    }

    #[test]
    fn test_concurrent_writers_settle_on_latest() {
        let h = harness(false);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let theme = &theme;
                scope.spawn(move || {
                    for round in 0..200 {
                        let dark = (worker + round) % 2 == 0;
                        theme.set_theme(if dark { ThemeMode::Dark } else { ThemeMode::Light });
                    }
                });
            }
        });

        let expected = theme.current_theme() == ThemeMode::Dark;
        assert_eq!(theme.is_dark(), expected);
        let scheme = if expected { "dark" } else { "light" };
        assert_eq!(root_theme(&h.document).as_deref(), Some(scheme));
        assert_eq!(theme.subscribe().borrow().is_dark, expected);
    }

    #[test]
    fn test_system_flip_during_mount_is_seen() {
        let document = Arc::new(MemoryDocument::new());
        let platform = Platform::headless()
            .with_media(Arc::new(FlipOnListenMedia))
            .with_document(document.clone());

        let theme = ThemeController::new(&platform, ThemeConfig::default()).unwrap();
        assert!(theme.prefers_dark());
        assert!(theme.is_dark());
        assert_eq!(root_theme(&document).as_deref(), Some("dark"));
    }

    #[test]
    fn test_controllers_on_shared_document_exclusive() {
        let document = Arc::new(MemoryDocument::new());
        let first_tab = Platform::headless()
            .with_storage(Arc::new(MemoryStorage::default().context()))
            .with_document(document.clone());
        let second_tab = Platform::headless().with_document(document);

        let first = ThemeController::new(&first_tab, ThemeConfig::default()).unwrap();
        let err = ThemeController::new(&second_tab, ThemeConfig::default()).unwrap_err();
        assert_eq!(err, PresentationError::WriterClaimed);

        drop(first);
        assert!(ThemeController::new(&second_tab, ThemeConfig::default()).is_ok());
    }

    #[test]
    fn test_teardown_unsubscribes_media() {
        let h = harness(false);
        let query = h.media.query(PREFERS_DARK_QUERY);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();
        assert_eq!(query.listener_count(), 1);

        drop(theme);
        assert_eq!(query.listener_count(), 0);
        assert_eq!(h.storage.listener_count(), 0);
    }

    #[test]
    fn test_headless_defaults() {
        let platform = Platform::headless();
        let theme = ThemeController::new(&platform, ThemeConfig::default()).unwrap();

        assert_eq!(theme.current_theme(), ThemeMode::System);
        assert!(!theme.is_dark());
        assert!(theme.is_system());
        theme.set_theme(ThemeMode::Dark);
        assert!(theme.is_dark());
        assert_eq!(platform.presentation().applied(), Some(ColorScheme::Dark));
    }

    #[test]
    fn test_custom_config() {
        let h = harness(true);
        let config = ThemeConfig::new().storage_key("ui-theme").default_mode(ThemeMode::Light);
        let theme = ThemeController::new(&h.platform, config).unwrap();

        assert!(!theme.is_dark());
        theme.set_theme(ThemeMode::System);
        assert!(theme.is_dark());
        assert_eq!(h.storage.peek("ui-theme").as_deref(), Some("\"system\""));
    }

    #[tokio::test]
    async fn test_subscribe_receives_snapshots() {
        let h = harness(false);
        let theme = ThemeController::new(&h.platform, ThemeConfig::default()).unwrap();
        let mut rx = theme.subscribe();

        theme.set_theme(ThemeMode::Dark);
        rx.changed().await.unwrap();
        let snapshot = *rx.borrow_and_update();
        assert_eq!(snapshot.mode, ThemeMode::Dark);
        assert!(snapshot.is_dark);
    }
}
