//! Cross-Tab Sync Tests
//!
//! Persisted values and the theme preference shared between execution
//! contexts of one storage origin, over the in-memory and sled backends.

use app_platform::memory::{MemoryDocument, MemoryMedia};
use app_platform::{Platform, StorageArea, PREFERS_DARK_QUERY};
use app_state::{ThemeConfig, ThemeController, ThemeMode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{KvConfig, MemoryStorage, PersistedValue, SledStorage};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One tab: its own document and media, sharing the given storage context
fn tab(storage: Arc<dyn StorageArea>) -> Platform {
    Platform::headless()
        .with_storage(storage)
        .with_media(Arc::new(MemoryMedia::new()))
        .with_document(Arc::new(MemoryDocument::new()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Layout {
    sidebar: bool,
    density: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self { sidebar: true, density: "comfortable".to_string() }
    }
}

/// Theme changes in one tab reach the other
#[test]
fn test_theme_follows_other_tab() {
    init_tracing();
    let origin = MemoryStorage::default();
    let first_tab = tab(Arc::new(origin.context()));
    let second_tab = tab(Arc::new(origin.context()));

    let first = ThemeController::new(&first_tab, ThemeConfig::default()).unwrap();
    let second = ThemeController::new(&second_tab, ThemeConfig::default()).unwrap();

    first.set_theme(ThemeMode::Dark);
    assert_eq!(second.current_theme(), ThemeMode::Dark);
    assert!(second.is_dark());
    assert_eq!(second_tab.presentation().applied().map(|s| s.as_str()), Some("dark"));

    second.cycle_theme();
    assert_eq!(first.current_theme(), ThemeMode::System);
}

/// Writes under other keys do not disturb a bound value
#[test]
fn test_other_key_unaffected() {
    init_tracing();
    let origin = MemoryStorage::default();
    let theme_tab = tab(Arc::new(origin.context()));
    let other = origin.context();

    let theme = ThemeController::new(&theme_tab, ThemeConfig::default()).unwrap();
    theme.set_theme(ThemeMode::Light);

    other.set_item("language", "\"es\"").unwrap();
    other.set_item("themes", "\"dark\"").unwrap();

    assert_eq!(theme.current_theme(), ThemeMode::Light);
}

/// An undecodable value written by another tab is dropped
#[test]
fn test_malformed_value_ignored() {
    init_tracing();
    let origin = MemoryStorage::default();
    let theme_tab = tab(Arc::new(origin.context()));
    let other = origin.context();

    let theme = ThemeController::new(&theme_tab, ThemeConfig::default()).unwrap();
    theme.set_theme(ThemeMode::Dark);

    other.set_item("theme", "{not json").unwrap();
    assert_eq!(theme.current_theme(), ThemeMode::Dark);

    other.set_item("theme", "\"sepia\"").unwrap();
    assert_eq!(theme.current_theme(), ThemeMode::Dark);
}

/// Removal in another tab leaves the in-memory preference alone
#[test]
fn test_removal_in_other_tab_ignored() {
    init_tracing();
    let origin = MemoryStorage::default();
    let values = PersistedValue::bind(Some(Arc::new(origin.context())), "layout", Layout::default());
    let other = origin.context();

    let compact = Layout { sidebar: false, density: "compact".to_string() };
    values.set(compact.clone());
    other.remove_item("layout").unwrap();
    assert_eq!(values.get(), compact);

    other.clear().unwrap();
    assert_eq!(values.get(), compact);
}

/// Structured values round through another tab
#[test]
fn test_structured_value_shared() {
    init_tracing();
    let origin = MemoryStorage::default();
    let first: PersistedValue<Layout> =
        PersistedValue::bind(Some(Arc::new(origin.context())), "layout", Layout::default());
    let second: PersistedValue<Layout> =
        PersistedValue::bind(Some(Arc::new(origin.context())), "layout", Layout::default());

    first.update(|layout| Layout { density: "compact".to_string(), ..layout.clone() });

    assert_eq!(second.get().density, "compact");
    assert!(second.get().sidebar);
}

/// The system preference stays per tab while the stored preference is shared
#[test]
fn test_system_preference_is_per_tab() {
    init_tracing();
    let origin = MemoryStorage::default();
    let dark_media = Arc::new(MemoryMedia::new());
    dark_media.set_matches(PREFERS_DARK_QUERY, true);

    let first_tab = tab(Arc::new(origin.context()));
    let second_tab = Platform::headless()
        .with_storage(Arc::new(origin.context()))
        .with_media(dark_media)
        .with_document(Arc::new(MemoryDocument::new()));

    let first = ThemeController::new(&first_tab, ThemeConfig::default()).unwrap();
    let second = ThemeController::new(&second_tab, ThemeConfig::default()).unwrap();

    first.set_theme(ThemeMode::System);
    assert!(!first.is_dark());
    assert!(second.is_dark());
}

/// Change notifications arrive on the watch channel of the other tab
#[tokio::test]
async fn test_subscriber_sees_other_tab() {
    init_tracing();
    let origin = MemoryStorage::default();
    let first_tab = tab(Arc::new(origin.context()));
    let second_tab = tab(Arc::new(origin.context()));

    let first = ThemeController::new(&first_tab, ThemeConfig::default()).unwrap();
    let second = ThemeController::new(&second_tab, ThemeConfig::default()).unwrap();
    let mut changes = second.subscribe();

    first.set_theme(ThemeMode::Dark);

    changes.changed().await.unwrap();
    let snapshot = *changes.borrow_and_update();
    assert_eq!(snapshot.mode, ThemeMode::Dark);
    assert!(snapshot.is_dark);
}

/// Tabs over one sled database see each other's writes
#[test]
fn test_sled_contexts_share_theme() {
    init_tracing();
    let db = SledStorage::temporary().unwrap();
    let first_tab = tab(Arc::new(db.context()));
    let second_tab = tab(Arc::new(db.context()));

    let first = ThemeController::new(&first_tab, ThemeConfig::default()).unwrap();
    let second = ThemeController::new(&second_tab, ThemeConfig::default()).unwrap();

    first.set_theme(ThemeMode::Light);
    assert_eq!(second.current_theme(), ThemeMode::Light);
    assert_eq!(db.context().get_item("theme").unwrap().as_deref(), Some("\"light\""));
}

/// A preference written to disk is restored by the next session
#[test]
fn test_sled_preference_survives_restart() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("folio_kv.db");
    let config = KvConfig::new(path.to_string_lossy()).flush_every_ms(None);

    {
        let db = SledStorage::open(config.clone()).unwrap();
        let platform = tab(Arc::new(db.context()));
        let theme = ThemeController::new(&platform, ThemeConfig::default()).unwrap();
        theme.set_theme(ThemeMode::Dark);
        db.flush().unwrap();
    }

    {
        let db = SledStorage::open(config).unwrap();
        let platform = tab(Arc::new(db.context()));
        let theme = ThemeController::new(&platform, ThemeConfig::default()).unwrap();
        assert_eq!(theme.current_theme(), ThemeMode::Dark);
        assert!(theme.is_dark());
    }
}
