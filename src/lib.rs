//! Folio client state
//!
//! Mounts the portfolio's reactive state components on one [`Platform`]:
//! the theme controller, the viewport classifier, the section scroll spy,
//! and a smooth-scroll helper for in-page links. Everything mounted here is
//! torn down when the [`ClientState`] is dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]

use app_core::Section;
use app_platform::{Platform, PresentationError};
use app_state::{
    scroll_spy::DEFAULT_SMOOTH_OFFSET, ScrollSpy, ScrollSpyConfig, SmoothScroll, ThemeConfig,
    ThemeController, ViewportClassifier,
};

pub use app_core;
pub use app_platform;
pub use app_state;
pub use storage;

/// Configuration for [`ClientState::mount_with`]
#[derive(Debug, Clone)]
pub struct ClientStateConfig {
    /// Theme preference key and default mode
    pub theme: ThemeConfig,
    /// Scroll spy tuning
    pub scroll_spy: ScrollSpyConfig,
    /// Section ids tracked by the scroll spy, in page order
    pub sections: Vec<String>,
    /// Header offset used by smooth scrolling
    pub smooth_offset: f64,
}

impl Default for ClientStateConfig {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            scroll_spy: ScrollSpyConfig::default(),
            sections: Section::ids().iter().map(|id| id.to_string()).collect(),
            smooth_offset: DEFAULT_SMOOTH_OFFSET,
        }
    }
}

impl ClientStateConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the theme configuration
    pub fn theme(mut self, theme: ThemeConfig) -> Self {
        self.theme = theme;
        self
    }

    /// Set the scroll spy configuration
    pub fn scroll_spy(mut self, config: ScrollSpyConfig) -> Self {
        self.scroll_spy = config;
        self
    }

    /// Replace the tracked sections
    pub fn sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections = sections.into_iter().map(Into::into).collect();
        self
    }

    /// Set the smooth-scroll header offset
    pub fn smooth_offset(mut self, offset: f64) -> Self {
        self.smooth_offset = offset;
        self
    }
}

/// Every client-state component mounted on one platform
pub struct ClientState {
    platform: Platform,
    theme: ThemeController,
    viewport: ViewportClassifier,
    scroll_spy: ScrollSpy,
    smooth_scroll: SmoothScroll,
}

impl ClientState {
    /// Mount with the default configuration
    pub fn mount(platform: Platform) -> Result<Self, PresentationError> {
        Self::mount_with(platform, ClientStateConfig::default())
    }

    /// Mount with `config`
    ///
    /// Fails when another theme controller already owns the document
    /// presentation of `platform`.
    pub fn mount_with(platform: Platform, config: ClientStateConfig) -> Result<Self, PresentationError> {
        let theme = ThemeController::new(&platform, config.theme)?;
        let viewport = ViewportClassifier::new(&platform);
        let scroll_spy = ScrollSpy::new(&platform, config.sections, config.scroll_spy);
        let smooth_scroll = SmoothScroll::new(&platform, config.smooth_offset);

        tracing::info!(
            "Client state mounted (capabilities: {:?}, theme: {}, breakpoint: {})",
            platform.capabilities(),
            theme.current_theme(),
            viewport.current_breakpoint()
        );

        Ok(Self { platform, theme, viewport, scroll_spy, smooth_scroll })
    }

    /// The platform everything is mounted on
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Theme controller
    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    /// Viewport classifier
    pub fn viewport(&self) -> &ViewportClassifier {
        &self.viewport
    }

    /// Section scroll spy
    pub fn scroll_spy(&self) -> &ScrollSpy {
        &self.scroll_spy
    }

    /// Smooth-scroll helper
    pub fn smooth_scroll(&self) -> &SmoothScroll {
        &self.smooth_scroll
    }

    /// Active page section, if it is one of the known sections
    pub fn active_section(&self) -> Option<Section> {
        self.scroll_spy.active_section().as_deref().and_then(Section::from_id)
    }
}

impl Drop for ClientState {
    fn drop(&mut self) {
        tracing::debug!("Client state unmounted");
    }
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientState")
            .field("theme", &self.theme)
            .field("viewport", &self.viewport)
            .field("scroll_spy", &self.scroll_spy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_platform::memory::{MemoryDocument, MemoryIntersection, MemoryViewport};
    use app_state::{Breakpoint, ThemeMode};
    use std::sync::Arc;
    use storage::MemoryStorage;

    #[test]
    fn test_headless_mount() {
        let state = ClientState::mount(Platform::headless()).unwrap();

        assert_eq!(state.theme().current_theme(), ThemeMode::System);
        assert!(!state.theme().is_dark());
        assert_eq!(state.viewport().current_breakpoint(), Breakpoint::Xs);
        assert_eq!(state.scroll_spy().section_ids().len(), 5);
        assert!(!state.scroll_spy().is_observing());
        assert!(state.active_section().is_none());
    }

    #[test]
    fn test_second_mount_rejected_until_drop() {
        let platform = Platform::headless();
        let first = ClientState::mount(platform.clone()).unwrap();

        assert!(matches!(
            ClientState::mount(platform.clone()),
            Err(PresentationError::WriterClaimed)
        ));

        drop(first);
        assert!(ClientState::mount(platform).is_ok());
    }

    #[test]
    fn test_mount_watches_present_sections() {
        let document = Arc::new(MemoryDocument::new());
        document.insert("home", 0.0);
        document.insert("about", 500.0);
        let intersection = Arc::new(MemoryIntersection::new());
        let platform = Platform::headless()
            .with_storage(Arc::new(MemoryStorage::default().context()))
            .with_viewport(Arc::new(MemoryViewport::new(1100, 800)))
            .with_intersection(intersection.clone())
            .with_document(document);

        let state = ClientState::mount(platform).unwrap();
        assert!(state.scroll_spy().is_observing());
        assert_eq!(intersection.observers()[0].targets().len(), 2);
        assert_eq!(state.viewport().current_breakpoint(), Breakpoint::Lg);

        drop(state);
        assert_eq!(intersection.connected_count(), 0);
    }

    #[test]
    fn test_custom_sections() {
        let config = ClientStateConfig::new().sections(["intro", "faq"]).smooth_offset(64.0);
        let state = ClientState::mount_with(Platform::headless(), config).unwrap();

        assert_eq!(state.scroll_spy().section_ids(), ["intro", "faq"]);
        assert_eq!(state.smooth_scroll().offset(), 64.0);
    }
}
