//! Client state management for Folio
//!
//! This crate provides the reactive state components a page mounts against
//! its host [`Platform`](app_platform::Platform):
//!
//! - [`theme`] - Persisted light/dark/system preference applied to the document
//! - [`viewport`] - Breakpoint classification of the window size
//! - [`visibility`] - Intersection-driven visibility and entry animations
//! - [`scroll_spy`] - Active-section tracking and smooth scrolling
//!
//! Every component is inert on a headless platform.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod scroll_spy;
pub mod theme;
pub mod viewport;
pub mod visibility;

pub use scroll_spy::{ScrollSpy, ScrollSpyConfig, ScrollTarget, SectionInfo, SmoothScroll};
pub use theme::{ThemeConfig, ThemeController, ThemeMode, ThemeSnapshot};
pub use viewport::{Breakpoint, ViewportClassifier, ViewportState};
pub use visibility::{
    AnimationOptions, ObserverControl, ObserverOptions, ScrollAnimation, VisibilityObserver,
};
