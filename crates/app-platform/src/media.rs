//! Media query interface

use crate::subscription::Subscription;
use std::sync::Arc;

/// Query matching a system-level dark color-scheme preference
pub const PREFERS_DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// Listener receiving the new match state of a media query
pub type MediaListener = Arc<dyn Fn(bool) + Send + Sync>;

/// A live media query
pub trait MediaQueryList: Send + Sync {
    /// The query text
    fn media(&self) -> &str;

    /// Whether the query currently matches
    fn matches(&self) -> bool;

    /// Listen for match state changes
    fn on_change(&self, listener: MediaListener) -> Subscription;
}

/// Evaluates media queries
pub trait MediaMatcher: Send + Sync {
    /// Evaluate `query`, or `None` when the host cannot evaluate it
    fn match_media(&self, query: &str) -> Option<Arc<dyn MediaQueryList>>;
}
