//! Viewport breakpoint classification
//!
//! Breakpoints follow the utility-CSS scale: `xs` from 0, `sm` from 640,
//! `md` from 768, `lg` from 1024, `xl` from 1280 and `2xl` from 1536. The
//! active breakpoint is the highest one whose threshold does not exceed the
//! viewport width.

use app_platform::{Listeners, Platform, Subscription, ViewportSize};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// Named viewport width tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Breakpoint {
    /// Below 640px
    #[default]
    #[serde(rename = "xs")]
    Xs,
    /// 640px and up
    #[serde(rename = "sm")]
    Sm,
    /// 768px and up
    #[serde(rename = "md")]
    Md,
    /// 1024px and up
    #[serde(rename = "lg")]
    Lg,
    /// 1280px and up
    #[serde(rename = "xl")]
    Xl,
    /// 1536px and up
    #[serde(rename = "2xl")]
    Xxl,
}

impl Breakpoint {
    /// All breakpoints in ascending order
    pub const ALL: [Breakpoint; 6] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
        Breakpoint::Xxl,
    ];

    /// Minimum width in pixels
    pub fn min_width(&self) -> u32 {
        match self {
            Breakpoint::Xs => 0,
            Breakpoint::Sm => 640,
            Breakpoint::Md => 768,
            Breakpoint::Lg => 1024,
            Breakpoint::Xl => 1280,
            Breakpoint::Xxl => 1536,
        }
    }

    /// The next larger breakpoint
    pub fn next(&self) -> Option<Breakpoint> {
        match self {
            Breakpoint::Xs => Some(Breakpoint::Sm),
            Breakpoint::Sm => Some(Breakpoint::Md),
            Breakpoint::Md => Some(Breakpoint::Lg),
            Breakpoint::Lg => Some(Breakpoint::Xl),
            Breakpoint::Xl => Some(Breakpoint::Xxl),
            Breakpoint::Xxl => None,
        }
    }

    /// Breakpoint active at `width`
    pub fn for_width(width: u32) -> Breakpoint {
        Self::ALL
            .iter()
            .rev()
            .find(|bp| width >= bp.min_width())
            .copied()
            .unwrap_or_default()
    }

    /// Label
    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
            Breakpoint::Xxl => "2xl",
        }
    }
}

impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Breakpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|bp| bp.as_str() == s.to_lowercase())
            .copied()
            .ok_or_else(|| format!("Unknown breakpoint: {}", s))
    }
}

/// Viewport dimensions and everything derived from them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewportState {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Active breakpoint
    pub breakpoint: Breakpoint,
}

impl ViewportState {
    /// Derive the state for a size
    pub fn from_size(size: ViewportSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            breakpoint: Breakpoint::for_width(size.width),
        }
    }

    /// Whether the active breakpoint is `bp`
    pub fn is(&self, bp: Breakpoint) -> bool {
        self.breakpoint == bp
    }

    /// Whether the width reaches `bp`
    pub fn is_and_up(&self, bp: Breakpoint) -> bool {
        self.width >= bp.min_width()
    }

    /// Whether the width is below the breakpoint after `bp`
    pub fn is_and_down(&self, bp: Breakpoint) -> bool {
        match bp.next() {
            Some(next) => self.width < next.min_width(),
            None => true,
        }
    }

    /// Below `md`
    pub fn is_mobile(&self) -> bool {
        self.width < Breakpoint::Md.min_width()
    }

    /// From `md` up to `lg`
    pub fn is_tablet(&self) -> bool {
        self.width >= Breakpoint::Md.min_width() && self.width < Breakpoint::Lg.min_width()
    }

    /// `lg` and up
    pub fn is_desktop(&self) -> bool {
        self.width >= Breakpoint::Lg.min_width()
    }

    /// Wider than tall
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Taller than wide
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

struct ClassifierInner {
    state: RwLock<ViewportState>,
    listeners: Listeners<ViewportState>,
    sender: watch::Sender<ViewportState>,
}

impl ClassifierInner {
    fn resize(&self, size: ViewportSize) {
        let next = ViewportState::from_size(size);
        {
            let mut state = self.state.write();
            if *state == next {
                return;
            }
            if state.breakpoint != next.breakpoint {
                tracing::debug!("Breakpoint changed: {} -> {}", state.breakpoint, next.breakpoint);
            }
            *state = next;
        }

        self.sender.send_replace(next);
        self.listeners.emit(&next);
    }
}

/// Tracks the viewport size and its breakpoint
pub struct ViewportClassifier {
    inner: Arc<ClassifierInner>,
    _resize_subscription: Subscription,
}

impl ViewportClassifier {
    /// Mount on `platform`; dimensions stay zero without a viewport
    pub fn new(platform: &Platform) -> Self {
        let viewport = platform.viewport();
        let size = viewport.as_ref().map(|v| v.inner_size()).unwrap_or_default();
        let initial = ViewportState::from_size(size);

        let (sender, _) = watch::channel(initial);
        let inner = Arc::new(ClassifierInner {
            state: RwLock::new(initial),
            listeners: Listeners::new(),
            sender,
        });

        let subscription = match viewport {
            Some(viewport) => {
                let weak: Weak<ClassifierInner> = Arc::downgrade(&inner);
                viewport.on_resize(Arc::new(move |size: ViewportSize| {
                    if let Some(inner) = weak.upgrade() {
                        inner.resize(size);
                    }
                }))
            }
            None => Subscription::noop(),
        };

        Self { inner, _resize_subscription: subscription }
    }

    /// Current state
    pub fn state(&self) -> ViewportState {
        *self.inner.state.read()
    }

    /// Current width
    pub fn width(&self) -> u32 {
        self.state().width
    }

    /// Current height
    pub fn height(&self) -> u32 {
        self.state().height
    }

    /// Active breakpoint
    pub fn current_breakpoint(&self) -> Breakpoint {
        self.state().breakpoint
    }

    /// Whether the active breakpoint is `bp`
    pub fn is(&self, bp: Breakpoint) -> bool {
        self.state().is(bp)
    }

    /// Whether the width reaches `bp`
    pub fn is_and_up(&self, bp: Breakpoint) -> bool {
        self.state().is_and_up(bp)
    }

    /// Whether the width is below the breakpoint after `bp`
    pub fn is_and_down(&self, bp: Breakpoint) -> bool {
        self.state().is_and_down(bp)
    }

    /// Below `md`
    pub fn is_mobile(&self) -> bool {
        self.state().is_mobile()
    }

    /// From `md` up to `lg`
    pub fn is_tablet(&self) -> bool {
        self.state().is_tablet()
    }

    /// `lg` and up
    pub fn is_desktop(&self) -> bool {
        self.state().is_desktop()
    }

    /// Wider than tall
    pub fn is_landscape(&self) -> bool {
        self.state().is_landscape()
    }

    /// Taller than wide
    pub fn is_portrait(&self) -> bool {
        self.state().is_portrait()
    }

    /// Run `listener` after every size change
    pub fn on_change(&self, listener: impl Fn(&ViewportState) + Send + Sync + 'static) -> Subscription {
        self.inner.listeners.add(listener)
    }

    /// Watch the state
    pub fn subscribe(&self) -> watch::Receiver<ViewportState> {
        self.inner.sender.subscribe()
    }
}

impl std::fmt::Debug for ViewportClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportClassifier").field("state", &self.state()).finish()
    }
}
