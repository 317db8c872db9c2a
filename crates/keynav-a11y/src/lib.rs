//! keynav Accessibility
//!
//! Keyboard focus navigation over a declarative, per-route description of
//! the interactable elements of a page.
//!
//! Features:
//! - Route scopes (shared header and footer around route elements)
//! - List and tab groups expanded from numbered child ids
//! - Focus markers, simulated focus on proxy targets
//! - Circular sub-navigation inside lists
//! - ARIA role and relation bookkeeping

pub mod aria;
pub mod config;
pub mod discovery;
pub mod element;
pub mod focus;
pub mod keyboard;
pub mod navigator;
pub mod reactor;
pub mod schedule;
pub mod style;

pub use aria::AriaRole;
pub use config::{
    ActivationAction, AttributeOverride, ConfigError, ConfigIssue, ConfigResolver, ElementKind,
    ElementSpec, General, NavigationConfig, ResolvedScope, Route, Scope, ScopeKey,
};
pub use discovery::{ElementDiscovery, expand_children};
pub use element::{ElementBehavior, InteractableElement, behavior};
pub use focus::{Direction, FocusStateMachine, Mode, NavigationState};
pub use keyboard::{Key, KeyEvent, KeyOutcome};
pub use navigator::KeyboardNavigation;
pub use reactor::{ChangeReactor, Listeners, STYLE_RESET};
pub use schedule::{DeferredQueue, DeferredTask, Generation};
pub use style::{MarkerClasses, StyleCoordinator};

/// Navigation error
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("Navigation used before init")]
    NotInitialized,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tree error: {0}")]
    Dom(#[from] keynav_dom::DomError),
}
