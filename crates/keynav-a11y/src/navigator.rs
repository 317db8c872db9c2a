//! Keyboard Navigation
//!
//! Public entry point. Owns the tree, the active scope and the state machine,
//! and routes host events (key-down, focus, pointer-down, mutations) to them.

use keynav_dom::{DomTree, MutationRecord, NodeId, TreeAccess, TreeFixture, TreeNotification};

use crate::NavError;
use crate::config::{ConfigResolver, NavigationConfig, ResolvedScope, Scope};
use crate::element::InteractableElement;
use crate::focus::{Direction, FocusStateMachine, NavigationState};
use crate::keyboard::{Key, KeyEvent, KeyOutcome};
use crate::reactor::{ChangeReactor, Listeners};
use crate::schedule::Generation;
use crate::style::{MarkerClasses, StyleCoordinator};

/// Upper bound on notification/task rounds in one `settle`
const MAX_SETTLE_ROUNDS: usize = 64;

/// Keyboard navigation over a host tree
pub struct KeyboardNavigation<T: TreeAccess> {
    tree: T,
    resolver: Option<ConfigResolver>,
    scope: Option<Scope>,
    machine: FocusStateMachine,
    reactor: ChangeReactor,
    /// Bumped on every `init`, part of every scope key
    revision: u32,
}

impl KeyboardNavigation<DomTree> {
    /// Navigator over a tree built from a fixture
    pub fn from_fixture(fixture: &TreeFixture) -> Result<Self, NavError> {
        Ok(Self::new(fixture.build()?))
    }
}

impl<T: TreeAccess> KeyboardNavigation<T> {
    pub fn new(tree: T) -> Self {
        Self {
            tree,
            resolver: None,
            scope: None,
            machine: FocusStateMachine::default(),
            reactor: ChangeReactor::new(),
            revision: 0,
        }
    }

    /// Install `config`, register the global listeners and the style reset
    pub fn init(&mut self, config: NavigationConfig, classes: MarkerClasses) {
        self.machine.clear_markers(&mut self.tree);
        self.revision = self.revision.wrapping_add(1);
        self.resolver = Some(ConfigResolver::new(config, self.revision));
        self.machine.set_style(StyleCoordinator::new(classes));
        self.reactor.register_global(&mut self.tree);
        tracing::debug!("Navigation initialized (config revision {})", self.revision);
    }

    /// `init` after rejecting configs that fail validation
    pub fn init_validated(
        &mut self,
        config: NavigationConfig,
        classes: MarkerClasses,
    ) -> Result<(), NavError> {
        config.validate()?;
        self.init(config, classes);
        Ok(())
    }

    /// Make the scope of `path` active
    pub fn on_change_route(&mut self, path: &str) -> Result<(), NavError> {
        let resolver = self.resolver.as_ref().ok_or(NavError::NotInitialized)?;
        match resolver.resolve_route(path) {
            ResolvedScope::Empty => {
                tracing::debug!("Route {:?} has no elements, resetting", path);
                self.machine.reset(&mut self.tree);
                self.scope = None;
                self.reactor.drop_key_listener();
            }
            ResolvedScope::Active(scope) => {
                tracing::debug!("Route {:?}: {} specs in scope", path, scope.specs.len());
                self.machine.enter_scope(&scope, &mut self.tree);
                self.scope = Some(scope);
                self.reactor.register_route(&mut self.tree);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Host events
    // ------------------------------------------------------------------

    /// Key-down listener
    pub fn key_down(&mut self, event: &KeyEvent) -> KeyOutcome {
        if !self.reactor.listeners().key_down {
            return KeyOutcome::ignored();
        }
        let scope = self.scope.as_ref();
        match event.key {
            Key::Tab => {
                self.machine.on_tab(scope, &mut self.tree);
                KeyOutcome::handled()
            }
            Key::Enter | Key::Space => {
                if !self.machine.state().engaged {
                    return KeyOutcome::ignored();
                }
                self.machine.activate(scope, &mut self.tree);
                KeyOutcome::consumed()
            }
            Key::ArrowDown => self.arrow(Direction::Down),
            Key::ArrowUp => self.arrow(Direction::Up),
            _ => KeyOutcome::ignored(),
        }
    }

    fn arrow(&mut self, direction: Direction) -> KeyOutcome {
        if self.machine.on_arrow(direction, &mut self.tree) {
            KeyOutcome::consumed()
        } else {
            KeyOutcome::ignored()
        }
    }

    /// Focus listener (capture phase)
    pub fn focus_in(&mut self, node: NodeId) {
        if self.reactor.listeners().focus {
            self.machine.on_focus(node, &mut self.tree);
        }
    }

    /// Pointer-down listener
    pub fn pointer_down(&mut self) {
        if self.reactor.listeners().pointer_down {
            self.machine.on_pointer_down(&mut self.tree);
        }
    }

    /// Structural-change subscription
    pub fn on_mutations(&mut self, records: &[MutationRecord]) {
        self.reactor
            .on_mutations(records, &mut self.machine, self.scope.as_ref(), &mut self.tree);
    }

    /// Process tree notifications, then deferred tasks, until both are quiet
    pub fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_ROUNDS {
            let notifications = self.tree.take_notifications();
            if !notifications.is_empty() {
                for notification in notifications {
                    match notification {
                        TreeNotification::Focus(node) => self.focus_in(node),
                        TreeNotification::Mutations(records) => self.on_mutations(&records),
                    }
                }
                continue;
            }
            if self.machine.run_deferred(&mut self.tree) == 0 {
                return;
            }
        }
        tracing::warn!("Tree still busy after {} settle rounds", MAX_SETTLE_ROUNDS);
    }

    /// Key-down, the native default action when not prevented, then settle
    pub fn dispatch_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        let outcome = self.key_down(event);
        if event.key == Key::Tab && !outcome.prevent_default {
            self.tree.advance_sequential_focus(event.shift);
        }
        self.settle();
        outcome
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> &NavigationState {
        self.machine.state()
    }

    pub fn found(&self) -> &[InteractableElement] {
        self.machine.found()
    }

    pub fn current(&self) -> Option<&InteractableElement> {
        self.machine.current()
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn listeners(&self) -> Listeners {
        self.reactor.listeners()
    }

    pub fn generation(&self) -> Generation {
        self.machine.generation()
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElementKind, ElementSpec, General, Route};

    fn config() -> NavigationConfig {
        NavigationConfig {
            general: General::default(),
            routes: vec![Route {
                path: "/".into(),
                elements: vec![ElementSpec::new("a", ElementKind::Button)],
            }],
        }
    }

    #[test]
    fn test_route_change_requires_init() {
        let mut nav = KeyboardNavigation::new(DomTree::new());
        assert!(matches!(nav.on_change_route("/"), Err(NavError::NotInitialized)));
    }

    #[test]
    fn test_keys_ignored_without_listener() {
        let mut nav = KeyboardNavigation::new(DomTree::new());
        let outcome = nav.key_down(&KeyEvent::new(Key::Tab));
        assert_eq!(outcome, KeyOutcome::ignored());
        assert!(!nav.state().engaged);
    }

    #[test]
    fn test_tab_before_route_change_stays_idle() {
        let mut nav = KeyboardNavigation::new(DomTree::new());
        nav.init(config(), MarkerClasses::default());
        assert!(nav.listeners().key_down);

        nav.dispatch_key(&KeyEvent::new(Key::Tab));
        assert_eq!(nav.state(), &NavigationState::default());
        assert!(nav.found().is_empty());
    }

    #[test]
    fn test_init_validated_rejects_invalid_config() {
        let mut nav = KeyboardNavigation::new(DomTree::new());
        let mut invalid = config();
        invalid.routes[0].elements.push(ElementSpec::new("a", ElementKind::Button));

        assert!(matches!(
            nav.init_validated(invalid, MarkerClasses::default()),
            Err(NavError::Config(_))
        ));
        assert!(!nav.listeners().key_down);
        assert!(nav.init_validated(config(), MarkerClasses::default()).is_ok());
        assert!(nav.listeners().key_down);
    }

    #[test]
    fn test_init_bumps_revision() {
        let mut nav = KeyboardNavigation::new(DomTree::new());
        nav.init(config(), MarkerClasses::default());
        nav.on_change_route("/").unwrap();
        let first = nav.scope().unwrap().key.clone();

        nav.init(config(), MarkerClasses::default());
        nav.on_change_route("/").unwrap();
        assert_ne!(nav.scope().unwrap().key, first);
        assert_eq!(nav.tree().styles().len(), 1);
    }

    #[test]
    fn test_unknown_route_without_header_resets() {
        let mut nav = KeyboardNavigation::new(DomTree::new());
        nav.init(config(), MarkerClasses::default());
        nav.on_change_route("/").unwrap();
        assert!(nav.listeners().key_down);

        nav.on_change_route("/missing").unwrap();
        assert!(nav.scope().is_none());
        assert!(!nav.listeners().key_down);
        assert_eq!(nav.state(), &NavigationState::default());
    }
}
