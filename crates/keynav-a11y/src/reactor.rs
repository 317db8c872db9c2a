//! Listener bookkeeping and structural change handling

use keynav_dom::{MutationRecord, TreeAccess};

use crate::config::Scope;
use crate::focus::FocusStateMachine;

/// Removes the native focus outline; markers replace it
pub const STYLE_RESET: &str = "* { outline: none; }";

/// Registered listeners
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Listeners {
    pub pointer_down: bool,
    pub key_down: bool,
    pub focus: bool,
    pub structure: bool,
}

/// Reacts to tree changes on behalf of the navigator
#[derive(Debug, Default)]
pub struct ChangeReactor {
    listeners: Listeners,
    style_installed: bool,
}

impl ChangeReactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listeners(&self) -> Listeners {
        self.listeners
    }

    /// Document-wide listeners, registered once
    pub fn register_global(&mut self, tree: &mut dyn TreeAccess) {
        if !self.listeners.pointer_down || !self.listeners.key_down {
            tracing::trace!("Registering pointer and key listeners");
        }
        self.listeners.pointer_down = true;
        self.listeners.key_down = true;
        self.install_style_reset(tree);
    }

    /// Listeners needed while a route has elements
    pub fn register_route(&mut self, tree: &mut dyn TreeAccess) {
        self.listeners.key_down = true;
        self.listeners.focus = true;
        if !self.listeners.structure {
            tree.observe_structure();
            self.listeners.structure = true;
            tracing::trace!("Observing structural changes");
        }
        self.install_style_reset(tree);
    }

    pub fn drop_key_listener(&mut self) {
        self.listeners.key_down = false;
    }

    fn install_style_reset(&mut self, tree: &mut dyn TreeAccess) {
        if !self.style_installed {
            tree.install_style(STYLE_RESET);
            self.style_installed = true;
        }
    }

    /// Rediscover after a structural change; returns whether it did
    pub fn on_mutations(
        &self,
        records: &[MutationRecord],
        machine: &mut FocusStateMachine,
        scope: Option<&Scope>,
        tree: &mut dyn TreeAccess,
    ) -> bool {
        if !self.listeners.structure || !records.iter().any(MutationRecord::is_structural) {
            return false;
        }
        let Some(scope) = scope else {
            return false;
        };
        tracing::trace!("{} mutation records, rediscovering", records.len());
        machine.rediscover(scope, tree);
        if !machine.state().engaged {
            machine.clear_markers(tree);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElementKind, ElementSpec, ScopeKey};
    use keynav_dom::{DomTree, NodeId};

    fn scope(specs: Vec<ElementSpec>) -> Scope {
        Scope {
            key: ScopeKey {
                revision: 1,
                route: None,
            },
            specs,
        }
    }

    #[test]
    fn test_style_reset_installed_once() {
        let mut tree = DomTree::new();
        let mut reactor = ChangeReactor::new();
        reactor.register_global(&mut tree);
        reactor.register_route(&mut tree);
        reactor.register_route(&mut tree);

        assert_eq!(tree.styles(), &[STYLE_RESET.to_string()]);
        let listeners = reactor.listeners();
        assert!(listeners.pointer_down && listeners.key_down);
        assert!(listeners.focus && listeners.structure);

        reactor.drop_key_listener();
        assert!(!reactor.listeners().key_down);
    }

    #[test]
    fn test_mutations_ignored_until_observed() {
        let mut tree = DomTree::new();
        let reactor = ChangeReactor::new();
        let mut machine = FocusStateMachine::default();
        let scope = scope(vec![ElementSpec::new("a", ElementKind::Button)]);
        let records = [MutationRecord::child_list(NodeId::ROOT, vec![], vec![])];

        assert!(!reactor.on_mutations(&records, &mut machine, Some(&scope), &mut tree));
    }

    #[test]
    fn test_structural_change_rediscovers() {
        let mut tree = DomTree::new();
        let mut reactor = ChangeReactor::new();
        reactor.register_route(&mut tree);
        let mut machine = FocusStateMachine::default();
        let scope = scope(vec![ElementSpec::new("a", ElementKind::Button)]);

        let a = tree.create_element_with_id("button", "a");
        let body = tree.body();
        tree.append_child(body, a).unwrap();
        let records = tree.take_notifications();
        assert_eq!(records.len(), 1);
        let keynav_dom::TreeNotification::Mutations(records) = &records[0] else {
            panic!("expected mutations");
        };

        assert!(reactor.on_mutations(records, &mut machine, Some(&scope), &mut tree));
        assert_eq!(machine.found().len(), 1);
        assert_eq!(tree.attribute(a, "tabindex").as_deref(), Some("1"));
    }
}
