//! Element discovery
//!
//! Resolves the specs in scope against the live tree. Specs whose id is not
//! attached are skipped, list and tab groups expand into their numbered
//! children, and an attached modal with declared children narrows the pass to
//! those children.

use keynav_dom::{NodeId, TreeAccess};

use crate::aria::{self, AriaRole};
use crate::config::{ElementKind, ElementSpec, Scope, ScopeKey};
use crate::element::{InteractableElement, behavior, child_id};

/// Dense suffix enumeration: `id-1`, `id-2`, ... up to the first gap
pub fn expand_children(id: &str, tree: &dyn TreeAccess) -> Vec<(String, NodeId)> {
    (1..)
        .map(|index| child_id(id, index))
        .map_while(|child| tree.lookup(&child).map(|node| (child, node)))
        .collect()
}

/// Resolves scopes into interactable elements, remembering the last pass
#[derive(Debug, Default)]
pub struct ElementDiscovery {
    last_key: Option<ScopeKey>,
    last: Vec<InteractableElement>,
}

impl ElementDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous pass
    pub fn invalidate(&mut self) {
        self.last_key = None;
        self.last.clear();
    }

    /// Resolve `scope` into the ordered top-level elements
    pub fn resolve(
        &mut self,
        scope: &Scope,
        tree: &mut dyn TreeAccess,
    ) -> Vec<InteractableElement> {
        if let Some(kept) = self.reuse(scope, &*tree) {
            tracing::trace!("Reusing {} elements of scope {:?}", kept.len(), scope.key);
            self.last = kept.clone();
            return kept;
        }

        let found = resolve_specs(&scope.specs, tree);
        tracing::debug!(
            "Discovered {} of {} specs for scope {:?}",
            found.len(),
            scope.specs.len(),
            scope.key
        );
        self.last_key = Some(scope.key.clone());
        self.last = found.clone();
        found
    }

    /// Previous pass filtered to attached elements, when it can stand in
    /// for a full pass: same scope, nothing to expand or narrow, and every
    /// spec still resolved.
    fn reuse(&self, scope: &Scope, tree: &dyn TreeAccess) -> Option<Vec<InteractableElement>> {
        if self.last_key.as_ref() != Some(&scope.key) || scope.has_groups() || scope.has_modals() {
            return None;
        }
        let kept: Vec<InteractableElement> = self
            .last
            .iter()
            .filter(|e| tree.is_attached(e.node))
            .cloned()
            .collect();
        (kept.len() == scope.specs.len()).then_some(kept)
    }
}

/// One discovery pass over `specs`
pub fn resolve_specs(specs: &[ElementSpec], tree: &mut dyn TreeAccess) -> Vec<InteractableElement> {
    let modal = specs.iter().find(|s| {
        s.kind == ElementKind::Modal && !s.modal_children.is_empty() && tree.lookup(&s.id).is_some()
    });
    if let Some(modal) = modal {
        tracing::trace!("Modal {:?} narrows discovery", modal.id);
        return resolve_specs(&modal.modal_children, tree);
    }

    let mut found = Vec::new();
    for spec in specs {
        let Some(node) = tree.lookup(&spec.id) else {
            continue;
        };
        for attr in &spec.attribute_overrides {
            tree.set_attribute(node, &attr.name, &attr.value);
        }
        match behavior(spec.kind).group_roles() {
            Some((container, item)) => expand_group(spec, node, container, item, tree, &mut found),
            None => found.push(interactable(spec.clone(), node, &*tree)),
        }
    }
    found
}

fn expand_group(
    spec: &ElementSpec,
    node: NodeId,
    container: AriaRole,
    item: AriaRole,
    tree: &mut dyn TreeAccess,
    found: &mut Vec<InteractableElement>,
) {
    tree.set_attribute(node, aria::ROLE, container.as_str());

    for (position, (id, child)) in expand_children(&spec.id, &*tree).into_iter().enumerate() {
        tree.set_attribute(child, aria::ROLE, item.as_str());
        if let Some(panel_id) = spec.tab_target_ids.get(position) {
            tree.set_attribute(child, aria::ARIA_CONTROLS, panel_id);
            if let Some(panel) = tree.lookup(panel_id) {
                tree.set_attribute(panel, aria::ARIA_LABELLEDBY, &id);
                tree.set_attribute(panel, aria::ROLE, AriaRole::TabPanel.as_str());
            }
        }

        let mut child_spec = spec.clone();
        child_spec.kind = spec.child_kind();
        child_spec.id = id;
        child_spec.item_type = None;
        child_spec.modal_children.clear();
        child_spec.attribute_overrides.clear();
        found.push(interactable(child_spec, child, &*tree));
    }
}

fn interactable(spec: ElementSpec, node: NodeId, tree: &dyn TreeAccess) -> InteractableElement {
    let rect = tree.bounding_rect(node);
    InteractableElement {
        spec,
        node,
        x: rect.left(),
        y: rect.top(),
    }
}
