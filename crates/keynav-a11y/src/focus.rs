//! Focus Management
//!
//! Navigation state machine. `Idle` until the first Tab press, `Navigating`
//! while Tab/focus events walk the found elements, `SubNavigating` while the
//! arrow keys move a circular cursor over the items of a list.
//!
//! Markers are only shown while the user is engaged in keyboard navigation;
//! a pointer press disengages and strips them until the next Tab.

use keynav_dom::{NativeAction, NodeId, TreeAccess};

use crate::aria::{self, AriaRole};
use crate::config::{ActivationAction, ElementKind, Scope};
use crate::discovery::{ElementDiscovery, expand_children};
use crate::element::{ActivationContext, InteractableElement, Step};
use crate::schedule::{DeferredQueue, DeferredTask, Generation};
use crate::style::StyleCoordinator;

/// State machine mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Navigating,
    SubNavigating,
}

/// Sub-navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Navigation state
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub mode: Mode,
    pub current_index: usize,
    pub previous_index: usize,
    pub current_type: Option<ElementKind>,
    pub sub_navigation_active: bool,
    /// Items of the list being sub-navigated
    pub sub_items: Vec<NodeId>,
    /// Highlighted sub-item, -1 when none
    pub sub_cursor: isize,
    /// Keyboard navigation in progress
    pub engaged: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            mode: Mode::Idle,
            current_index: 0,
            previous_index: 0,
            current_type: None,
            sub_navigation_active: false,
            sub_items: Vec::new(),
            sub_cursor: -1,
            engaged: false,
        }
    }
}

impl NavigationState {
    /// Highlighted sub-item while sub-navigating
    pub fn highlighted(&self) -> Option<NodeId> {
        if !self.sub_navigation_active || self.sub_cursor < 0 {
            return None;
        }
        self.sub_items.get(self.sub_cursor as usize).copied()
    }

    fn at_last_sub_item(&self) -> bool {
        self.highlighted().is_some() && self.sub_cursor as usize + 1 == self.sub_items.len()
    }
}

/// Focus state machine
#[derive(Debug, Default)]
pub struct FocusStateMachine {
    state: NavigationState,
    found: Vec<InteractableElement>,
    discovery: ElementDiscovery,
    style: StyleCoordinator,
    deferred: DeferredQueue,
    generation: Generation,
    /// Focus events that landed on a found element
    focus_count: u64,
}

impl FocusStateMachine {
    pub fn new(style: StyleCoordinator) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Found elements in focus order
    pub fn found(&self) -> &[InteractableElement] {
        &self.found
    }

    pub fn current(&self) -> Option<&InteractableElement> {
        self.found.get(self.state.current_index)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    pub fn set_style(&mut self, style: StyleCoordinator) {
        self.style = style;
    }

    fn bump(&mut self) {
        self.generation = self.generation.next();
    }

    // ------------------------------------------------------------------
    // Scope and discovery
    // ------------------------------------------------------------------

    /// Full reset back to the initial state
    pub fn reset(&mut self, tree: &mut dyn TreeAccess) {
        self.leave_sub_navigation(tree, false);
        self.style.clear_all(&self.found, tree);
        self.state = NavigationState::default();
        self.found.clear();
        self.discovery.invalidate();
        self.bump();
    }

    /// A new non-empty scope became active
    pub fn enter_scope(&mut self, scope: &Scope, tree: &mut dyn TreeAccess) {
        self.leave_sub_navigation(tree, false);
        self.style.clear_all(&self.found, tree);
        let engaged = self.state.engaged;
        self.state = NavigationState {
            engaged,
            mode: if engaged { Mode::Navigating } else { Mode::Idle },
            ..NavigationState::default()
        };
        self.found.clear();
        self.discovery.invalidate();
        self.bump();
        if engaged {
            self.rediscover(scope, tree);
        }
    }

    /// Resolve `scope` again, keeping the current element when it survives
    pub fn rediscover(&mut self, scope: &Scope, tree: &mut dyn TreeAccess) {
        let current_id = self.current().map(|e| e.id().to_string());
        let found = self.discovery.resolve(scope, tree);
        if found.is_empty() {
            tracing::debug!("No element of scope {:?} is attached, back to idle", scope.key);
            self.reset(tree);
            return;
        }

        let last = found.len() - 1;
        let current = current_id
            .and_then(|id| found.iter().position(|e| e.id() == id))
            .unwrap_or_else(|| self.state.current_index.min(last));
        self.state.current_index = current;
        self.state.previous_index = self.state.previous_index.min(last);
        self.state.current_type = Some(found[current].kind());
        self.found = found;
        self.assign_focus_order(tree);

        if self.state.mode == Mode::SubNavigating && !self.sub_navigation_valid(&*tree) {
            self.leave_sub_navigation(tree, false);
        }
    }

    /// Focus-order index and role of every element
    fn assign_focus_order(&self, tree: &mut dyn TreeAccess) {
        for node in tree.elements() {
            tree.set_attribute(node, aria::TABINDEX, "-1");
        }
        for (index, entry) in self.found.iter().enumerate() {
            tree.set_attribute(entry.node, aria::TABINDEX, &(index + 1).to_string());
            if let Some(role) = entry.behavior().role() {
                tree.set_attribute(entry.node, aria::ROLE, role.as_str());
            }
        }
    }

    fn sub_navigation_valid(&self, tree: &dyn TreeAccess) -> bool {
        self.current().is_some_and(|e| e.kind() == ElementKind::List)
            && self.state.sub_items.iter().all(|&n| tree.is_attached(n))
    }

    // ------------------------------------------------------------------
    // Event transitions
    // ------------------------------------------------------------------

    /// Tab or Shift+Tab pressed
    pub fn on_tab(&mut self, scope: Option<&Scope>, tree: &mut dyn TreeAccess) {
        if !self.state.engaged {
            let Some(scope) = scope else {
                return;
            };
            self.state.engaged = true;
            if self.state.mode == Mode::Idle {
                self.state.mode = Mode::Navigating;
            }
            self.rediscover(scope, tree);
            if self.found.is_empty() {
                return;
            }
            tracing::trace!("Keyboard navigation engaged");
        }
        self.state.previous_index = self.state.current_index;
        self.deferred.schedule(
            self.generation,
            DeferredTask::BoundaryCheck {
                focus_count: self.focus_count,
                node: self.current().map(|e| e.node),
            },
        );
    }

    /// Focus landed on `node`
    pub fn on_focus(&mut self, node: NodeId, tree: &mut dyn TreeAccess) {
        if self.state.mode == Mode::SubNavigating {
            if self.state.sub_items.contains(&node) {
                return;
            }
            self.leave_sub_navigation(tree, true);
        }
        let Some(index) = self.found.iter().position(|e| e.node == node) else {
            return;
        };
        self.focus_count += 1;
        if self.state.engaged {
            self.style.clear(&self.found, self.state.current_index, tree);
        }
        self.state.current_index = index;
        self.state.current_type = Some(self.found[index].kind());
        if self.state.engaged {
            self.style.apply(&self.found, index, tree);
        }
        tracing::trace!("Focus on {:?} (index {})", self.found[index].id(), index);
    }

    /// Arrow key; returns whether it was consumed
    pub fn on_arrow(&mut self, direction: Direction, tree: &mut dyn TreeAccess) -> bool {
        if !self.state.engaged {
            return false;
        }
        match self.state.mode {
            Mode::Idle => false,
            Mode::Navigating => {
                if self.state.current_type != Some(ElementKind::List)
                    || !self.enter_sub_navigation(tree)
                {
                    return false;
                }
                self.move_sub_cursor(direction, tree);
                true
            }
            Mode::SubNavigating => {
                self.move_sub_cursor(direction, tree);
                true
            }
        }
    }

    /// Pointer pressed anywhere
    pub fn on_pointer_down(&mut self, tree: &mut dyn TreeAccess) {
        self.state.engaged = false;
        self.clear_markers(tree);
    }

    /// Strip every marker, sub-item highlight included
    pub fn clear_markers(&mut self, tree: &mut dyn TreeAccess) {
        if let Some(item) = self.state.highlighted() {
            self.style.mark_sub_item(item, false, tree);
        }
        self.style.clear_all(&self.found, tree);
    }

    // ------------------------------------------------------------------
    // Sub-navigation
    // ------------------------------------------------------------------

    fn enter_sub_navigation(&mut self, tree: &mut dyn TreeAccess) -> bool {
        let Some(parent) = self.found.get(self.state.current_index) else {
            return false;
        };
        let items = expand_children(parent.id(), &*tree);
        if items.is_empty() {
            return false;
        }
        for (_, item) in &items {
            tree.set_attribute(*item, aria::ROLE, AriaRole::ListItem.as_str());
        }
        self.style.show(parent, false, tree);

        self.state.sub_items = items.into_iter().map(|(_, node)| node).collect();
        self.state.sub_cursor = -1;
        self.state.sub_navigation_active = true;
        self.state.mode = Mode::SubNavigating;
        tracing::trace!("Sub-navigating {} items", self.state.sub_items.len());
        true
    }

    fn move_sub_cursor(&mut self, direction: Direction, tree: &mut dyn TreeAccess) {
        let len = self.state.sub_items.len() as isize;
        if len == 0 {
            return;
        }
        let old = self.state.sub_cursor;
        let new = match (old < 0, direction) {
            (true, Direction::Down) => 0,
            (true, Direction::Up) => len - 1,
            (false, Direction::Down) => (old + 1).rem_euclid(len),
            (false, Direction::Up) => (old - 1 + len).rem_euclid(len),
        };
        if let Some(previous) = self.state.highlighted() {
            self.style.mark_sub_item(previous, false, tree);
        }
        let item = self.state.sub_items[new as usize];
        self.style.mark_sub_item(item, true, tree);
        tree.scroll_into_view(item);
        if let (Some(parent), Some(item_id)) = (self.current(), tree.attribute(item, "id")) {
            tree.set_attribute(parent.node, aria::ARIA_ACTIVEDESCENDANT, &item_id);
        }
        self.state.sub_cursor = new;
    }

    /// Back to top-level navigation, optionally restoring the parent marker
    fn leave_sub_navigation(&mut self, tree: &mut dyn TreeAccess, restore_parent: bool) {
        if self.state.mode != Mode::SubNavigating {
            return;
        }
        if let Some(item) = self.state.highlighted() {
            self.style.mark_sub_item(item, false, tree);
        }
        if let Some(parent) = self.current() {
            tree.remove_attribute(parent.node, aria::ARIA_ACTIVEDESCENDANT);
            if restore_parent && self.state.engaged {
                self.style.show(parent, true, tree);
            }
        }
        self.state.sub_items.clear();
        self.state.sub_cursor = -1;
        self.state.sub_navigation_active = false;
        self.state.mode = Mode::Navigating;
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    /// Enter/Space; returns whether an activation happened
    pub fn activate(&mut self, scope: Option<&Scope>, tree: &mut dyn TreeAccess) -> bool {
        if !self.state.engaged {
            return false;
        }
        let Some(entry) = self.current().cloned() else {
            return false;
        };
        if self.style.is_disabled(entry.node, &*tree) {
            tracing::trace!("{:?} is disabled", entry.id());
            return false;
        }

        let activation = {
            let mut ctx = ActivationContext {
                tree: &mut *tree,
                scope,
                element: &entry,
                highlighted: self.state.highlighted(),
                at_last_sub_item: self.state.at_last_sub_item(),
                disabled_class: &self.style.classes().disabled,
            };
            entry.behavior().activate(&mut ctx)
        };
        tracing::trace!("Activated {:?}", entry.id());

        if let Some(step) = activation.step {
            self.step_top_level(step, tree);
        }
        if let Some(panel) = activation.focus_after {
            tree.focus(panel);
        }
        if !activation.deferred.is_empty() {
            self.deferred.schedule(
                self.generation,
                DeferredTask::RunActions {
                    actions: activation.deferred,
                },
            );
        }
        true
    }

    /// Move to the adjacent top-level element and focus it
    fn step_top_level(&mut self, step: Step, tree: &mut dyn TreeAccess) {
        self.leave_sub_navigation(tree, false);
        let len = self.found.len();
        if len == 0 {
            return;
        }
        let old = self.state.current_index.min(len - 1);
        let new = match step {
            Step::Previous => (old + len - 1) % len,
            Step::Next => (old + 1) % len,
        };
        self.style.clear(&self.found, old, tree);
        self.state.previous_index = old;
        self.state.current_index = new;
        self.state.current_type = Some(self.found[new].kind());
        self.style.apply(&self.found, new, tree);
        tree.focus(self.found[new].node);
    }

    // ------------------------------------------------------------------
    // Deferred work
    // ------------------------------------------------------------------

    /// Run the tasks scheduled so far; returns how many were drained
    pub fn run_deferred(&mut self, tree: &mut dyn TreeAccess) -> usize {
        let tasks = self.deferred.drain();
        let drained = tasks.len();
        for deferred in tasks {
            if !deferred.is_current(self.generation) {
                tracing::trace!(
                    "Dropping task of generation {} (now {})",
                    deferred.generation.value(),
                    self.generation.value()
                );
                continue;
            }
            match deferred.task {
                DeferredTask::BoundaryCheck { focus_count, node } => {
                    self.check_boundary(focus_count, node, tree)
                }
                DeferredTask::RunActions { actions } => run_actions(&actions, tree),
            }
        }
        drained
    }

    /// Focus left the order from its first or last element. `node` must
    /// still sit at the current index of the live found elements.
    fn check_boundary(
        &mut self,
        focus_count: u64,
        node: Option<NodeId>,
        tree: &mut dyn TreeAccess,
    ) {
        if !self.state.engaged || focus_count != self.focus_count {
            return;
        }
        let current = self.state.current_index;
        let len = self.found.len();
        if node.is_none() || self.found.get(current).map(|e| e.node) != node {
            return;
        }
        let at_edge = current == 0 || current + 1 == len;
        if at_edge && current == self.state.previous_index {
            tracing::trace!("Focus wrapped out at index {}", current);
            self.leave_sub_navigation(tree, false);
            self.style.clear(&self.found, current, tree);
        }
    }
}

fn run_actions(actions: &[ActivationAction], tree: &mut dyn TreeAccess) {
    for action in actions {
        let Some(node) = tree.lookup(&action.target_id) else {
            tracing::debug!("Action target {:?} is not attached", action.target_id);
            continue;
        };
        match NativeAction::from_method(&action.action) {
            Some(native) => {
                tracing::trace!("{}() on {:?}", native.method(), action.target_id);
                tree.invoke(node, native);
            }
            None => tracing::warn!(
                "Unknown activation action {:?} on {:?}",
                action.action,
                action.target_id
            ),
        }
    }
}
