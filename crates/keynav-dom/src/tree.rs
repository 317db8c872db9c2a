//! DOM Tree (arena-based allocation)
//!
//! In-memory document implementing [`TreeAccess`]. Besides the plain tree
//! operations it emulates the few native behaviors the navigator relies on:
//! focus changes queue a focus notification, child-list changes are recorded
//! for the structural-change subscription, and the Tab default action walks
//! positive `tabindex` values in order.

use crate::access::{NativeAction, TreeAccess, TreeNotification};
use crate::node::{ElementData, Node};
use crate::observer::{MutationObserver, MutationObserverInit, MutationRecord};
use crate::{ClassList, DomError, DomRect, NodeId};

/// Native call issued against the tree, kept for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCall {
    Click(NodeId),
    Focus(NodeId),
    ScrollIntoView(NodeId),
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    body: NodeId,
    focused: Option<NodeId>,
    observer: MutationObserver,
    pending: Vec<TreeNotification>,
    calls: Vec<NativeCall>,
    styles: Vec<String>,
}

impl DomTree {
    /// Create a document with an empty `<body>`
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: vec![Node::document()],
            body: NodeId::NONE,
            focused: None,
            observer: MutationObserver::new(),
            pending: Vec::new(),
            calls: Vec::new(),
            styles: Vec::new(),
        };
        let body = tree.create_element("body");
        tree.link(NodeId::ROOT, body);
        tree.body = body;
        tree
    }

    /// The `<body>` element
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn element_data(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    fn element_data_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::element(tag));
        id
    }

    /// Create a detached element with an `id` attribute
    pub fn create_element_with_id(&mut self, tag: &str, id: &str) -> NodeId {
        let node = self.create_element(tag);
        if let Some(elem) = self.element_data_mut(node) {
            elem.id = Some(id.to_string());
        }
        node
    }

    /// Append `child` as last child of `parent`, detaching it first if needed
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.get(parent).is_none() {
            return Err(DomError::InvalidNode(parent));
        }
        if self.get(child).is_none() || child == NodeId::ROOT {
            return Err(DomError::InvalidNode(child));
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::Cycle { parent, child });
        }
        if self.nodes[child.index()].parent.is_valid() {
            self.remove(child)?;
        }
        self.link(parent, child);
        self.record(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    /// Detach `node` (and its subtree) from its parent
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        let parent = self.get(node).ok_or(DomError::InvalidNode(node))?.parent;
        if !parent.is_valid() {
            return Ok(());
        }
        if let Some(focused) = self.focused {
            if focused == node || self.ancestors(focused).any(|a| a == node) {
                self.focused = None;
            }
        }
        self.unlink(node);
        self.record(MutationRecord::child_list(parent, Vec::new(), vec![node]));
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        {
            let c = &mut self.nodes[child.index()];
            c.parent = parent;
            c.prev_sibling = last;
            c.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    fn unlink(&mut self, node: NodeId) {
        let (parent, prev, next) = {
            let n = &self.nodes[node.index()];
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let n = &mut self.nodes[node.index()];
        n.parent = NodeId::NONE;
        n.prev_sibling = NodeId::NONE;
        n.next_sibling = NodeId::NONE;
    }

    fn record(&mut self, record: MutationRecord) {
        let target = record.target;
        let ancestors: Vec<NodeId> = self.ancestors(target).collect();
        if self
            .observer
            .interested(record.mutation_type, target, ancestors.into_iter())
        {
            self.observer.push_record(record);
        }
    }

    /// Children of `parent` in order
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        while cur.is_valid() {
            out.push(cur);
            cur = self.nodes[cur.index()].next_sibling;
        }
        out
    }

    /// Ancestor chain of `node`, nearest first
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.get(node).map_or(NodeId::NONE, |n| n.parent);
        std::iter::successors(Some(first).filter(|p| p.is_valid()), move |p| {
            Some(self.nodes[p.index()].parent).filter(|p| p.is_valid())
        })
    }

    /// Element descendants of `start` in document order
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(start).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if self.nodes[node.index()].is_element() {
                out.push(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        out
    }

    /// Attached element by id
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .find(|&n| self.element_data(n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    pub fn classes(&self, node: NodeId) -> Option<&ClassList> {
        self.element_data(node).map(|e| &e.classes)
    }

    pub fn set_rect(&mut self, node: NodeId, rect: DomRect) {
        if let Some(elem) = self.element_data_mut(node) {
            elem.rect = rect;
        }
    }

    /// Id attribute of `node`
    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.element_data(node).and_then(|e| e.id.as_deref())
    }

    /// Start recording mutations below `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        self.observer.observe(target, options);
    }


    /// Native calls issued so far
    pub fn calls(&self) -> &[NativeCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Installed global style sheets
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    fn tab_order(&self) -> Vec<NodeId> {
        let mut ordered: Vec<(i32, NodeId)> = self
            .descendants(NodeId::ROOT)
            .into_iter()
            .filter_map(|n| {
                let index = self.element_data(n)?.get_attr("tabindex")?.parse::<i32>().ok()?;
                (index > 0).then_some((index, n))
            })
            .collect();
        // Stable: equal tabindex keeps document order
        ordered.sort_by_key(|&(index, _)| index);
        ordered.into_iter().map(|(_, n)| n).collect()
    }

    fn set_focus(&mut self, node: Option<NodeId>) {
        if self.focused == node {
            return;
        }
        self.focused = node;
        if let Some(node) = node {
            self.pending.push(TreeNotification::Focus(node));
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeAccess for DomTree {
    fn lookup(&self, id: &str) -> Option<NodeId> {
        self.get_element_by_id(id)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        if node == NodeId::ROOT {
            return true;
        }
        self.get(node).is_some() && self.ancestors(node).any(|a| a == NodeId::ROOT)
    }

    fn bounding_rect(&self, node: NodeId) -> DomRect {
        self.element_data(node).map(|e| e.rect).unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element_data(node)?.get_attr(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let changed = match self.element_data_mut(node) {
            Some(elem) => elem.set_attr(name, value).as_deref() != Some(value),
            None => return,
        };
        if changed && name != "tabindex" {
            self.record(MutationRecord::attributes(node, name));
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let removed = self
            .element_data_mut(node)
            .and_then(|elem| elem.remove_attr(name))
            .is_some();
        if removed && name != "tabindex" {
            self.record(MutationRecord::attributes(node, name));
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).is_some_and(|c| c.contains(class))
    }

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        if let Some(elem) = self.element_data_mut(node) {
            elem.classes.toggle(class, Some(on));
        }
    }

    fn click(&mut self, node: NodeId) {
        if self.get(node).is_some() {
            self.calls.push(NativeCall::Click(node));
        }
    }

    fn focus(&mut self, node: NodeId) {
        if !self.is_attached(node) || self.element_data(node).is_none() {
            return;
        }
        self.calls.push(NativeCall::Focus(node));
        self.set_focus(Some(node));
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        if self.get(node).is_some() {
            self.calls.push(NativeCall::ScrollIntoView(node));
        }
    }

    fn elements(&self) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
    }

    fn install_style(&mut self, css: &str) {
        tracing::trace!("Installing style sheet: {}", css);
        self.styles.push(css.to_string());
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn invoke(&mut self, node: NodeId, action: NativeAction) {
        match action {
            NativeAction::Click => self.click(node),
            NativeAction::Focus => self.focus(node),
            NativeAction::ScrollIntoView => self.scroll_into_view(node),
            NativeAction::Blur => {
                if self.focused == Some(node) {
                    self.focused = None;
                }
            }
        }
    }

    fn advance_sequential_focus(&mut self, backwards: bool) {
        let order = self.tab_order();
        if order.is_empty() {
            return;
        }
        let position = self
            .focused
            .and_then(|f| order.iter().position(|&n| n == f));
        let next = match (position, backwards) {
            (None, false) => Some(order[0]),
            (None, true) => order.last().copied(),
            (Some(p), false) => order.get(p + 1).copied(),
            (Some(0), true) => None,
            (Some(p), true) => Some(order[p - 1]),
        };
        // Past either end focus leaves the document
        self.set_focus(next);
    }

    fn take_notifications(&mut self) -> Vec<TreeNotification> {
        let mut out = std::mem::take(&mut self.pending);
        let records = self.observer.take_records();
        if !records.is_empty() {
            out.push(TreeNotification::Mutations(records));
        }
        out
    }

    fn observe_structure(&mut self) {
        self.observe(self.body, MutationObserverInit::structural());
    }
}
