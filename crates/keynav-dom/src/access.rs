//! Tree access capabilities
//!
//! The set of reads, writes and native calls the navigator may issue against
//! a host tree, plus the notification stream the host feeds back.

use crate::{DomRect, MutationRecord, NodeId};

/// Native method invoked by an activation action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeAction {
    Click,
    Focus,
    Blur,
    ScrollIntoView,
}

impl NativeAction {
    /// Parse a DOM method name (`"click"`, `"focus"`, ...)
    pub fn from_method(name: &str) -> Option<Self> {
        match name {
            "click" => Some(Self::Click),
            "focus" => Some(Self::Focus),
            "blur" => Some(Self::Blur),
            "scrollIntoView" | "scroll_into_view" => Some(Self::ScrollIntoView),
            _ => None,
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::ScrollIntoView => "scrollIntoView",
        }
    }
}

/// Notification delivered by the host tree
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNotification {
    /// Focus landed on a node (capture phase on the body)
    Focus(NodeId),
    /// A batch of mutation records from the structural-change subscription
    Mutations(Vec<MutationRecord>),
}

/// Capability interface over a live element tree.
///
/// Lookups only ever return attached elements. Writes against an unknown
/// node are ignored by implementations.
pub trait TreeAccess {
    /// Attached element carrying `id`
    fn lookup(&self, id: &str) -> Option<NodeId>;

    /// Whether `node` is still connected to the document
    fn is_attached(&self, node: NodeId) -> bool;

    /// Bounding client rect
    fn bounding_rect(&self, node: NodeId) -> DomRect;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// No-op when the attribute is absent
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Add (`on = true`) or remove a marker class
    fn set_class(&mut self, node: NodeId, class: &str, on: bool);

    /// Native activation
    fn click(&mut self, node: NodeId);

    /// Native focus
    fn focus(&mut self, node: NodeId);

    fn scroll_into_view(&mut self, node: NodeId);

    /// All attached elements in document order
    fn elements(&self) -> Vec<NodeId>;

    /// Install a global style sheet
    fn install_style(&mut self, css: &str);

    /// Currently focused element
    fn focused(&self) -> Option<NodeId>;

    /// Invoke a native method by kind
    fn invoke(&mut self, node: NodeId, action: NativeAction) {
        match action {
            NativeAction::Click => self.click(node),
            NativeAction::Focus => self.focus(node),
            NativeAction::ScrollIntoView => self.scroll_into_view(node),
            NativeAction::Blur => {}
        }
    }

    /// Native default action of the Tab key (sequential focus navigation)
    fn advance_sequential_focus(&mut self, _backwards: bool) {}

    /// Drain queued notifications. Hosts that dispatch events themselves
    /// keep the default.
    fn take_notifications(&mut self) -> Vec<TreeNotification> {
        Vec::new()
    }

    /// Start delivering structural-change notifications for the document
    fn observe_structure(&mut self) {}
}
