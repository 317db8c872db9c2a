//! keynav DOM - Tree access for keyboard navigation
//!
//! The navigator never talks to a concrete document. Everything it needs
//! (lookup by id, attributes, marker classes, geometry, native activation)
//! goes through the [`TreeAccess`] capability trait.
//!
//! [`DomTree`] is an arena-backed implementation of that trait used by hosts
//! without a real DOM, by the `keynav` CLI and by the test suites.

mod access;
mod classlist;
mod geometry;
mod node;
mod observer;
mod tree;

pub mod fixture;

pub use access::{NativeAction, TreeAccess, TreeNotification};
pub use classlist::ClassList;
pub use fixture::TreeFixture;
pub use geometry::DomRect;
pub use node::{Attribute, ElementData, Node, NodeData};
pub use observer::{MutationObserver, MutationObserverInit, MutationRecord, MutationType};
pub use tree::{DomTree, NativeCall};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Invalid/null node ID
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM error
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Invalid node: {0:?}")]
    InvalidNode(NodeId),

    #[error("Cannot append {child:?} to {parent:?}: would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Fixture error: {0}")]
    Fixture(#[from] fixture::FixtureError),
}
