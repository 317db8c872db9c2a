//! Mutation Observer
//!
//! Structural-change notifications. The tree queues records while at least
//! one target is observed and hands them out in batches, the way a browser
//! delivers a MutationObserver callback once per microtask checkpoint.

use crate::NodeId;

/// Mutation observer
#[derive(Debug, Default)]
pub struct MutationObserver {
    options: MutationObserverInit,
    observed: Vec<NodeId>,
    records: Vec<MutationRecord>,
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub subtree: bool,
}

impl MutationObserverInit {
    /// Child-list changes anywhere below the target
    pub fn structural() -> Self {
        Self {
            child_list: true,
            attributes: false,
            subtree: true,
        }
    }
}

/// Mutation record
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
}

impl MutationRecord {
    /// Child appended to or removed from `target`
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
        }
    }

    /// Attribute changed on `target`
    pub fn attributes(target: NodeId, name: &str) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
        }
    }

    /// Whether this record describes a change of tree shape
    pub fn is_structural(&self) -> bool {
        self.mutation_type == MutationType::ChildList
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

impl MutationObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        self.options = options;
        if !self.observed.contains(&target) {
            self.observed.push(target);
        }
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.records.clear();
    }

    pub fn is_observing(&self) -> bool {
        !self.observed.is_empty()
    }

    /// Whether a mutation of `mutation_type` on `target` should be recorded.
    ///
    /// `ancestors` yields the ancestor chain of `target`, nearest first.
    pub fn interested(
        &self,
        mutation_type: MutationType,
        target: NodeId,
        mut ancestors: impl Iterator<Item = NodeId>,
    ) -> bool {
        let wanted = match mutation_type {
            MutationType::ChildList => self.options.child_list,
            MutationType::Attributes => self.options.attributes,
            MutationType::CharacterData => false,
        };
        if !wanted || self.observed.is_empty() {
            return false;
        }
        if self.observed.contains(&target) {
            return true;
        }
        self.options.subtree && ancestors.any(|a| self.observed.contains(&a))
    }

    pub fn push_record(&mut self, record: MutationRecord) {
        self.records.push(record);
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }
}
