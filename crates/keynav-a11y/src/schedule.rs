//! Deferred tasks
//!
//! Work that must run after the tree finished its own focus handling. Each
//! task is stamped with the state machine generation at scheduling time; a
//! task whose generation is no longer current is dropped unexecuted.

use std::collections::VecDeque;

use keynav_dom::NodeId;

use crate::config::ActivationAction;

/// Stamp of the navigation state a task was scheduled against. Bumped on
/// route change and reset, wraps at `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Generation(u32);

impl Generation {
    pub fn value(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

/// Deferred work
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredTask {
    /// After a Tab press: clear the marker of a boundary element when focus
    /// left the order. `focus_count` is the number of handled focus events
    /// when the key was pressed, `node` the element current at that moment.
    BoundaryCheck {
        focus_count: u64,
        node: Option<NodeId>,
    },
    /// Activation actions, run once the activation's focus change settled
    RunActions { actions: Vec<ActivationAction> },
}

/// Task stamped with its scheduling generation
#[derive(Debug, Clone, PartialEq)]
pub struct Deferred {
    pub generation: Generation,
    pub task: DeferredTask,
}

impl Deferred {
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }
}

/// FIFO of deferred tasks
#[derive(Debug, Default)]
pub struct DeferredQueue {
    tasks: VecDeque<Deferred>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, generation: Generation, task: DeferredTask) {
        self.tasks.push_back(Deferred { generation, task });
    }

    /// Take every task scheduled so far; tasks scheduled while these run
    /// wait for the next drain
    pub fn drain(&mut self) -> Vec<Deferred> {
        self.tasks.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_wraps() {
        let last = Generation(u32::MAX);
        assert_eq!(last.next(), Generation::default());
        assert_ne!(last.next(), last);
    }

    #[test]
    fn test_queue_is_fifo_and_stamped() {
        let mut queue = DeferredQueue::new();
        let stale = Generation::default();
        let current = stale.next();
        let check = DeferredTask::BoundaryCheck {
            focus_count: 1,
            node: None,
        };
        queue.schedule(stale, check);
        let actions = Vec::new();
        queue.schedule(current, DeferredTask::RunActions { actions });

        let tasks = queue.drain();
        assert!(queue.is_empty());
        assert_eq!(tasks.len(), 2);
        assert!(!tasks[0].is_current(current));
        assert!(tasks[1].is_current(current));
        assert_eq!(current.value(), 1);
    }
}
