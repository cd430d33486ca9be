use std::collections::VecDeque;

use log::trace;

/// A deferred unit of work owned by the document context. Delivering pending
/// mutation records is the only task kind in this core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Microtask {
    DeliverMutations,
}

/// Explicit task queue standing in for the host's microtask checkpoint.
///
/// Scheduling is idempotent per tick: the first record queued while idle arms
/// a single `DeliverMutations` task, and further edits in the same tick append
/// records without scheduling again until that task runs.
#[derive(Debug, Default)]
pub struct MicrotaskQueue {
    tasks: VecDeque<Microtask>,
    delivery_scheduled: bool,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a delivery task unless one is already scheduled. Returns whether a
    /// new task was enqueued.
    pub fn schedule_delivery(&mut self) -> bool {
        if self.delivery_scheduled {
            return false;
        }
        self.delivery_scheduled = true;
        self.tasks.push_back(Microtask::DeliverMutations);
        trace!("delivery microtask scheduled");
        true
    }

    /// Pop the next task. Popping a delivery task returns the queue to idle,
    /// so edits made while the task runs arm a fresh one.
    pub fn pop(&mut self) -> Option<Microtask> {
        let task = self.tasks.pop_front();
        if let Some(Microtask::DeliverMutations) = task {
            self.delivery_scheduled = false;
        }
        task
    }

    pub fn delivery_scheduled(&self) -> bool {
        self.delivery_scheduled
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
