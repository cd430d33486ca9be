use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::observer::{MutationCallback, ObserverHandle, ObserverRegistry};
use crate::record::MutationRecord;
use crate::scheduler::{Microtask, MicrotaskQueue};

const DOCUMENT_NAME: &str = "#document";

#[derive(Clone, Debug)]
struct NodeState {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeState {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Synthetic document: the node arena, the observer registration table, and
/// the deferred-delivery queue, all driven by a single thread of control.
///
/// Structural operations complete synchronously and atomically; observer
/// callbacks run only at the explicit microtask checkpoint
/// ([`Document::run_microtasks`]).
pub struct Document {
    nodes: HashMap<NodeId, NodeState>,
    next_node: u64,
    observers: ObserverRegistry,
    microtasks: MicrotaskQueue,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(NodeId::DOCUMENT, NodeState::new(DOCUMENT_NAME));
        Self {
            nodes,
            next_node: NodeId::DOCUMENT.0 + 1,
            observers: ObserverRegistry::default(),
            microtasks: MicrotaskQueue::new(),
        }
    }

    /// Allocate a detached element node.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, NodeState::new(tag));
        id
    }

    /// Append `child` to the end of `parent`'s child sequence.
    ///
    /// An attached child is detached from its old parent first, which queues a
    /// child-list removal record against that parent before the addition
    /// record against `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent`'s child sequence before `reference`, or at
    /// the end when `reference` is `None`.
    ///
    /// Validation happens before any mutation: unknown ids fail `NotFound`, a
    /// `reference` that is not a current child of `parent` fails `NotFound`,
    /// and inserting a node under itself or one of its descendants fails
    /// `HierarchyRequest`. A `reference` equal to `child` resolves to the
    /// child's next sibling.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId> {
        self.ensure_exists(parent)?;
        self.ensure_exists(child)?;
        if self.introduces_cycle(child, parent) {
            return Err(Error::HierarchyRequest(format!(
                "cannot insert {child:?} under itself or its descendant {parent:?}"
            )));
        }
        let mut reference = reference;
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(Error::NotFound(format!(
                    "reference {r:?} is not a child of {parent:?}"
                )));
            }
            if r == child {
                reference = self.next_sibling(r);
            }
        }

        if let Some(old_parent) = self.parent(child) {
            self.detach(old_parent, child);
            self.queue_record(MutationRecord::child_list_removal(old_parent, vec![child]));
        }
        let index = match reference {
            Some(r) => self.child_index(parent, r).ok_or_else(|| {
                Error::NotFound(format!("reference {r:?} is not a child of {parent:?}"))
            })?,
            None => self.child_count(parent),
        };
        self.attach(parent, child, index);
        self.queue_record(MutationRecord::child_list_addition(parent, vec![child]));
        Ok(child)
    }

    /// Remove `child` from `parent`'s child sequence.
    ///
    /// Fails atomically with `NotFound` when `child` is not currently a child
    /// of `parent`: no record is produced and the tree is left unmodified.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.ensure_exists(parent)?;
        if self.parent(child) != Some(parent) {
            return Err(Error::NotFound(format!(
                "{child:?} is not a child of {parent:?}"
            )));
        }
        self.detach(parent, child);
        self.queue_record(MutationRecord::child_list_removal(parent, vec![child]));
        Ok(child)
    }

    /// Children of a node in document order.
    pub fn children(&self, node: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(&node).map(|state| state.children.as_slice())
    }

    /// Current parent of a node.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|state| state.parent)
    }

    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|state| state.name.as_str())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Register `callback` against `target`. Total: registration never fails,
    /// even for a target the document does not know.
    pub fn observe(
        &mut self,
        target: NodeId,
        callback: impl MutationCallback + 'static,
    ) -> ObserverHandle {
        self.observers.observe(target, Box::new(callback))
    }

    /// Re-target an observer, replacing its prior registration. Records
    /// already pending are unaffected.
    pub fn reobserve(&mut self, handle: ObserverHandle, target: NodeId) {
        self.observers.reobserve(handle, target);
    }

    /// Drop an observer's registration and discard its pending records.
    /// Idempotent; effective immediately for future edits.
    pub fn disconnect(&mut self, handle: ObserverHandle) {
        self.observers.disconnect(handle);
    }

    /// Synchronously drain and return an observer's pending records without
    /// invoking its callback.
    pub fn take_records(&mut self, handle: ObserverHandle) -> Vec<MutationRecord> {
        self.observers.take_records(handle)
    }

    /// Whether a delivery flush is armed for the next checkpoint.
    pub fn has_pending_delivery(&self) -> bool {
        self.microtasks.delivery_scheduled()
    }

    /// Run the microtask checkpoint: pop deferred tasks until none remain.
    ///
    /// Edits made by observer callbacks arm a fresh delivery task, which runs
    /// within the same checkpoint but as a separate cycle. A callback is never
    /// re-entered with records produced while it runs.
    pub fn run_microtasks(&mut self) {
        while let Some(task) = self.microtasks.pop() {
            match task {
                Microtask::DeliverMutations => self.deliver_mutations(),
            }
        }
    }

    /// Validate parent/child consistency: no duplicate child entries, child
    /// parent pointers match, no cycles. Intended for tests and debugging.
    pub fn validate_invariants(&self) -> Result<()> {
        for (pid, state) in &self.nodes {
            let mut seen = HashSet::new();
            for child in &state.children {
                if !seen.insert(child) {
                    return Err(Error::InconsistentState("duplicate child entry".into()));
                }
                match self.nodes.get(child) {
                    Some(child_state) if child_state.parent == Some(*pid) => {}
                    Some(_) => {
                        return Err(Error::InconsistentState("child parent mismatch".into()))
                    }
                    None => {
                        return Err(Error::InconsistentState("child not present in arena".into()))
                    }
                }
            }
        }
        for node in self.nodes.keys() {
            if self.has_cycle_from(*node) {
                return Err(Error::InconsistentState("cycle detected".into()));
            }
        }
        Ok(())
    }

    fn deliver_mutations(&mut self) {
        let due = self.observers.due();
        debug!("delivery cycle: {} observer(s) due", due.len());
        for id in due {
            let Some((mut callback, records)) = self.observers.begin_delivery(id) else {
                continue;
            };
            trace!("delivering {} record(s) to {:?}", records.len(), id);
            callback.deliver(self, records);
            self.observers.finish_delivery(id, callback);
        }
        // Records queued for an observer whose callback was mid-flight (a
        // nested checkpoint) must not strand.
        if self.observers.any_pending() {
            self.microtasks.schedule_delivery();
        }
    }

    fn queue_record(&mut self, record: MutationRecord) {
        trace!("queueing {:?}", record);
        if self.observers.enqueue(&record) {
            self.microtasks.schedule_delivery();
        }
    }

    fn ensure_exists(&self, node: NodeId) -> Result<()> {
        if self.nodes.contains_key(&node) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("unknown node {node:?}")))
        }
    }

    /// Walk up from `parent`; attaching `child` there would create a cycle if
    /// the walk reaches `child` (including `child == parent`).
    fn introduces_cycle(&self, child: NodeId, parent: NodeId) -> bool {
        let mut current = Some(parent);
        while let Some(n) = current {
            if n == child {
                return true;
            }
            current = self.nodes.get(&n).and_then(|state| state.parent);
        }
        false
    }

    fn has_cycle_from(&self, start: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(start);
        while let Some(n) = current {
            if !visited.insert(n) {
                return true;
            }
            current = self.nodes.get(&n).and_then(|state| state.parent);
        }
        false
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let children = &self.nodes.get(&parent)?.children;
        let idx = children.iter().position(|c| *c == node)?;
        children.get(idx + 1).copied()
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes
            .get(&parent)
            .and_then(|state| state.children.iter().position(|c| *c == child))
    }

    fn child_count(&self, parent: NodeId) -> usize {
        self.nodes.get(&parent).map_or(0, |state| state.children.len())
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(state) = self.nodes.get_mut(&parent) {
            state.children.retain(|c| *c != child);
        }
        if let Some(state) = self.nodes.get_mut(&child) {
            state.parent = None;
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) {
        if let Some(state) = self.nodes.get_mut(&parent) {
            let idx = index.min(state.children.len());
            state.children.insert(idx, child);
        }
        if let Some(state) = self.nodes.get_mut(&child) {
            state.parent = Some(parent);
        }
    }
}
