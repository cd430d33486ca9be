use crate::ids::NodeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of change described by a mutation record. Child-list edits are the
/// only kind this core observes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MutationRecordType {
    ChildList,
}

/// Immutable description of one observed structural edit.
///
/// `target` is the node whose child sequence changed (the parent), never the
/// added or removed node itself. Records reference nodes by identity and do
/// not own them. Every accepted edit produces its own record: consecutive
/// edits on the same target are never folded together.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MutationRecord {
    pub kind: MutationRecordType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

impl MutationRecord {
    /// Record for nodes appended to `target`'s child sequence.
    pub fn child_list_addition(target: NodeId, added: Vec<NodeId>) -> Self {
        Self {
            kind: MutationRecordType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: Vec::new(),
        }
    }

    /// Record for nodes removed from `target`'s child sequence.
    pub fn child_list_removal(target: NodeId, removed: Vec<NodeId>) -> Self {
        Self {
            kind: MutationRecordType::ChildList,
            target,
            added_nodes: Vec::new(),
            removed_nodes: removed,
        }
    }
}
