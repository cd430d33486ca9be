#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unique identifier for a node in the document tree.
///
/// Nodes live in an arena owned by the document; ids are plain copyable keys,
/// so holding one never keeps a node alive.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub u64);

impl NodeId {
    /// Well-known id of the document root node.
    pub const DOCUMENT: NodeId = NodeId(0);
}

/// Unique identifier for a registered observer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObserverId(pub u64);
