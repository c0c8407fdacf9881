//! Namespace metadata: nodes and the directory tree
//!
//! Every file and directory is a [`Node`] owned by the [`DirectoryTree`]
//! arena and addressed by a stable [`NodeId`]. A node is a tagged variant:
//! files carry a size and an allocation handle, directories carry an
//! insertion-ordered entry map. No field is ever meaningless for the active
//! case.

pub mod tree;

pub use tree::DirectoryTree;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::alloc::AllocHandle;

/// Opaque node identifier, stable for the node's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// The root directory, created at tree construction
    pub const ROOT: NodeId = NodeId(0);
}

/// File or directory, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
}

/// Kind-specific node state
#[derive(Debug, Clone)]
pub enum NodePayload {
    File {
        /// Bytes actually written, not blocks * block size
        size: usize,
        handle: AllocHandle,
    },
    Directory {
        /// Child name -> child id, insertion order preserved for listing
        entries: IndexMap<String, NodeId>,
    },
}

/// One namespace entity
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Owning back-reference; `None` only for the root
    pub parent: Option<NodeId>,
    pub payload: NodePayload,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self.payload {
            NodePayload::File { .. } => NodeKind::File,
            NodePayload::Directory { .. } => NodeKind::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.payload, NodePayload::Directory { .. })
    }
}
