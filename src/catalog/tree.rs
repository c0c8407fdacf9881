//! Directory tree: node arena, path resolution, and namespace invariants

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::alloc::AllocHandle;
use crate::error::{FsError, Result};

use super::{Node, NodeId, NodeKind, NodePayload};

/// Owns every namespace node and maintains parent/child links
///
/// Invariants upheld here:
/// - every id in a directory's entries exists and has that directory as its
///   parent;
/// - sibling names are unique;
/// - the root has no parent and is never deletable;
/// - a directory is deleted only when empty.
pub struct DirectoryTree {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl DirectoryTree {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeId::ROOT,
            Node {
                id: NodeId::ROOT,
                name: "/".to_string(),
                parent: None,
                payload: NodePayload::Directory {
                    entries: IndexMap::new(),
                },
            },
        );
        DirectoryTree { nodes, next_id: 1 }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Panics if `id` is dangling; ids handed out by this tree never dangle
    /// while the node is alive.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[&id]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    fn dir_entries(&self, dir: NodeId) -> Option<&IndexMap<String, NodeId>> {
        match &self.nodes.get(&dir)?.payload {
            NodePayload::Directory { entries } => Some(entries),
            NodePayload::File { .. } => None,
        }
    }

    fn dir_entries_mut(&mut self, dir: NodeId) -> Option<&mut IndexMap<String, NodeId>> {
        match &mut self.nodes.get_mut(&dir)?.payload {
            NodePayload::Directory { entries } => Some(entries),
            NodePayload::File { .. } => None,
        }
    }

    /// Create a node under `parent`, failing on a sibling name collision
    pub fn create_node(
        &mut self,
        parent: NodeId,
        name: &str,
        payload: NodePayload,
    ) -> Result<NodeId> {
        let Some(entries) = self.dir_entries(parent) else {
            return Err(FsError::NotADirectory(self.node(parent).name.clone()));
        };
        if entries.contains_key(name) {
            return Err(FsError::NameConflict(name.to_string()));
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                name: name.to_string(),
                parent: Some(parent),
                payload,
            },
        );
        if let Some(entries) = self.dir_entries_mut(parent) {
            entries.insert(name.to_string(), id);
        }
        Ok(id)
    }

    /// Resolve `path` against `base`
    ///
    /// Absolute paths start at the root; `.` and `..` are supported and `..`
    /// at the root is a no-op. A file in a mid-path position fails with
    /// `NotADirectory`.
    pub fn resolve(&self, base: NodeId, path: &str) -> Result<NodeId> {
        let (mut current, rest) = match path.strip_prefix('/') {
            Some(stripped) => (NodeId::ROOT, stripped),
            None => (base, path),
        };

        for segment in rest.split('/').filter(|s| !s.is_empty()) {
            match segment {
                "." => {}
                ".." => {
                    if let Some(parent) = self.node(current).parent {
                        current = parent;
                    }
                }
                name => {
                    let node = self.node(current);
                    let NodePayload::Directory { entries } = &node.payload else {
                        return Err(FsError::NotADirectory(node.name.clone()));
                    };
                    match entries.get(name) {
                        Some(&child) => current = child,
                        None => return Err(FsError::NotFound(name.to_string())),
                    }
                }
            }
        }
        Ok(current)
    }

    /// Resolve a path that must denote a directory
    pub fn resolve_dir(&self, base: NodeId, path: &str) -> Result<NodeId> {
        let id = self.resolve(base, path)?;
        let node = self.node(id);
        if node.is_dir() {
            Ok(id)
        } else {
            Err(FsError::NotADirectory(node.name.clone()))
        }
    }

    /// Direct children of `dir` in insertion order
    pub fn list_children(&self, dir: NodeId) -> Vec<(String, NodeKind)> {
        let Some(entries) = self.dir_entries(dir) else {
            return Vec::new();
        };
        entries
            .iter()
            .map(|(name, &id)| (name.clone(), self.node(id).kind()))
            .collect()
    }

    /// Re-parent a file into `dest`
    ///
    /// O(1) thanks to the parent back-reference; no table scan. The
    /// allocation handle travels with the node untouched.
    pub fn move_file(&mut self, file_id: NodeId, dest: NodeId) -> Result<()> {
        let (name, old_parent) = {
            let node = self.node(file_id);
            if node.is_dir() {
                return Err(FsError::IsADirectory(node.name.clone()));
            }
            (node.name.clone(), node.parent)
        };
        match self.dir_entries(dest) {
            None => return Err(FsError::NotADirectory(self.node(dest).name.clone())),
            Some(entries) if entries.contains_key(&name) => {
                return Err(FsError::NameConflict(name));
            }
            Some(_) => {}
        }

        if let Some(parent) = old_parent {
            if let Some(entries) = self.dir_entries_mut(parent) {
                entries.shift_remove(&name);
            }
        }
        if let Some(entries) = self.dir_entries_mut(dest) {
            entries.insert(name, file_id);
        }
        if let Some(node) = self.nodes.get_mut(&file_id) {
            node.parent = Some(dest);
        }
        Ok(())
    }

    /// Remove `name` from `dir`
    ///
    /// Non-empty directories are rejected without any mutation. For files the
    /// allocation handle is handed back so the caller can release its slots.
    pub fn delete_node(&mut self, dir: NodeId, name: &str) -> Result<Option<AllocHandle>> {
        let id = match self.dir_entries(dir).and_then(|e| e.get(name)) {
            Some(&id) => id,
            None => return Err(FsError::NotFound(name.to_string())),
        };
        if let NodePayload::Directory { entries } = &self.node(id).payload {
            if !entries.is_empty() {
                return Err(FsError::DirectoryNotEmpty(name.to_string()));
            }
        }

        if let Some(entries) = self.dir_entries_mut(dir) {
            entries.shift_remove(name);
        }
        match self.nodes.remove(&id).map(|n| n.payload) {
            Some(NodePayload::File { handle, .. }) => Ok(Some(handle)),
            _ => Ok(None),
        }
    }

    /// Absolute path of `id`, built by walking parent back-references
    pub fn current_path(&self, id: NodeId) -> String {
        if id == NodeId::ROOT {
            return "/".to_string();
        }
        let mut segments = Vec::new();
        let mut current = id;
        while current != NodeId::ROOT {
            let node = self.node(current);
            segments.push(node.name.clone());
            match node.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Mutable access to a file's size and handle; `None` for directories
    pub(crate) fn file_state_mut(
        &mut self,
        id: NodeId,
    ) -> Option<(&mut usize, &mut AllocHandle)> {
        match &mut self.nodes.get_mut(&id)?.payload {
            NodePayload::File { size, handle } => Some((size, handle)),
            NodePayload::Directory { .. } => None,
        }
    }
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}
