//! The filesystem engine: directory tree + block store + allocation strategy
//!
//! [`SimFs`] composes the namespace, the simulated device, and the configured
//! allocation strategy into the storage operation surface consumed by shells
//! and benchmarks. The only persistent cursor is the current directory,
//! mutated exclusively by successful `cd` calls.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alloc::{AllocationStrategy, AllocPolicy};
use crate::catalog::{DirectoryTree, NodeId, NodeKind, NodePayload};
use crate::config::FsConfig;
use crate::error::{FsError, Result};
use crate::store::{BlockStore, ShufflePicker, SlotPicker};

/// Outcome of a successful write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteReport {
    pub bytes: usize,
    /// Slots now owned by the file, in file order
    pub blocks: Vec<u32>,
}

/// One directory listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
}

/// Metadata snapshot of a single node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStat {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub size: usize,
    /// File order slot list; chain walk for the linked strategy
    pub blocks: Vec<u32>,
    /// Child names for directories
    pub entries: Vec<String>,
}

/// Per-file slice of the usage report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUsage {
    pub path: String,
    pub size: usize,
    pub blocks: Vec<u32>,
}

/// Device-wide diagnostics, derived entirely from the store and node table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    pub capacity: usize,
    pub used: usize,
    pub free: usize,
    pub file_count: usize,
    pub dir_count: usize,
    pub files: Vec<FileUsage>,
}

/// Simulated single-host storage engine
pub struct SimFs {
    config: FsConfig,
    tree: DirectoryTree,
    store: BlockStore,
    strategy: Box<dyn AllocationStrategy>,
    cwd: NodeId,
}

impl SimFs {
    /// Create an engine with the default shuffling slot picker
    pub fn new(config: FsConfig) -> Result<Self> {
        Self::with_picker(config, Box::new(ShufflePicker::new()))
    }

    /// Create an engine with an injected slot-selection policy
    pub fn with_picker(config: FsConfig, picker: Box<dyn SlotPicker>) -> Result<Self> {
        config.validate()?;
        info!(
            "Creating engine: {} blocks x {} bytes, {:?} allocation",
            config.capacity, config.block_size, config.policy
        );
        let tree = DirectoryTree::new();
        let cwd = tree.root();
        Ok(SimFs {
            store: BlockStore::new(config.capacity, config.block_size, picker),
            strategy: config.policy.strategy(),
            tree,
            cwd,
            config,
        })
    }

    pub fn builder() -> SimFsBuilder {
        SimFsBuilder::new()
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Absolute path of the current directory
    pub fn current_path(&self) -> String {
        self.tree.current_path(self.cwd)
    }

    fn lookup(&self, name: &str) -> Result<NodeId> {
        match self.tree.node(self.cwd).payload {
            NodePayload::Directory { ref entries } => entries
                .get(name)
                .copied()
                .ok_or_else(|| FsError::NotFound(name.to_string())),
            NodePayload::File { .. } => Err(FsError::NotADirectory(name.to_string())),
        }
    }

    /// Create an empty file in the current directory
    pub fn create_file(&mut self, name: &str) -> Result<NodeId> {
        debug!("Creating file '{}' in {}", name, self.current_path());
        self.tree.create_node(
            self.cwd,
            name,
            NodePayload::File {
                size: 0,
                handle: self.strategy.empty_handle(),
            },
        )
    }

    /// Create a directory in the current directory
    pub fn create_dir(&mut self, name: &str) -> Result<NodeId> {
        debug!("Creating directory '{}' in {}", name, self.current_path());
        self.tree.create_node(
            self.cwd,
            name,
            NodePayload::Directory {
                entries: indexmap::IndexMap::new(),
            },
        )
    }

    /// Write `payload` to `name`, creating the file if it does not exist
    ///
    /// The old allocation is fully released before the new one is computed.
    /// On `InsufficientSpace` the file is left empty; a stale allocation is
    /// never kept.
    pub fn write(&mut self, name: &str, payload: &[u8]) -> Result<WriteReport> {
        let id = match self.lookup(name) {
            Ok(id) if self.tree.node(id).is_dir() => {
                return Err(FsError::IsADirectory(name.to_string()));
            }
            Ok(id) => id,
            Err(FsError::NotFound(_)) => self.create_file(name)?,
            Err(e) => return Err(e),
        };

        let empty = self.strategy.empty_handle();
        let old = match self.tree.file_state_mut(id) {
            Some((size, handle)) => {
                *size = 0;
                std::mem::replace(handle, empty)
            }
            None => return Err(FsError::IsADirectory(name.to_string())),
        };
        self.strategy.release(&mut self.store, &old);

        let new_handle = self.strategy.store(&mut self.store, payload)?;
        let blocks = self.strategy.slots(&self.store, &new_handle);
        if let Some((size, handle)) = self.tree.file_state_mut(id) {
            *size = payload.len();
            *handle = new_handle;
        }
        debug!("Wrote {} bytes to '{}' in blocks {:?}", payload.len(), name, blocks);
        Ok(WriteReport {
            bytes: payload.len(),
            blocks,
        })
    }

    /// Read the full content of `name`
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let id = self.lookup(name)?;
        match &self.tree.node(id).payload {
            NodePayload::File { size, handle } => {
                debug!("Reading '{}' ({} bytes)", name, size);
                Ok(self.strategy.load(&self.store, handle, *size))
            }
            NodePayload::Directory { .. } => Err(FsError::IsADirectory(name.to_string())),
        }
    }

    /// Delete `name` from the current directory, returning the freed slot count
    pub fn delete(&mut self, name: &str) -> Result<usize> {
        let handle = self.tree.delete_node(self.cwd, name)?;
        let freed = match handle {
            Some(h) => self.strategy.release(&mut self.store, &h),
            None => 0,
        };
        debug!("Deleted '{}', freed {} blocks", name, freed);
        Ok(freed)
    }

    /// Move file `name` into `dest`
    ///
    /// `dest` may be `/`, a directory name visible in the current directory
    /// or its parent, or any path containing `/` which goes through full
    /// resolution. Content and allocation handle travel unchanged.
    pub fn move_entry(&mut self, name: &str, dest: &str) -> Result<()> {
        let id = self.lookup(name)?;
        let dest_id = self.resolve_move_dest(dest)?;
        self.tree.move_file(id, dest_id)?;
        debug!("Moved '{}' to {}", name, self.tree.current_path(dest_id));
        Ok(())
    }

    fn resolve_move_dest(&self, dest: &str) -> Result<NodeId> {
        if dest == "/" {
            return Ok(self.tree.root());
        }
        if dest.contains('/') || dest == "." || dest == ".." {
            return self.tree.resolve_dir(self.cwd, dest);
        }
        // bare name: visible in the current directory or its parent
        let found = self.tree.resolve(self.cwd, dest).or_else(|_| {
            let parent = format!("../{dest}");
            self.tree.resolve(self.cwd, &parent)
        });
        match found {
            Ok(id) if self.tree.node(id).is_dir() => Ok(id),
            Ok(_) => Err(FsError::NotADirectory(dest.to_string())),
            Err(_) => Err(FsError::NotFound(dest.to_string())),
        }
    }

    /// Children of the current directory, insertion order
    pub fn list(&self) -> Vec<DirEntry> {
        self.tree
            .list_children(self.cwd)
            .into_iter()
            .map(|(name, kind)| DirEntry { name, kind })
            .collect()
    }

    /// Change the current directory; returns the new absolute path
    pub fn cd(&mut self, path: &str) -> Result<String> {
        let dir = self.tree.resolve_dir(self.cwd, path)?;
        self.cwd = dir;
        let rendered = self.current_path();
        debug!("Changed directory to {}", rendered);
        Ok(rendered)
    }

    /// Metadata snapshot for `name` in the current directory
    pub fn stat(&self, name: &str) -> Result<NodeStat> {
        let id = self.lookup(name)?;
        let node = self.tree.node(id);
        Ok(match &node.payload {
            NodePayload::File { size, handle } => NodeStat {
                id,
                name: node.name.clone(),
                kind: NodeKind::File,
                size: *size,
                blocks: self.strategy.slots(&self.store, handle),
                entries: Vec::new(),
            },
            NodePayload::Directory { entries } => NodeStat {
                id,
                name: node.name.clone(),
                kind: NodeKind::Directory,
                size: 0,
                blocks: Vec::new(),
                entries: entries.keys().cloned().collect(),
            },
        })
    }

    /// Slot index of the `k`-th block of file `name`
    ///
    /// O(1) for the indexed strategy, O(k) for the linked strategy; this is
    /// the comparison point the benchmarks measure.
    pub fn access_block(&self, name: &str, k: usize) -> Result<u32> {
        let id = self.lookup(name)?;
        match &self.tree.node(id).payload {
            NodePayload::File { handle, .. } => self.strategy.access_block(&self.store, handle, k),
            NodePayload::Directory { .. } => Err(FsError::IsADirectory(name.to_string())),
        }
    }

    /// Device-wide diagnostics
    pub fn usage(&self) -> UsageReport {
        let capacity = self.store.capacity();
        let free = self.store.free_count();
        let mut files = Vec::new();
        let mut file_count = 0;
        let mut dir_count = 0;
        for node in self.tree.nodes() {
            match &node.payload {
                NodePayload::File { size, handle } => {
                    file_count += 1;
                    files.push(FileUsage {
                        path: self.tree.current_path(node.id),
                        size: *size,
                        blocks: self.strategy.slots(&self.store, handle),
                    });
                }
                NodePayload::Directory { .. } => dir_count += 1,
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        UsageReport {
            capacity,
            used: capacity - free,
            free,
            file_count,
            dir_count,
            files,
        }
    }
}

/// Fluent construction of a [`SimFs`]
pub struct SimFsBuilder {
    config: FsConfig,
    picker: Option<Box<dyn SlotPicker>>,
}

impl SimFsBuilder {
    pub fn new() -> Self {
        SimFsBuilder {
            config: FsConfig::default(),
            picker: None,
        }
    }

    pub fn block_size(mut self, bytes: usize) -> Self {
        self.config.block_size = bytes;
        self
    }

    pub fn capacity(mut self, blocks: usize) -> Self {
        self.config.capacity = blocks;
        self
    }

    pub fn policy(mut self, policy: AllocPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Override the free-slot selection policy (tests use a first-fit picker)
    pub fn picker(mut self, picker: Box<dyn SlotPicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn build(self) -> Result<SimFs> {
        match self.picker {
            Some(picker) => SimFs::with_picker(self.config, picker),
            None => SimFs::new(self.config),
        }
    }
}

impl Default for SimFsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FirstFitPicker;

    fn engine(policy: AllocPolicy) -> SimFs {
        SimFs::builder()
            .block_size(8)
            .capacity(10)
            .policy(policy)
            .picker(Box::new(FirstFitPicker))
            .build()
            .unwrap()
    }

    #[test]
    fn test_write_creates_missing_file() {
        let mut fs = engine(AllocPolicy::Indexed);
        let report = fs.write("notes.txt", b"hello").unwrap();
        assert_eq!(report.bytes, 5);
        assert_eq!(report.blocks.len(), 1);
        assert_eq!(fs.read("notes.txt").unwrap(), b"hello");
    }

    #[test]
    fn test_write_to_directory_rejected() {
        let mut fs = engine(AllocPolicy::Indexed);
        fs.create_dir("d").unwrap();
        assert_eq!(
            fs.write("d", b"x").unwrap_err(),
            FsError::IsADirectory("d".to_string())
        );
    }

    #[test]
    fn test_failed_write_resets_file_to_empty() {
        let mut fs = engine(AllocPolicy::Linked);
        fs.write("f", &[1u8; 40]).unwrap();

        let err = fs.write("f", &[2u8; 100]).unwrap_err();
        assert!(matches!(err, FsError::InsufficientSpace { .. }));

        // old allocation released, nothing stale kept
        assert_eq!(fs.read("f").unwrap(), Vec::<u8>::new());
        assert_eq!(fs.usage().free, 10);
    }

    #[test]
    fn test_overwrite_releases_old_blocks() {
        let mut fs = engine(AllocPolicy::Indexed);
        fs.write("f", &[1u8; 64]).unwrap(); // 8 blocks
        fs.write("f", &[2u8; 8]).unwrap(); // 1 block
        let usage = fs.usage();
        assert_eq!(usage.used, 1);
        assert_eq!(usage.free, 9);
    }

    #[test]
    fn test_move_dest_bare_name_in_parent_scope() {
        let mut fs = engine(AllocPolicy::Indexed);
        fs.create_dir("a").unwrap();
        fs.create_dir("b").unwrap();
        fs.cd("a").unwrap();
        fs.write("f", b"payload").unwrap();

        // "b" is a sibling of the cwd, visible through the parent
        fs.move_entry("f", "b").unwrap();
        fs.cd("../b").unwrap();
        assert_eq!(fs.read("f").unwrap(), b"payload");
    }

    #[test]
    fn test_move_dest_full_path_resolution() {
        let mut fs = engine(AllocPolicy::Linked);
        fs.create_dir("a").unwrap();
        fs.cd("a").unwrap();
        fs.create_dir("deep").unwrap();
        fs.write("f", b"x").unwrap();

        fs.move_entry("f", "/a/deep").unwrap();
        fs.cd("deep").unwrap();
        assert_eq!(fs.read("f").unwrap(), b"x");
    }

    #[test]
    fn test_move_invalid_dest() {
        let mut fs = engine(AllocPolicy::Indexed);
        fs.write("f", b"x").unwrap();
        assert_eq!(
            fs.move_entry("f", "ghost").unwrap_err(),
            FsError::NotFound("ghost".to_string())
        );
        fs.write("plain", b"y").unwrap();
        assert_eq!(
            fs.move_entry("f", "plain").unwrap_err(),
            FsError::NotADirectory("plain".to_string())
        );
    }

    #[test]
    fn test_cd_and_current_path() {
        let mut fs = engine(AllocPolicy::Indexed);
        fs.create_dir("a").unwrap();
        assert_eq!(fs.cd("a").unwrap(), "/a");
        assert_eq!(fs.cd("..").unwrap(), "/");
        assert_eq!(
            fs.cd("ghost").unwrap_err(),
            FsError::NotFound("ghost".to_string())
        );
        // failed cd leaves the cursor alone
        assert_eq!(fs.current_path(), "/");
    }

    #[test]
    fn test_stat_reports_blocks_and_entries() {
        let mut fs = engine(AllocPolicy::Indexed);
        fs.write("f", &[3u8; 20]).unwrap();
        fs.create_dir("d").unwrap();

        let f = fs.stat("f").unwrap();
        assert_eq!(f.kind, NodeKind::File);
        assert_eq!(f.size, 20);
        assert_eq!(f.blocks.len(), 3);

        let d = fs.stat("d").unwrap();
        assert_eq!(d.kind, NodeKind::Directory);
        assert!(d.blocks.is_empty());
    }

    #[test]
    fn test_usage_counts_nodes_and_blocks() {
        let mut fs = engine(AllocPolicy::Linked);
        fs.create_dir("d").unwrap();
        fs.write("f1", &[1u8; 16]).unwrap();
        fs.write("f2", &[2u8; 8]).unwrap();

        let usage = fs.usage();
        assert_eq!(usage.capacity, 10);
        assert_eq!(usage.used, 3);
        assert_eq!(usage.free, 7);
        assert_eq!(usage.file_count, 2);
        assert_eq!(usage.dir_count, 2); // root + d
        assert_eq!(usage.files.len(), 2);
        assert_eq!(usage.files[0].path, "/f1");
    }

    #[test]
    fn test_report_serialization() {
        let mut fs = engine(AllocPolicy::Indexed);
        fs.write("f", b"data").unwrap();
        let json = serde_json::to_string(&fs.usage()).unwrap();
        let back: UsageReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.capacity, 10);
        assert_eq!(back.files.len(), 1);
    }
}
