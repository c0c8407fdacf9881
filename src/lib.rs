//! # simfs - Simulated Block-Device Filesystem
//!
//! `simfs` is an in-memory directory namespace backed by a fixed-size block
//! device, built to compare two classic allocation strategies head to head:
//!
//! - **Indexed allocation**: each file holds an explicit ordered list of its
//!   block numbers (inode-style direct pointers), O(1) random block access
//! - **Linked allocation**: each block points at the next block of the same
//!   file (FAT-style chain), O(k) random block access
//!
//! Both strategies expose identical external behavior, so shells and
//! benchmarks can swap them without touching any other code. The free pool is
//! shuffled before every allocation to simulate fragmentation; tests inject a
//! deterministic picker instead.
//!
//! ## Quick Start
//!
//! ```rust
//! use simfs::{AllocPolicy, SimFs, Result};
//!
//! # fn main() -> Result<()> {
//! let mut fs = SimFs::builder()
//!     .block_size(64)
//!     .capacity(1024)
//!     .policy(AllocPolicy::Indexed)
//!     .build()?;
//!
//! fs.create_dir("docs")?;
//! fs.cd("docs")?;
//! fs.write("report.txt", b"quarterly numbers")?;
//!
//! assert_eq!(fs.read("report.txt")?, b"quarterly numbers");
//! assert_eq!(fs.current_path(), "/docs");
//! # Ok(())
//! # }
//! ```
//!
//! ## Operation surface
//!
//! The engine exposes plain operations returning structured outcomes:
//! `create_file`, `create_dir`, `write`, `read`, `delete`, `move_entry`,
//! `list`, `cd`, `stat`, `access_block`, and `usage`. Formatting and command
//! parsing are the caller's responsibility (see `src/bin/shell.rs`).

pub mod alloc;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod store;

pub use alloc::{AllocHandle, AllocPolicy};
pub use catalog::{DirectoryTree, NodeId, NodeKind};
pub use config::FsConfig;
pub use engine::{DirEntry, FileUsage, NodeStat, SimFs, SimFsBuilder, UsageReport, WriteReport};
pub use error::{FsError, Result};
pub use store::{BlockStore, FirstFitPicker, ShufflePicker, SlotPicker};
