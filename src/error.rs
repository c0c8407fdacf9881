use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("'{0}' already exists in this directory")]
    NameConflict(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("'{0}' is a directory")]
    IsADirectory(String),

    #[error("directory '{0}' is not empty")]
    DirectoryNotEmpty(String),

    #[error("insufficient space: {needed} blocks needed, {free} free")]
    InsufficientSpace { needed: usize, free: usize },

    #[error("block {index} out of range for a {blocks}-block file")]
    OutOfRange { index: usize, blocks: usize },

    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),

    #[error("invalid capacity: {0}")]
    InvalidCapacity(usize),
}

pub type Result<T> = std::result::Result<T, FsError>;
