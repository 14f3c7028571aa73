// src/error.rs

//! Error types for file tree operations

use thiserror::Error;

/// Result type for file tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`FileTree`](crate::FileTree) operations
///
/// Every operation resolves to success or exactly one of these statuses;
/// nothing is swallowed or retried internally. Multi-level inserts roll
/// themselves back before returning an error, so a failed call never
/// leaves partial state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operation requires the tree in an initialization state it is not in
    #[error("initialization error: {0}")]
    Init(&'static str),

    /// Path string failed to parse
    #[error("bad path: {0}")]
    BadPath(String),

    /// Path does not live under the existing root, or would place a file
    /// at the root
    #[error("conflicting path: {0}")]
    ConflictingPath(String),

    /// A prefix of the path exists as a file where a directory is required
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The path exists as a directory where a file is required
    #[error("not a file: {0}")]
    NotAFile(String),

    /// Resolution reached no matching node
    #[error("no such path: {0}")]
    NoSuchPath(String),

    /// Target path is already occupied by a directory or file
    #[error("already in tree: {0}")]
    AlreadyInTree(String),

    /// Node budget exhausted while creating a node
    #[error("node capacity exceeded: {0}")]
    Capacity(String),
}
