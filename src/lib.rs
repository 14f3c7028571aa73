// src/lib.rs

//! Filetree
//!
//! In-memory hierarchy of directories and files addressed by absolute
//! slash-delimited paths, with ordered traversal and atomic multi-level
//! insertion.
//!
//! # Architecture
//!
//! - Path algebra: paths are immutable component tuples, totally ordered
//!   and compared through depth, prefix, and shared-prefix primitives
//! - Arena nodes: directories and files live in slot arenas addressed by
//!   copyable typed handles
//! - Ordered siblings: child collections stay sorted ascending by path,
//!   so traversal and serialization are deterministic without sorting
//! - Atomic inserts: creating several missing levels either fully
//!   succeeds or rolls every new node back
//! - Standalone checker: a read-only validator audits every structural
//!   invariant on demand
//!
//! # Example
//!
//! ```
//! use filetree::{FileTree, Stat};
//!
//! let mut tree = FileTree::new();
//! tree.init()?;
//! tree.insert_file("/etc/conf.d/net", b"dhcp".to_vec())?;
//! assert_eq!(tree.stat("/etc/conf.d/net")?, Stat::File { size: 4 });
//! assert_eq!(tree.remove_dir("/etc")?, 3);
//! assert!(tree.is_empty());
//! # Ok::<(), filetree::Error>(())
//! ```

pub mod checker;
mod error;
pub mod node;
pub mod path;
pub mod tree;

pub use checker::{validate, Violation};
pub use error::{Error, Result};
pub use node::{DirId, DirNode, FileId, FileNode};
pub use path::{TreePath, SEPARATOR};
pub use tree::{Entry, FileTree, Stat, TreeStats};
