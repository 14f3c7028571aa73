// src/node.rs

//! Directory and file nodes and their typed arena handles
//!
//! Nodes live in arenas owned by [`FileTree`](crate::FileTree) and refer
//! to each other through [`DirId`] and [`FileId`] handles rather than
//! owned pointers. Handles are plain indices: cheap to copy, cheap to
//! store, and only meaningful against the tree that issued them.

use crate::path::TreePath;

/// Index of a directory node in a tree's directory arena
///
/// A handle is valid until the node it names is removed. Accessing a
/// stale handle through [`FileTree::dir_node`](crate::FileTree::dir_node)
/// panics; that indicates a bug in the calling code, not a recoverable
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirId(pub(crate) usize);

impl DirId {
    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a file node in a tree's file arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub(crate) usize);

impl FileId {
    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A directory: ordered child collections and a parent back-reference
///
/// Child handles are kept sorted ascending by the child's path, with
/// directories and files in separate collections. The parent is absent
/// exactly for the tree's root.
#[derive(Debug)]
pub struct DirNode {
    pub(crate) path: TreePath,
    pub(crate) parent: Option<DirId>,
    pub(crate) subdirs: Vec<DirId>,
    pub(crate) files: Vec<FileId>,
}

impl DirNode {
    pub(crate) fn new(path: TreePath, parent: Option<DirId>) -> Self {
        Self {
            path,
            parent,
            subdirs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// The directory's absolute path
    #[inline]
    pub fn path(&self) -> &TreePath {
        &self.path
    }

    /// Parent directory handle; `None` for the root
    #[inline]
    pub fn parent(&self) -> Option<DirId> {
        self.parent
    }

    /// Child directory handles, ascending by path
    #[inline]
    pub fn subdirs(&self) -> &[DirId] {
        &self.subdirs
    }

    /// Child file handles, ascending by path
    #[inline]
    pub fn files(&self) -> &[FileId] {
        &self.files
    }

    /// True when the directory has no children of either kind
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subdirs.is_empty() && self.files.is_empty()
    }
}

/// A file: content bytes and a parent back-reference
///
/// Files are always leaves and always have a parent directory.
#[derive(Debug)]
pub struct FileNode {
    pub(crate) path: TreePath,
    pub(crate) parent: DirId,
    pub(crate) content: Vec<u8>,
}

impl FileNode {
    pub(crate) fn new(path: TreePath, parent: DirId, content: Vec<u8>) -> Self {
        Self {
            path,
            parent,
            content,
        }
    }

    /// The file's absolute path
    #[inline]
    pub fn path(&self) -> &TreePath {
        &self.path
    }

    /// Owning directory handle
    #[inline]
    pub fn parent(&self) -> DirId {
        self.parent
    }

    /// The content bytes; may be empty
    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content length in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.content.len()
    }
}
