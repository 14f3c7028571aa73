// src/tree.rs

//! The file tree aggregate: lifecycle, mutation, and queries
//!
//! # Design
//!
//! - **Arena storage**: directory and file nodes live in two slot arenas
//!   addressed by typed handles ([`DirId`] / [`FileId`]); removed slots
//!   are recycled through free lists.
//! - **Ordered siblings**: every directory keeps its child directories
//!   and child files in separate vectors sorted ascending by path, so
//!   lookup and insertion are binary searches and traversal needs no
//!   sorting step.
//! - **Single root**: all paths in a tree share the root's first
//!   component. Inserting under a different first component fails with
//!   [`Error::ConflictingPath`].
//! - **Atomic inserts**: an insert that has to create several missing
//!   levels either creates all of them or rolls every new node back
//!   before reporting the error.

use std::fmt;

use tracing::{debug, warn};

use crate::checker::{self, Violation};
use crate::error::{Error, Result};
use crate::node::{DirId, DirNode, FileId, FileNode};
use crate::path::TreePath;

/// Result of a [`FileTree::stat`] query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    /// The path names a directory
    Directory,
    /// The path names a file holding `size` content bytes
    File { size: usize },
}

impl Stat {
    /// True when the entry is a directory
    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(self, Stat::Directory)
    }

    /// True when the entry is a file
    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self, Stat::File { .. })
    }

    /// Content size for files, `None` for directories
    #[inline]
    pub fn size(&self) -> Option<usize> {
        match self {
            Stat::Directory => None,
            Stat::File { size } => Some(*size),
        }
    }
}

/// Aggregate totals over a whole tree, from [`FileTree::stats`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of directories, including the root
    pub directories: usize,
    /// Number of files
    pub files: usize,
    /// Total content bytes across all files
    pub content_bytes: u64,
    /// Live nodes of both kinds
    pub total_nodes: usize,
}

/// A node handed to the [`FileTree::walk`] visitor
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    /// A directory node
    Dir(&'a DirNode),
    /// A file node
    File(&'a FileNode),
}

impl<'a> Entry<'a> {
    /// The visited node's path
    pub fn path(&self) -> &'a TreePath {
        match self {
            Entry::Dir(dir) => dir.path(),
            Entry::File(file) => file.path(),
        }
    }
}

/// In-memory hierarchy of directories and files addressed by absolute
/// slash-delimited paths
///
/// A tree starts uninitialized; [`init`](Self::init) makes it usable and
/// [`destroy`](Self::destroy) empties it and returns it to the
/// uninitialized state. All mutation goes through path-addressed
/// operations; node handles returned by lookups stay valid until the
/// node they name is removed.
///
/// # Example
///
/// ```
/// use filetree::FileTree;
///
/// let mut tree = FileTree::new();
/// tree.init()?;
/// tree.insert_dir("/usr/bin")?;
/// tree.insert_file("/usr/bin/env", b"#!".to_vec())?;
/// assert_eq!(tree.len(), 3);
/// assert!(tree.contains_file("/usr/bin/env"));
/// assert_eq!(
///     tree.to_string(),
///     "/usr\n/usr/bin\n/usr/bin/env\n"
/// );
/// # Ok::<(), filetree::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct FileTree {
    /// Whether `init` has been called without a matching `destroy`
    initialized: bool,
    /// Root directory; absent exactly when the tree holds no nodes
    root: Option<DirId>,
    /// Live node count, directories and files together
    count: usize,
    /// Optional cap on live nodes; the call that would exceed it fails
    node_limit: Option<usize>,
    dirs: Vec<Option<DirNode>>,
    files: Vec<Option<FileNode>>,
    free_dirs: Vec<usize>,
    free_files: Vec<usize>,
}

impl FileTree {
    /// Create an uninitialized tree; call [`init`](Self::init) before use
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an uninitialized tree capped at `limit` live nodes
    ///
    /// An operation that would push the tree past the cap fails with
    /// [`Error::Capacity`]. Multi-level inserts interrupted by the cap
    /// roll back completely, so the cap never strands partial state.
    pub fn with_node_limit(limit: usize) -> Self {
        Self {
            node_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Move the tree into the initialized, empty state
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Init`] if the tree is already initialized.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::Init("tree is already initialized"));
        }
        self.initialized = true;
        debug!("File tree initialized");
        Ok(())
    }

    /// Remove all contents and return to the uninitialized state
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Init`] if the tree is not initialized.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        let removed = match self.root {
            Some(root) => self.remove_dir_tree(root),
            None => 0,
        };
        self.dirs.clear();
        self.files.clear();
        self.free_dirs.clear();
        self.free_files.clear();
        self.initialized = false;
        debug!("File tree destroyed ({} nodes freed)", removed);
        Ok(())
    }

    /// True once `init` has been called and `destroy` has not
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of live nodes, directories and files together
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when the tree holds no nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Root directory handle, if the tree has any nodes
    #[inline]
    pub fn root(&self) -> Option<DirId> {
        self.root
    }

    /// Borrow a directory node by handle
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale (its node was removed). A stale
    /// handle is a bug in the calling code, not a recoverable condition.
    #[inline]
    pub fn dir_node(&self, id: DirId) -> &DirNode {
        self.dir(id)
    }

    /// Borrow a file node by handle
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[inline]
    pub fn file_node(&self, id: FileId) -> &FileNode {
        self.file(id)
    }

    /// Resolve a directory path to its handle
    ///
    /// # Errors
    ///
    /// - [`Error::NotADirectory`] if the path or one of its prefixes is
    ///   present as a file
    /// - [`Error::ConflictingPath`] if the path does not live under the
    ///   existing root
    /// - [`Error::NoSuchPath`] if resolution runs out of matching nodes
    pub fn find_dir(&self, path: &str) -> Result<DirId> {
        self.ensure_initialized()?;
        let path = TreePath::parse(path)?;
        self.find_dir_node(&path)
    }

    /// Resolve a file path to its handle
    ///
    /// # Errors
    ///
    /// - [`Error::ConflictingPath`] for depth-1 paths (the root is always
    ///   a directory) and for paths outside the root
    /// - [`Error::NotAFile`] if the full path is present as a directory
    /// - [`Error::NotADirectory`] if a proper prefix is present as a file
    /// - [`Error::NoSuchPath`] if resolution runs out of matching nodes
    pub fn find_file(&self, path: &str) -> Result<FileId> {
        self.ensure_initialized()?;
        let path = TreePath::parse(path)?;
        self.find_file_node(&path)
    }

    /// True if a directory exists at `path`; any failure reads as false
    pub fn contains_dir(&self, path: &str) -> bool {
        self.find_dir(path).is_ok()
    }

    /// True if a file exists at `path`; any failure reads as false
    pub fn contains_file(&self, path: &str) -> bool {
        self.find_file(path).is_ok()
    }

    /// Insert a directory, creating every missing ancestor level
    ///
    /// Returns the handle of the directory at `path`. The create is
    /// atomic: if any level fails, all levels created by this call are
    /// removed before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyInTree`] if `path` is already present as a
    ///   directory or file
    /// - [`Error::NotADirectory`] if a proper prefix of `path` is
    ///   present as a file
    /// - [`Error::ConflictingPath`] if the tree has a root and `path`
    ///   does not live under it
    /// - [`Error::Capacity`] if creating a level would exceed the node
    ///   limit
    pub fn insert_dir(&mut self, path: &str) -> Result<DirId> {
        self.ensure_initialized()?;
        let path = TreePath::parse(path)?;
        let deepest = self.traverse_to_furthest(&path)?;
        let have_depth = deepest.map_or(0, |id| self.dir(id).path.depth());
        if have_depth == path.depth() {
            return Err(Error::AlreadyInTree(format!("'{path}'")));
        }
        // A file sitting on the next prefix blocks the descent: the exact
        // target is an occupancy error, a proper prefix a kind error.
        if let Some(stop) = deepest {
            let next = path.prefix(have_depth + 1)?;
            if self.file_child_position(stop, &next).is_ok() {
                return if next.depth() == path.depth() {
                    Err(Error::AlreadyInTree(format!("'{path}'")))
                } else {
                    Err(Error::NotADirectory(format!("'{next}' is a file")))
                };
            }
        }
        let levels = path.depth() - have_depth;
        let (_, id) = self.create_dir_levels(deepest, &path, have_depth)?;
        debug!("Inserted directory: {} ({} levels)", path, levels);
        Ok(id)
    }

    /// Insert a file with the given content, creating missing parent
    /// directories
    ///
    /// Returns the handle of the new file. Content may be empty. Like
    /// [`insert_dir`](Self::insert_dir), the call is atomic: directories
    /// created for a file that then cannot be created are rolled back.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyInTree`] if `path` is already present as a
    ///   directory or file
    /// - [`Error::ConflictingPath`] if `path` has depth 1 (the root must
    ///   be a directory) or does not live under the existing root
    /// - [`Error::NotADirectory`] if a proper prefix of `path` is
    ///   present as a file
    /// - [`Error::Capacity`] if creating a node would exceed the node
    ///   limit
    pub fn insert_file(&mut self, path: &str, content: Vec<u8>) -> Result<FileId> {
        self.ensure_initialized()?;
        let path = TreePath::parse(path)?;
        let deepest = self.traverse_to_furthest(&path)?;
        let have_depth = deepest.map_or(0, |id| self.dir(id).path.depth());
        // Occupancy outranks the root-placement check: inserting over an
        // existing entry reports AlreadyInTree no matter its kind.
        if have_depth == path.depth() {
            return Err(Error::AlreadyInTree(format!("'{path}'")));
        }
        if let Some(stop) = deepest {
            let next = path.prefix(have_depth + 1)?;
            if self.file_child_position(stop, &next).is_ok() {
                return if next.depth() == path.depth() {
                    Err(Error::AlreadyInTree(format!("'{path}'")))
                } else {
                    Err(Error::NotADirectory(format!("'{next}' is a file")))
                };
            }
        }
        if path.depth() == 1 {
            return Err(Error::ConflictingPath(format!(
                "'{path}' would sit at the root, which is always a directory"
            )));
        }
        let parent_depth = path.depth() - 1;
        let (rollback_from, parent_id) = match deepest {
            Some(id) if have_depth == parent_depth => (None, id),
            _ => {
                let parent_path = path.prefix(parent_depth)?;
                let (first, last) =
                    self.create_dir_levels(deepest, &parent_path, have_depth)?;
                (Some(first), last)
            }
        };
        let bytes = content.len();
        match self.create_file_node(path.clone(), parent_id, content) {
            Ok(id) => {
                debug!("Inserted file: {} ({} bytes)", path, bytes);
                Ok(id)
            }
            Err(err) => {
                if let Some(first) = rollback_from {
                    let dropped = self.remove_dir_tree(first);
                    warn!(
                        "Rolled back partial insert of {}: {} nodes freed",
                        path, dropped
                    );
                }
                Err(err)
            }
        }
    }

    /// Remove the directory at `path` together with its whole subtree
    ///
    /// Returns the number of nodes removed. Removing the root empties
    /// the tree but leaves it initialized.
    ///
    /// # Errors
    ///
    /// Resolution errors as for [`find_dir`](Self::find_dir).
    pub fn remove_dir(&mut self, path: &str) -> Result<usize> {
        self.ensure_initialized()?;
        let path = TreePath::parse(path)?;
        let id = self.find_dir_node(&path)?;
        let removed = self.remove_dir_tree(id);
        debug!("Removed directory subtree: {} ({} nodes)", path, removed);
        Ok(removed)
    }

    /// Remove the file at `path`
    ///
    /// # Errors
    ///
    /// Resolution errors as for [`find_file`](Self::find_file).
    pub fn remove_file(&mut self, path: &str) -> Result<()> {
        self.ensure_initialized()?;
        let path = TreePath::parse(path)?;
        let id = self.find_file_node(&path)?;
        self.remove_file_node(id);
        debug!("Removed file: {}", path);
        Ok(())
    }

    /// Borrow the content bytes of the file at `path`
    pub fn file_contents(&self, path: &str) -> Result<&[u8]> {
        let id = self.find_file(path)?;
        Ok(&self.file(id).content)
    }

    /// Replace the content of the file at `path`, returning the
    /// previous bytes
    ///
    /// The file must already exist; this never creates one.
    pub fn replace_file_contents(&mut self, path: &str, content: Vec<u8>) -> Result<Vec<u8>> {
        let id = self.find_file(path)?;
        debug!("Replaced contents of {} ({} bytes)", path, content.len());
        Ok(std::mem::replace(&mut self.file_mut(id).content, content))
    }

    /// Report whether `path` names a directory or a file
    ///
    /// A path present in the tree resolves as a directory first; only
    /// paths that are not directories are tried as files. A depth-1 path
    /// can only ever be the root directory, so its directory resolution
    /// error is the answer.
    pub fn stat(&self, path: &str) -> Result<Stat> {
        self.ensure_initialized()?;
        let parsed = TreePath::parse(path)?;
        match self.find_dir_node(&parsed) {
            Ok(_) => Ok(Stat::Directory),
            Err(dir_err) => {
                if parsed.depth() == 1 {
                    return Err(dir_err);
                }
                let id = self.find_file_node(&parsed)?;
                Ok(Stat::File {
                    size: self.file(id).content.len(),
                })
            }
        }
    }

    /// Aggregate totals for the whole tree
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.walk(|entry| match entry {
            Entry::Dir(_) => stats.directories += 1,
            Entry::File(file) => {
                stats.files += 1;
                stats.content_bytes += file.size() as u64;
            }
        });
        stats.total_nodes = stats.directories + stats.files;
        stats
    }

    /// Visit every node in pre-order
    ///
    /// Order is deterministic: each directory first, then its files
    /// ascending by path, then its subdirectories ascending by path,
    /// each visited recursively. [`Display`](fmt::Display) renders
    /// exactly this order, one canonical path per line.
    pub fn walk<F>(&self, mut visitor: F)
    where
        F: FnMut(Entry<'_>),
    {
        if let Some(root) = self.root {
            self.walk_dir(root, &mut visitor);
        }
    }

    /// Run the structural invariant checker over the whole tree
    ///
    /// Read-only; see [`checker::validate`] for the checks performed.
    pub fn validate(&self) -> std::result::Result<(), Violation> {
        checker::validate(self)
    }

    // ---- internal helpers ----------------------------------------------

    #[inline]
    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::Init("tree is not initialized"))
        }
    }

    #[inline]
    fn dir(&self, id: DirId) -> &DirNode {
        self.dirs[id.0].as_ref().expect("stale dir id")
    }

    #[inline]
    fn dir_mut(&mut self, id: DirId) -> &mut DirNode {
        self.dirs[id.0].as_mut().expect("stale dir id")
    }

    #[inline]
    fn file(&self, id: FileId) -> &FileNode {
        self.files[id.0].as_ref().expect("stale file id")
    }

    #[inline]
    fn file_mut(&mut self, id: FileId) -> &mut FileNode {
        self.files[id.0].as_mut().expect("stale file id")
    }

    /// Slot view that tolerates stale or out-of-range handles; the
    /// checker uses this to report corruption instead of panicking on it.
    #[inline]
    pub(crate) fn dir_slot(&self, id: DirId) -> Option<&DirNode> {
        self.dirs.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn file_slot(&self, id: FileId) -> Option<&FileNode> {
        self.files.get(id.0).and_then(Option::as_ref)
    }

    /// Binary-search `parent`'s subdirectory collection for `path`
    ///
    /// `Ok` carries the position of the match, `Err` the position where
    /// a child with that path would be inserted.
    pub(crate) fn dir_child_position(
        &self,
        parent: DirId,
        path: &TreePath,
    ) -> std::result::Result<usize, usize> {
        self.dir(parent)
            .subdirs
            .binary_search_by(|&id| self.dir(id).path.cmp(path))
    }

    /// Binary-search `parent`'s file collection for `path`
    pub(crate) fn file_child_position(
        &self,
        parent: DirId,
        path: &TreePath,
    ) -> std::result::Result<usize, usize> {
        self.dir(parent)
            .files
            .binary_search_by(|&id| self.file(id).path.cmp(path))
    }

    /// Fail with [`Error::Capacity`] unless one more node fits the cap
    fn charge_node(&self, path: &TreePath) -> Result<()> {
        match self.node_limit {
            Some(limit) if self.count >= limit => Err(Error::Capacity(format!(
                "limit of {limit} nodes reached at '{path}'"
            ))),
            _ => Ok(()),
        }
    }

    fn alloc_dir(&mut self, node: DirNode) -> DirId {
        match self.free_dirs.pop() {
            Some(slot) => {
                self.dirs[slot] = Some(node);
                DirId(slot)
            }
            None => {
                self.dirs.push(Some(node));
                DirId(self.dirs.len() - 1)
            }
        }
    }

    fn alloc_file(&mut self, node: FileNode) -> FileId {
        match self.free_files.pop() {
            Some(slot) => {
                self.files[slot] = Some(node);
                FileId(slot)
            }
            None => {
                self.files.push(Some(node));
                FileId(self.files.len() - 1)
            }
        }
    }

    /// Create one directory node and link it into place
    ///
    /// With no parent the node becomes the root and must have depth 1.
    /// With a parent, the parent's path must be the longest proper
    /// prefix of `path` and no sibling of either kind may already carry
    /// the same path.
    fn create_dir_node(&mut self, path: TreePath, parent: Option<DirId>) -> Result<DirId> {
        let link = match parent {
            Some(parent_id) => {
                let parent_path = self.dir(parent_id).path();
                if path.shared_prefix_depth(parent_path) < parent_path.depth() {
                    return Err(Error::ConflictingPath(format!(
                        "'{path}' is not under '{parent_path}'"
                    )));
                }
                if path.depth() != parent_path.depth() + 1 {
                    return Err(Error::NoSuchPath(format!(
                        "'{path}' is not one level below '{parent_path}'"
                    )));
                }
                let pos = match self.dir_child_position(parent_id, &path) {
                    Ok(_) => return Err(Error::AlreadyInTree(format!("'{path}'"))),
                    Err(pos) => pos,
                };
                if self.file_child_position(parent_id, &path).is_ok() {
                    return Err(Error::AlreadyInTree(format!("'{path}'")));
                }
                Some((parent_id, pos))
            }
            None => {
                // Only a depth-1 path may start a tree.
                if path.depth() != 1 {
                    return Err(Error::NoSuchPath(format!(
                        "'{path}' has no parent in the tree"
                    )));
                }
                None
            }
        };
        self.charge_node(&path)?;
        let id = self.alloc_dir(DirNode::new(path, parent));
        match link {
            Some((parent_id, pos)) => self.dir_mut(parent_id).subdirs.insert(pos, id),
            None => {
                debug_assert!(self.root.is_none());
                self.root = Some(id);
            }
        }
        self.count += 1;
        Ok(id)
    }

    /// Create one file node and link it into its parent
    ///
    /// Same contract as [`create_dir_node`](Self::create_dir_node) for
    /// the parent relation and sibling occupancy.
    fn create_file_node(
        &mut self,
        path: TreePath,
        parent: DirId,
        content: Vec<u8>,
    ) -> Result<FileId> {
        let parent_path = self.dir(parent).path();
        if path.shared_prefix_depth(parent_path) < parent_path.depth() {
            return Err(Error::ConflictingPath(format!(
                "'{path}' is not under '{parent_path}'"
            )));
        }
        if path.depth() != parent_path.depth() + 1 {
            return Err(Error::NoSuchPath(format!(
                "'{path}' is not one level below '{parent_path}'"
            )));
        }
        if self.dir_child_position(parent, &path).is_ok() {
            return Err(Error::AlreadyInTree(format!("'{path}'")));
        }
        let pos = match self.file_child_position(parent, &path) {
            Ok(_) => return Err(Error::AlreadyInTree(format!("'{path}'"))),
            Err(pos) => pos,
        };
        self.charge_node(&path)?;
        let id = self.alloc_file(FileNode::new(path, parent, content));
        self.dir_mut(parent).files.insert(pos, id);
        self.count += 1;
        Ok(id)
    }

    /// Walk from the root toward `path` through exact prefix matches
    ///
    /// Returns the deepest directory whose path is a prefix of `path`,
    /// or `None` when the tree has no root yet.
    ///
    /// # Errors
    ///
    /// [`Error::ConflictingPath`] when a root exists but is not a prefix
    /// of `path`.
    fn traverse_to_furthest(&self, path: &TreePath) -> Result<Option<DirId>> {
        let Some(root_id) = self.root else {
            return Ok(None);
        };
        let root_path = self.dir(root_id).path();
        if path.shared_prefix_depth(root_path) < root_path.depth() {
            return Err(Error::ConflictingPath(format!(
                "'{path}' does not live under the root '{root_path}'"
            )));
        }
        let mut current = root_id;
        for level in 2..=path.depth() {
            let next = path.prefix(level)?;
            match self.dir_child_position(current, &next) {
                Ok(pos) => current = self.dir(current).subdirs[pos],
                Err(_) => break,
            }
        }
        Ok(Some(current))
    }

    /// Resolve `path` to the directory carrying exactly that path
    fn find_dir_node(&self, path: &TreePath) -> Result<DirId> {
        let Some(found) = self.traverse_to_furthest(path)? else {
            return Err(Error::NoSuchPath(format!("'{path}'")));
        };
        let found_depth = self.dir(found).path.depth();
        if found_depth == path.depth() {
            return Ok(found);
        }
        // The walk stopped short; a file on the next prefix makes this a
        // kind mismatch rather than a miss.
        let next = path.prefix(found_depth + 1)?;
        if self.file_child_position(found, &next).is_ok() {
            return Err(Error::NotADirectory(format!("'{next}' is a file")));
        }
        Err(Error::NoSuchPath(format!("'{path}'")))
    }

    /// Resolve `path` to the file carrying exactly that path
    fn find_file_node(&self, path: &TreePath) -> Result<FileId> {
        if path.depth() == 1 {
            return Err(Error::ConflictingPath(format!(
                "'{path}' would sit at the root, which is always a directory"
            )));
        }
        let parent = self.find_dir_node(&path.prefix(path.depth() - 1)?)?;
        match self.file_child_position(parent, path) {
            Ok(pos) => Ok(self.dir(parent).files[pos]),
            Err(_) => {
                if self.dir_child_position(parent, path).is_ok() {
                    Err(Error::NotAFile(format!("'{path}' is a directory")))
                } else {
                    Err(Error::NoSuchPath(format!("'{path}'")))
                }
            }
        }
    }

    /// Create the directory levels of `path` deeper than `have_depth`,
    /// attaching the first new level under `parent`
    ///
    /// Returns the first and last created handles. If any level fails,
    /// every level created by this call is removed first, so the caller
    /// sees either full success or untouched state.
    fn create_dir_levels(
        &mut self,
        parent: Option<DirId>,
        path: &TreePath,
        have_depth: usize,
    ) -> Result<(DirId, DirId)> {
        let level_paths = (have_depth + 1..=path.depth())
            .map(|level| path.prefix(level))
            .collect::<Result<Vec<_>>>()?;
        let mut attach = parent;
        let mut first_new: Option<DirId> = None;
        for level_path in level_paths {
            match self.create_dir_node(level_path, attach) {
                Ok(id) => {
                    first_new.get_or_insert(id);
                    attach = Some(id);
                }
                Err(err) => {
                    if let Some(created) = first_new {
                        let dropped = self.remove_dir_tree(created);
                        warn!(
                            "Rolled back partial insert of {}: {} nodes freed",
                            path, dropped
                        );
                    }
                    return Err(err);
                }
            }
        }
        match (first_new, attach) {
            (Some(first), Some(last)) => Ok((first, last)),
            // Callers only ask for at least one missing level.
            _ => Err(Error::NoSuchPath(format!("'{path}'"))),
        }
    }

    /// Detach `id` from its parent and free its whole subtree
    ///
    /// Returns the number of nodes removed. Clears the root when the
    /// tree becomes empty.
    fn remove_dir_tree(&mut self, id: DirId) -> usize {
        if let Some(parent_id) = self.dir(id).parent {
            let path = self.dir(id).path.clone();
            if let Ok(pos) = self.dir_child_position(parent_id, &path) {
                self.dir_mut(parent_id).subdirs.remove(pos);
            }
        }
        let removed = self.free_dir_subtree(id);
        self.count -= removed;
        if self.count == 0 {
            self.root = None;
        }
        removed
    }

    /// Free `id` and everything below it, files before subdirectories
    ///
    /// Arena bookkeeping only: the parent's collections are untouched.
    fn free_dir_subtree(&mut self, id: DirId) -> usize {
        let node = self.dirs[id.0].take().expect("stale dir id");
        let mut freed = 1;
        for file_id in node.files {
            self.files[file_id.0] = None;
            self.free_files.push(file_id.0);
            freed += 1;
        }
        for sub_id in node.subdirs {
            freed += self.free_dir_subtree(sub_id);
        }
        self.free_dirs.push(id.0);
        freed
    }

    /// Unlink one file from its parent and free its slot
    fn remove_file_node(&mut self, id: FileId) {
        let (parent, path) = {
            let node = self.file(id);
            (node.parent, node.path.clone())
        };
        if let Ok(pos) = self.file_child_position(parent, &path) {
            self.dir_mut(parent).files.remove(pos);
        }
        self.files[id.0] = None;
        self.free_files.push(id.0);
        self.count -= 1;
    }

    fn walk_dir<F>(&self, id: DirId, visitor: &mut F)
    where
        F: FnMut(Entry<'_>),
    {
        let dir = self.dir(id);
        visitor(Entry::Dir(dir));
        for &file_id in &dir.files {
            visitor(Entry::File(self.file(file_id)));
        }
        for &sub_id in &dir.subdirs {
            self.walk_dir(sub_id, visitor);
        }
    }

    fn fmt_dir(&self, id: DirId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = self.dir(id);
        writeln!(f, "{}", dir.path)?;
        for &file_id in &dir.files {
            writeln!(f, "{}", self.file(file_id).path)?;
        }
        for &sub_id in &dir.subdirs {
            self.fmt_dir(sub_id, f)?;
        }
        Ok(())
    }
}

/// Corruption hooks for the checker's negative tests; these break the
/// invariants on purpose, which nothing in the public API can do.
#[cfg(test)]
impl FileTree {
    pub(crate) fn force_count(&mut self, count: usize) {
        self.count = count;
    }

    pub(crate) fn corrupt_dir<F>(&mut self, id: DirId, f: F)
    where
        F: FnOnce(&mut DirNode),
    {
        f(self.dir_mut(id));
    }

    pub(crate) fn vacate_dir_slot(&mut self, id: DirId) {
        self.dirs[id.0] = None;
    }

    pub(crate) fn plant_file(&mut self, parent: DirId, node: FileNode) {
        let id = self.alloc_file(node);
        self.dir_mut(parent).files.push(id);
        self.count += 1;
    }
}

impl fmt::Display for FileTree {
    /// Pre-order listing, one canonical path per line; empty trees
    /// render as the empty string
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => self.fmt_dir(root, f),
            None => Ok(()),
        }
    }
}
