// src/checker.rs

//! Read-only structural validation of a [`FileTree`]
//!
//! [`validate`] walks the whole node graph and checks every structural
//! invariant the tree relies on: the root relation, parent links, the
//! longest-proper-prefix rule, sibling ordering and distinctness, and
//! the declared node count. It never mutates and is never called from
//! the mutation paths; tests run it after every step, and embedders can
//! call it whenever an audit is worth a full walk.
//!
//! The count is checked incrementally during the walk, so validation
//! terminates even on a corrupted graph that contains a cycle: visiting
//! more nodes than the tree declares is itself a violation and stops
//! the traversal.

use thiserror::Error;

use crate::node::{DirId, FileId};
use crate::path::TreePath;
use crate::tree::FileTree;

/// A broken structural invariant, reported with the offending path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// An uninitialized tree must not declare any live nodes
    #[error("uninitialized tree declares {count} live nodes")]
    UninitializedCount { count: usize },

    /// A tree without a root must not declare any live nodes
    #[error("tree without a root declares {count} live nodes")]
    RootlessCount { count: usize },

    /// The root must not record a parent
    #[error("root '{path}' records a parent")]
    RootHasParent { path: TreePath },

    /// The root must sit at depth 1
    #[error("root '{path}' is not a depth-1 path")]
    RootDepth { path: TreePath },

    /// A child collection holds a handle whose arena slot is vacant
    #[error("stale directory handle (index {index}) is reachable")]
    StaleDirId { index: usize },

    /// A child collection holds a file handle whose arena slot is vacant
    #[error("stale file handle (index {index}) is reachable")]
    StaleFileId { index: usize },

    /// A node's path must extend its parent's path by exactly one level
    #[error("'{child}' does not extend its parent '{parent}' by one level")]
    ParentPrefix { parent: TreePath, child: TreePath },

    /// A node's recorded parent must be the directory that lists it
    #[error("'{child}' records a parent other than '{parent}'")]
    ParentLink { parent: TreePath, child: TreePath },

    /// Sibling collections must be strictly ascending by path
    #[error("children of '{parent}' are out of order near '{child}'")]
    SiblingOrder { parent: TreePath, child: TreePath },

    /// No path may appear as both a directory and a file under one parent
    #[error("'{path}' appears as both a directory and a file under '{parent}'")]
    DuplicateSibling { parent: TreePath, path: TreePath },

    /// A listed child must be found again by binary search on its path
    #[error("'{child}' is not found by ordered lookup under '{parent}'")]
    ChildLookup { parent: TreePath, child: TreePath },

    /// More nodes are reachable from the root than the tree declares
    #[error("more than {declared} nodes reachable from the root")]
    CountExceeded { declared: usize },

    /// The reachable node total must equal the declared count
    #[error("{visited} nodes reachable from the root, {declared} declared")]
    CountMismatch { visited: usize, declared: usize },
}

/// Check every structural invariant of `tree`
///
/// Returns the first violation found, in walk order. `Ok(())` means the
/// reachable structure is fully consistent with the tree's declared
/// state.
pub fn validate(tree: &FileTree) -> Result<(), Violation> {
    if !tree.is_initialized() && tree.len() != 0 {
        return Err(Violation::UninitializedCount { count: tree.len() });
    }
    let Some(root) = tree.root() else {
        if tree.len() != 0 {
            return Err(Violation::RootlessCount { count: tree.len() });
        }
        return Ok(());
    };
    let mut visited = 0;
    check_dir(tree, root, None, &mut visited)?;
    if visited != tree.len() {
        return Err(Violation::CountMismatch {
            visited,
            declared: tree.len(),
        });
    }
    Ok(())
}

/// Count one visited node, failing as soon as the declared total is
/// exceeded
fn tally(tree: &FileTree, visited: &mut usize) -> Result<(), Violation> {
    *visited += 1;
    if *visited > tree.len() {
        return Err(Violation::CountExceeded {
            declared: tree.len(),
        });
    }
    Ok(())
}

/// Validate one directory and recurse into its subdirectories
fn check_dir(
    tree: &FileTree,
    id: DirId,
    parent: Option<DirId>,
    visited: &mut usize,
) -> Result<(), Violation> {
    let Some(node) = tree.dir_slot(id) else {
        return Err(Violation::StaleDirId { index: id.index() });
    };
    tally(tree, visited)?;

    match (parent, node.parent()) {
        (None, None) => {
            if node.path().depth() != 1 {
                return Err(Violation::RootDepth {
                    path: node.path().clone(),
                });
            }
        }
        (None, Some(_)) => {
            return Err(Violation::RootHasParent {
                path: node.path().clone(),
            });
        }
        (Some(expected), recorded) => {
            if recorded != Some(expected) {
                return Err(Violation::ParentLink {
                    parent: tree.dir_node(expected).path().clone(),
                    child: node.path().clone(),
                });
            }
            check_parent_relation(tree, expected, node.path())?;
            // The parent must re-find this exact child by ordered lookup.
            let hit = tree
                .dir_child_position(expected, node.path())
                .ok()
                .map(|pos| tree.dir_node(expected).subdirs()[pos]);
            if hit != Some(id) {
                return Err(Violation::ChildLookup {
                    parent: tree.dir_node(expected).path().clone(),
                    child: node.path().clone(),
                });
            }
        }
    }

    // Child handles must point at occupied slots before their paths can
    // be compared.
    for &sub in node.subdirs() {
        if tree.dir_slot(sub).is_none() {
            return Err(Violation::StaleDirId { index: sub.index() });
        }
    }
    for &file in node.files() {
        if tree.file_slot(file).is_none() {
            return Err(Violation::StaleFileId {
                index: file.index(),
            });
        }
    }

    check_sibling_order(tree, id)?;

    for &file in node.files() {
        check_file(tree, file, id, visited)?;
    }
    for &sub in node.subdirs() {
        check_dir(tree, sub, Some(id), visited)?;
    }
    Ok(())
}

/// Validate one file against the directory that lists it
fn check_file(
    tree: &FileTree,
    id: FileId,
    parent: DirId,
    visited: &mut usize,
) -> Result<(), Violation> {
    // The caller verified the slot; re-fetch for the node view.
    let Some(node) = tree.file_slot(id) else {
        return Err(Violation::StaleFileId { index: id.index() });
    };
    tally(tree, visited)?;

    if node.parent() != parent {
        return Err(Violation::ParentLink {
            parent: tree.dir_node(parent).path().clone(),
            child: node.path().clone(),
        });
    }
    check_parent_relation(tree, parent, node.path())?;
    let hit = tree
        .file_child_position(parent, node.path())
        .ok()
        .map(|pos| tree.dir_node(parent).files()[pos]);
    if hit != Some(id) {
        return Err(Violation::ChildLookup {
            parent: tree.dir_node(parent).path().clone(),
            child: node.path().clone(),
        });
    }
    Ok(())
}

/// The parent's path must be the longest proper prefix of the child's:
/// shared up to the parent's full depth, and exactly one level shorter
fn check_parent_relation(
    tree: &FileTree,
    parent: DirId,
    child: &TreePath,
) -> Result<(), Violation> {
    let parent_path = tree.dir_node(parent).path();
    if child.shared_prefix_depth(parent_path) < parent_path.depth()
        || child.depth() != parent_path.depth() + 1
    {
        return Err(Violation::ParentPrefix {
            parent: parent_path.clone(),
            child: child.clone(),
        });
    }
    Ok(())
}

/// Both sibling collections must be strictly ascending, and no path may
/// appear in both
fn check_sibling_order(tree: &FileTree, id: DirId) -> Result<(), Violation> {
    let node = tree.dir_node(id);
    for pair in node.subdirs().windows(2) {
        if tree.dir_node(pair[0]).path() >= tree.dir_node(pair[1]).path() {
            return Err(Violation::SiblingOrder {
                parent: node.path().clone(),
                child: tree.dir_node(pair[1]).path().clone(),
            });
        }
    }
    for pair in node.files().windows(2) {
        if tree.file_node(pair[0]).path() >= tree.file_node(pair[1]).path() {
            return Err(Violation::SiblingOrder {
                parent: node.path().clone(),
                child: tree.file_node(pair[1]).path().clone(),
            });
        }
    }
    // Both collections are sorted here, so one merge pass finds any path
    // present in both.
    let mut di = 0;
    let mut fi = 0;
    while di < node.subdirs().len() && fi < node.files().len() {
        let dir_path = tree.dir_node(node.subdirs()[di]).path();
        let file_path = tree.file_node(node.files()[fi]).path();
        match dir_path.cmp(file_path) {
            std::cmp::Ordering::Less => di += 1,
            std::cmp::Ordering::Greater => fi += 1,
            std::cmp::Ordering::Equal => {
                return Err(Violation::DuplicateSibling {
                    parent: node.path().clone(),
                    path: dir_path.clone(),
                });
            }
        }
    }
    Ok(())
}
