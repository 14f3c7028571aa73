// tests/workflow.rs

//! End-to-end lifecycle, mutation, and serialization workflows.

mod common;

use filetree::{Error, FileTree, Stat};

#[test]
fn test_full_lifecycle_workflow() {
    common::init_tracing();
    let mut tree = FileTree::new();

    // Nothing works before init.
    assert!(matches!(tree.insert_dir("/a"), Err(Error::Init(_))));

    tree.init().unwrap();
    tree.insert_dir("/a").unwrap();
    tree.insert_dir("/a/b").unwrap();
    tree.insert_file("/a/b/hi.txt", b"hello world".to_vec())
        .unwrap();

    assert!(tree.contains_file("/a/b/hi.txt"));
    assert_eq!(tree.file_contents("/a/b/hi.txt").unwrap(), b"hello world");
    assert_eq!(tree.len(), 3);

    // Removing the root directory takes the whole structure with it.
    assert_eq!(tree.remove_dir("/a").unwrap(), 3);
    assert!(matches!(tree.stat("/a"), Err(Error::NoSuchPath(_))));
    assert!(tree.is_empty());
    assert!(tree.is_initialized());

    tree.destroy().unwrap();
    assert!(!tree.is_initialized());
}

#[test]
fn test_serialized_listing_is_preorder() {
    common::init_tracing();
    let tree = common::sample_tree();
    assert_eq!(
        tree.to_string(),
        "/srv\n/srv/motd\n/srv/www\n/srv/www/index.html\n/srv/www/static\n"
    );
}

#[test]
fn test_serialization_independent_of_insert_order() {
    common::init_tracing();
    // Same set of entries, assembled in two different orders.
    let mut first = FileTree::new();
    first.init().unwrap();
    first.insert_dir("/top/z").unwrap();
    first.insert_file("/top/m", b"1".to_vec()).unwrap();
    first.insert_dir("/top/a").unwrap();
    first.insert_file("/top/a/f", b"2".to_vec()).unwrap();

    let mut second = FileTree::new();
    second.init().unwrap();
    second.insert_file("/top/a/f", b"2".to_vec()).unwrap();
    second.insert_dir("/top/z").unwrap();
    second.insert_file("/top/m", b"1".to_vec()).unwrap();

    assert_eq!(
        first.to_string(),
        second.to_string(),
        "listing must depend on content, not on insertion history"
    );
    assert_eq!(
        first.to_string(),
        "/top\n/top/m\n/top/a\n/top/a/f\n/top/z\n"
    );
}

#[test]
fn test_failed_operations_leave_no_trace() {
    common::init_tracing();
    let mut tree = common::sample_tree();
    let before_len = tree.len();
    let before_listing = tree.to_string();

    // Each of these must fail without changing the tree.
    assert!(matches!(
        tree.insert_dir("/srv/motd/sub"),
        Err(Error::NotADirectory(_))
    ));
    assert!(matches!(
        tree.insert_file("/srv/motd", b"again".to_vec()),
        Err(Error::AlreadyInTree(_))
    ));
    assert!(matches!(
        tree.insert_dir("/other/root"),
        Err(Error::ConflictingPath(_))
    ));
    assert!(matches!(
        tree.insert_file("/loner", b"x".to_vec()),
        Err(Error::ConflictingPath(_))
    ));
    assert!(matches!(tree.remove_dir("/srv/gone"), Err(Error::NoSuchPath(_))));
    assert!(matches!(tree.insert_dir("a//b"), Err(Error::BadPath(_))));

    assert_eq!(tree.len(), before_len);
    assert_eq!(tree.to_string(), before_listing);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_multi_level_insert_counts_every_node() {
    common::init_tracing();
    let mut tree = FileTree::new();
    tree.init().unwrap();

    tree.insert_dir("/a/b/c").unwrap();
    assert_eq!(tree.len(), 3, "every created level counts as a node");

    // Only the missing suffix is created on a second insert.
    tree.insert_file("/a/b/x/data", b"d".to_vec()).unwrap();
    assert_eq!(tree.len(), 5);
}

#[test]
fn test_capacity_failure_rolls_back_whole_insert() {
    common::init_tracing();
    let mut tree = FileTree::with_node_limit(4);
    tree.init().unwrap();
    tree.insert_dir("/a/b").unwrap();

    // Needs three more nodes but only two fit; nothing may remain.
    assert!(matches!(
        tree.insert_file("/a/c/d/file", b"x".to_vec()),
        Err(Error::Capacity(_))
    ));
    assert_eq!(tree.len(), 2);
    assert!(!tree.contains_dir("/a/c"));
    assert_eq!(tree.to_string(), "/a\n/a/b\n");
    assert!(tree.validate().is_ok());

    // The budget still allows exactly two more nodes.
    tree.insert_dir("/a/c/d").unwrap();
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_stat_distinguishes_kinds() {
    common::init_tracing();
    let tree = common::sample_tree();
    assert_eq!(tree.stat("/srv").unwrap(), Stat::Directory);
    assert_eq!(tree.stat("/srv/www/static").unwrap(), Stat::Directory);
    assert_eq!(tree.stat("/srv/motd").unwrap(), Stat::File { size: 7 });
    assert!(matches!(
        tree.stat("/srv/missing"),
        Err(Error::NoSuchPath(_))
    ));
}

#[test]
fn test_replace_contents_round() {
    common::init_tracing();
    let mut tree = common::sample_tree();
    let old = tree
        .replace_file_contents("/srv/motd", b"maintenance".to_vec())
        .unwrap();
    assert_eq!(old, b"welcome");
    assert_eq!(tree.file_contents("/srv/motd").unwrap(), b"maintenance");
    assert_eq!(
        tree.stat("/srv/motd").unwrap(),
        Stat::File {
            size: "maintenance".len()
        }
    );
}

#[test]
fn test_stats_reflect_mutations() {
    common::init_tracing();
    let mut tree = common::sample_tree();
    let stats = tree.stats();
    assert_eq!(stats.directories, 3);
    assert_eq!(stats.files, 2);
    assert_eq!(stats.content_bytes, 14);
    assert_eq!(stats.total_nodes, tree.len());

    tree.remove_file("/srv/motd").unwrap();
    let stats = tree.stats();
    assert_eq!(stats.files, 1);
    assert_eq!(stats.content_bytes, 7);
    assert_eq!(stats.total_nodes, tree.len());
}

#[test]
fn test_destroy_then_reuse() {
    common::init_tracing();
    let mut tree = common::sample_tree();
    tree.destroy().unwrap();
    assert!(matches!(tree.destroy(), Err(Error::Init(_))));

    // A destroyed tree can be initialized again from scratch.
    tree.init().unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.to_string(), "");
    tree.insert_file("/fresh/start", b"ok".to_vec()).unwrap();
    assert_eq!(tree.to_string(), "/fresh\n/fresh/start\n");
    assert!(tree.validate().is_ok());
}

#[test]
fn test_walk_visits_every_entry_once() {
    common::init_tracing();
    let tree = common::sample_tree();
    let mut dirs = 0;
    let mut files = 0;
    tree.walk(|entry| match entry {
        filetree::Entry::Dir(_) => dirs += 1,
        filetree::Entry::File(_) => files += 1,
    });
    assert_eq!(dirs, 3);
    assert_eq!(files, 2);
    assert_eq!(dirs + files, tree.len());
}
