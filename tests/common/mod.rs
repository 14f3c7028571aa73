// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

use std::sync::Once;

use filetree::FileTree;

static TRACING: Once = Once::new();

/// Install a tracing subscriber once per test binary so RUST_LOG=debug
/// surfaces tree operations during a failing run.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A small populated tree:
///
/// ```text
/// /srv
/// /srv/motd
/// /srv/www
/// /srv/www/index.html
/// /srv/www/static
/// ```
pub fn sample_tree() -> FileTree {
    let mut tree = FileTree::new();
    tree.init().unwrap();
    tree.insert_dir("/srv").unwrap();
    tree.insert_file("/srv/motd", b"welcome".to_vec()).unwrap();
    tree.insert_dir("/srv/www/static").unwrap();
    tree.insert_file("/srv/www/index.html", b"<html/>".to_vec())
        .unwrap();
    tree
}
