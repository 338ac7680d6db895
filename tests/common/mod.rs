//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Write `content` to `name` inside a fresh temporary directory.
///
/// The directory lives as long as the returned guard.
pub fn write_config(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}

/// Self-signed CA certificate shipped with the tests.
pub fn ca_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ca.pem")
}
