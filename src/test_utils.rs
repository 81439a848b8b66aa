//! Test utilities shared across test modules
//!
//! Tests run against a fake home directory and a fake process root inside a
//! temporary directory, never against the real `~` or `/proc`.

use crate::paths::Paths;
use std::fs;
use tempfile::TempDir;

/// Create a Paths struct for testing using a temporary directory
///
/// The home directory is `<temp>/home` and the process root `<temp>/proc`;
/// both are created empty.
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    let mut paths = Paths::with_home(temp_dir.path().join("home"));
    paths.proc_root = temp_dir.path().join("proc");
    fs::create_dir_all(&paths.home_dir).unwrap();
    fs::create_dir_all(&paths.proc_root).unwrap();
    paths
}

/// Create the directory for distribution `name`
pub fn make_distro(paths: &Paths, name: &str) {
    fs::create_dir(paths.distro_dir(name)).unwrap();
}
