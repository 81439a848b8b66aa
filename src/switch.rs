//! Active-link switching.
//!
//! Switching replaces `~/.emacs.d` with a symlink to `~/.emacs.d-<name>`:
//! - the requested distribution must exist as a directory;
//! - an existing link is removed first, and only if it really is a symlink;
//! - nothing is mutated when either check fails.
//!
//! Whether it is safe to switch while Emacs runs is decided by the caller
//! (see `crate::detector`).

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use crate::distros::{ActiveLink, resolve_active_link};
use crate::error::{DistroError, Result};
use crate::paths::Paths;

/// Validate a requested distribution name
pub fn validate_distro_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name cannot be empty"
    } else if name.contains('/') {
        "name cannot contain a path separator"
    } else if name.contains('\0') {
        "name cannot contain a NUL byte"
    } else {
        return Ok(());
    };

    Err(DistroError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Check that the active link can be replaced.
///
/// Returns whether a prior link exists and must be removed. Fails with
/// `LinkNotASymlink` when the path is occupied by anything else.
pub fn check_replaceable(paths: &Paths) -> Result<bool> {
    let link = resolve_active_link(&paths.active_link)?;
    if link == ActiveLink::NotASymlink {
        return Err(DistroError::LinkNotASymlink {
            path: paths.active_link.clone(),
        });
    }
    Ok(link.exists())
}

/// Validate `name` and return its distribution directory.
///
/// Fails with `DistroNotFound` unless the directory exists.
pub fn check_target(paths: &Paths, name: &str) -> Result<PathBuf> {
    validate_distro_name(name)?;

    let distro_dir = paths.distro_dir(name);
    if !distro_dir.is_dir() {
        return Err(DistroError::DistroNotFound {
            name: name.to_string(),
        });
    }
    Ok(distro_dir)
}

/// Point the active link at distribution `name`
pub fn switch_to(paths: &Paths, name: &str, had_prior_link: bool) -> Result<()> {
    let distro_dir = check_target(paths, name)?;

    if had_prior_link {
        remove_link(&paths.active_link)?;
    }

    make_symlink(&distro_dir, &paths.active_link)
}

fn remove_link(link: &Path) -> Result<()> {
    // remove_file would happily delete a regular file here
    let is_symlink = fs::symlink_metadata(link)
        .map(|meta| meta.file_type().is_symlink())
        .map_err(|source| DistroError::LinkRemoval {
            path: link.to_path_buf(),
            source,
        })?;
    if !is_symlink {
        return Err(DistroError::LinkNotASymlink {
            path: link.to_path_buf(),
        });
    }

    fs::remove_file(link).map_err(|source| DistroError::LinkRemoval {
        path: link.to_path_buf(),
        source,
    })
}

fn make_symlink(target: &Path, link: &Path) -> Result<()> {
    symlink(target, link).map_err(|source: io::Error| DistroError::LinkCreation {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distros::active_distro_name;
    use crate::test_utils::{make_distro, setup_test_paths};
    use tempfile::TempDir;

    #[test]
    fn test_validate_distro_name() {
        assert!(validate_distro_name("doom").is_ok());
        assert!(validate_distro_name("my.config-2").is_ok());

        assert!(validate_distro_name("").is_err());
        assert!(validate_distro_name("a/b").is_err());
        assert!(validate_distro_name("../x").is_err());
    }

    #[test]
    fn test_switch_without_prior_link() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");

        switch_to(&paths, "doom", false).unwrap();

        let link = resolve_active_link(&paths.active_link).unwrap();
        let target = link.target().unwrap();
        assert_eq!(target.file_name().unwrap(), ".emacs.d-doom");
        assert_eq!(active_distro_name(target).unwrap(), "doom");
    }

    #[test]
    fn test_switch_replaces_prior_link() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");
        make_distro(&paths, "spacemacs");

        switch_to(&paths, "doom", false).unwrap();
        let had_prior = check_replaceable(&paths).unwrap();
        assert!(had_prior);
        switch_to(&paths, "spacemacs", had_prior).unwrap();

        let link = resolve_active_link(&paths.active_link).unwrap();
        assert_eq!(link.target(), Some(paths.distro_dir("spacemacs").as_path()));
    }

    #[test]
    fn test_switch_replaces_dangling_link() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");
        symlink(paths.distro_dir("ghost"), &paths.active_link).unwrap();

        let had_prior = check_replaceable(&paths).unwrap();
        switch_to(&paths, "doom", had_prior).unwrap();

        let link = resolve_active_link(&paths.active_link).unwrap();
        assert_eq!(link.target(), Some(paths.distro_dir("doom").as_path()));
    }

    #[test]
    fn test_switch_missing_distro_leaves_link() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");
        switch_to(&paths, "doom", false).unwrap();

        let err = switch_to(&paths, "nope", true).unwrap_err();
        assert!(matches!(err, DistroError::DistroNotFound { ref name } if name == "nope"));

        let link = resolve_active_link(&paths.active_link).unwrap();
        assert_eq!(link.target(), Some(paths.distro_dir("doom").as_path()));
    }

    #[test]
    fn test_check_target() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");

        assert_eq!(check_target(&paths, "doom").unwrap(), paths.distro_dir("doom"));
        assert!(matches!(
            check_target(&paths, "nope").unwrap_err(),
            DistroError::DistroNotFound { .. }
        ));
        assert!(matches!(
            check_target(&paths, "a/b").unwrap_err(),
            DistroError::InvalidName { .. }
        ));
    }

    #[test]
    fn test_switch_to_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        fs::write(paths.distro_dir("file"), "").unwrap();

        let err = switch_to(&paths, "file", false).unwrap_err();
        assert!(matches!(err, DistroError::DistroNotFound { .. }));
        assert!(!paths.active_link.exists());
    }

    #[test]
    fn test_check_replaceable_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");
        fs::write(&paths.active_link, "precious").unwrap();

        let err = check_replaceable(&paths).unwrap_err();
        assert!(matches!(err, DistroError::LinkNotASymlink { .. }));
        assert_eq!(fs::read_to_string(&paths.active_link).unwrap(), "precious");
    }

    #[test]
    fn test_switch_refuses_to_remove_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");
        fs::write(&paths.active_link, "precious").unwrap();

        let err = switch_to(&paths, "doom", true).unwrap_err();
        assert!(matches!(err, DistroError::LinkNotASymlink { .. }));
        assert_eq!(fs::read_to_string(&paths.active_link).unwrap(), "precious");
    }

    #[test]
    fn test_switch_over_existing_path_without_removal_fails() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");
        fs::create_dir(&paths.active_link).unwrap();

        let err = switch_to(&paths, "doom", false).unwrap_err();
        assert!(matches!(err, DistroError::LinkCreation { .. }));
        assert!(paths.active_link.is_dir());
    }

    #[test]
    fn test_switch_prior_link_vanished() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        make_distro(&paths, "doom");

        let err = switch_to(&paths, "doom", true).unwrap_err();
        assert!(matches!(err, DistroError::LinkRemoval { .. }));
        assert!(!paths.active_link.exists());
    }
}
