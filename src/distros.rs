//! Distribution registry.
//!
//! A distribution is a directory `~/.emacs.d-<name>`; the active one is whatever
//! `~/.emacs.d` links to. This module only reads: it enumerates distributions,
//! resolves the active link and works out which entry is active.

use serde::Serialize;
use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{DistroError, Result};
use crate::paths::{DISTRO_PREFIX, Paths};

/// What currently sits at the active-link path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveLink {
    /// Nothing at the path
    Missing,
    /// A symlink; the target is reported as stored, dangling or not
    Symlink { target: PathBuf },
    /// Something that is not a symlink (regular file, directory, ...)
    NotASymlink,
}

impl ActiveLink {
    pub fn target(&self) -> Option<&Path> {
        match self {
            Self::Symlink { target } => Some(target),
            _ => None,
        }
    }

    /// Whether a link exists that a switch has to remove first
    pub fn exists(&self) -> bool {
        matches!(self, Self::Symlink { .. })
    }
}

/// Read the symlink at `link` without following it.
///
/// A dangling target is still `Symlink`; only a missing link is `Missing`.
pub fn resolve_active_link(link: &Path) -> Result<ActiveLink> {
    let meta = match fs::symlink_metadata(link) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ActiveLink::Missing),
        Err(source) => {
            return Err(DistroError::LinkInspection {
                path: link.to_path_buf(),
                source,
            });
        }
    };

    if !meta.file_type().is_symlink() {
        return Ok(ActiveLink::NotASymlink);
    }

    match fs::read_link(link) {
        Ok(target) => Ok(ActiveLink::Symlink { target }),
        // Removed between the two calls
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ActiveLink::Missing),
        Err(source) => Err(DistroError::LinkInspection {
            path: link.to_path_buf(),
            source,
        }),
    }
}

/// Lazy scan of the home directory yielding distribution names in directory order.
///
/// Each call to [`list_distributions`] starts a fresh scan.
#[derive(Debug)]
pub struct Distributions {
    dir: PathBuf,
    entries: fs::ReadDir,
}

impl Iterator for Distributions {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(DistroError::Enumeration {
                        path: self.dir.clone(),
                        source,
                    }));
                }
            };
            if let Some(name) = strip_distro_prefix(&entry.file_name()) {
                return Some(Ok(name.to_string()));
            }
        }
    }
}

/// Start enumerating the distributions under `home`
pub fn list_distributions(home: &Path) -> Result<Distributions> {
    let entries = fs::read_dir(home).map_err(|source| DistroError::Enumeration {
        path: home.to_path_buf(),
        source,
    })?;
    Ok(Distributions {
        dir: home.to_path_buf(),
        entries,
    })
}

/// All distribution names under `home`, case-insensitively sorted
pub fn sorted_distributions(home: &Path) -> Result<Vec<String>> {
    let mut names = list_distributions(home)?.collect::<Result<Vec<_>>>()?;
    names.sort_by(|a, b| compare_names(a, b));
    Ok(names)
}

/// Case-insensitive ordering; names differing only in case fall back to byte order
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn strip_distro_prefix(file_name: &OsStr) -> Option<&str> {
    file_name
        .to_str()?
        .strip_prefix(DISTRO_PREFIX)
        .filter(|name| !name.is_empty())
}

/// Distribution name referenced by an active-link target.
///
/// Fails with `InvalidActiveTarget` when the target's basename does not follow
/// the `.emacs.d-<name>` convention.
pub fn active_distro_name(target: &Path) -> Result<String> {
    target
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix(DISTRO_PREFIX))
        .map(str::to_string)
        .ok_or_else(|| DistroError::InvalidActiveTarget {
            target: target.to_path_buf(),
        })
}

/// A distribution as shown in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistroEntry {
    pub name: String,
    pub active: bool,
}

/// Tag each name with whether `active_target` refers to it
pub fn mark_active<I>(names: I, active_target: Option<&Path>) -> Result<Vec<DistroEntry>>
where
    I: IntoIterator<Item = String>,
{
    let active = active_target.map(active_distro_name).transpose()?;
    Ok(names
        .into_iter()
        .map(|name| {
            let active = active.as_deref() == Some(name.as_str());
            DistroEntry { name, active }
        })
        .collect())
}

/// Sorted, marked distributions plus the link state they were marked against
#[derive(Debug, Clone)]
pub struct Listing {
    pub entries: Vec<DistroEntry>,
    pub link: ActiveLink,
}

impl Listing {
    /// The link target when it names no listed distribution
    pub fn stale_target(&self) -> Option<&Path> {
        let target = self.link.target()?;
        if self.entries.iter().any(|e| e.active) {
            None
        } else {
            Some(target)
        }
    }

    pub fn active(&self) -> Option<&DistroEntry> {
        self.entries.iter().find(|e| e.active)
    }
}

/// Resolve the active link and list every distribution against it
pub fn build_listing(paths: &Paths) -> Result<Listing> {
    let link = resolve_active_link(&paths.active_link)?;

    // An out-of-convention target is rejected before the home scan
    if let Some(target) = link.target() {
        active_distro_name(target)?;
    }

    let names = sorted_distributions(&paths.home_dir)?;
    let entries = mark_active(names, link.target())?;
    Ok(Listing { entries, link })
}
