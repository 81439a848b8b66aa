use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// Prefix every distribution directory carries in the home directory
pub const DISTRO_PREFIX: &str = ".emacs.d-";

/// Name of the active link in the home directory
pub const ACTIVE_LINK_NAME: &str = ".emacs.d";

/// Default process-information root
pub const PROC_ROOT: &str = "/proc";

/// All computed paths used by emdist
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~
    pub home_dir: PathBuf,
    /// ~/.emacs.d
    pub active_link: PathBuf,
    /// /proc
    pub proc_root: PathBuf,
}

impl Paths {
    /// Resolve paths from the user's home directory, or from `home_override`
    /// when one is given (`--home` / `EMDIST_HOME`).
    pub fn new(home_override: Option<PathBuf>) -> Result<Self> {
        let home = match home_override {
            Some(home) => home,
            None => BaseDirs::new()
                .context("Failed to determine home directory")?
                .home_dir()
                .to_path_buf(),
        };
        Ok(Self::with_home(home))
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home_dir = home.into();
        let active_link = home_dir.join(ACTIVE_LINK_NAME);
        Self {
            home_dir,
            active_link,
            proc_root: PathBuf::from(PROC_ROOT),
        }
    }

    /// Get the on-disk directory for a distribution: `~/.emacs.d-<name>`
    pub fn distro_dir(&self, name: &str) -> PathBuf {
        self.home_dir.join(format!("{DISTRO_PREFIX}{name}"))
    }

    /// Check if a path is a distribution directory directly inside home
    pub fn is_distro_path(&self, path: &Path) -> bool {
        path.parent() == Some(self.home_dir.as_path())
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(DISTRO_PREFIX))
    }
}
