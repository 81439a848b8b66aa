//! Error taxonomy for distribution management.
//!
//! The command layer wraps these in `anyhow::Error`; callers that need to react
//! to a specific condition recover it with `downcast_ref::<DistroError>()`.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DistroError {
    #[error("No such distro: '{name}'")]
    DistroNotFound { name: String },

    #[error("{} is not a symbolic link. Aborting", path.display())]
    LinkNotASymlink { path: PathBuf },

    #[error(
        "Distribution \"{}\" must start with \"{}\". Aborting",
        target.display(),
        crate::paths::DISTRO_PREFIX
    )]
    InvalidActiveTarget { target: PathBuf },

    #[error("Failed to enumerate {}: {source}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid distro name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Failed to inspect {}: {source}", path.display())]
    LinkInspection {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove old link {}: {source}", path.display())]
    LinkRemoval {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create symlink from {} to {}: {source}", link.display(), target.display())]
    LinkCreation {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Blocking Emacs instance found (pid {pid})")]
    BlockingInstance { pid: u32 },
}

pub type Result<T> = std::result::Result<T, DistroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = DistroError::DistroNotFound {
            name: "doom".to_string(),
        };
        assert_eq!(err.to_string(), "No such distro: 'doom'");

        let err = DistroError::InvalidActiveTarget {
            target: PathBuf::from("elsewhere"),
        };
        assert_eq!(
            err.to_string(),
            "Distribution \"elsewhere\" must start with \".emacs.d-\". Aborting"
        );

        let err = DistroError::BlockingInstance { pid: 42 };
        assert!(err.to_string().contains("42"));
    }
}
