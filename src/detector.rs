//! Detection of running Emacs instances that depend on the active distribution.
//!
//! A process is a blocking instance when its `argv[0]` is exactly `emacs` and
//! it was not started with a switch that skips the init file (`-q`,
//! `--no-init-file`, `-Q`, `--quick`). Such a process has the active
//! distribution loaded, so pulling `~/.emacs.d` out from under it is unsafe.
//!
//! Matching works on the raw `cmdline` bytes, where arguments are separated by
//! NUL. Process tables come from a [`ProcessSource`] so the matching itself is a
//! pure function over `(pid, cmdline)` pairs.

use std::fs;
use std::path::PathBuf;

use crate::error::{DistroError, Result};

/// Process name token that `argv[0]` must equal
pub const EDITOR_PROCESS_NAME: &[u8] = b"emacs";

/// Switches that start Emacs without the user's init file
pub const EXCLUDED_SWITCHES: [&[u8]; 4] = [b"\0-q", b"\0--no-init-file", b"\0-Q", b"\0--quick"];

/// One process in a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Raw command line, arguments separated by NUL
    pub cmdline: Vec<u8>,
}

impl ProcessEntry {
    pub fn new(pid: u32, cmdline: impl Into<Vec<u8>>) -> Self {
        Self {
            pid,
            cmdline: cmdline.into(),
        }
    }
}

/// Something that can list running processes
pub trait ProcessSource {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>>;

    /// First blocking instance in snapshot order
    fn find_blocking_instance(&self) -> Result<Option<u32>> {
        Ok(find_blocking_instance(self.snapshot()?))
    }
}

impl ProcessSource for Vec<ProcessEntry> {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>> {
        Ok(self.clone())
    }
}

/// Process table read from a procfs mount
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProcessSource for ProcFs {
    /// Read `<root>/<pid>/cmdline` for every numeric entry.
    ///
    /// Failing to list the root is fatal. A `cmdline` that cannot be read means
    /// the process exited meanwhile, and it is skipped.
    fn snapshot(&self) -> Result<Vec<ProcessEntry>> {
        let enumeration_error = |source: std::io::Error| DistroError::Enumeration {
            path: self.root.clone(),
            source,
        };

        let mut processes = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(enumeration_error)? {
            let entry = entry.map_err(enumeration_error)?;
            let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|n| n.parse::<u32>().ok())
            else {
                continue;
            };

            match fs::read(entry.path().join("cmdline")) {
                Ok(cmdline) => processes.push(ProcessEntry { pid, cmdline }),
                Err(_) => continue,
            }
        }
        Ok(processes)
    }
}

/// Whether a raw command line belongs to a blocking Emacs instance
pub fn is_blocking_cmdline(cmdline: &[u8]) -> bool {
    let argv0 = cmdline.split(|&b| b == 0).next().unwrap_or_default();
    argv0 == EDITOR_PROCESS_NAME
        && !EXCLUDED_SWITCHES
            .iter()
            .any(|switch| contains(cmdline, switch))
}

/// First blocking instance in the order the processes are given
pub fn find_blocking_instance<I>(processes: I) -> Option<u32>
where
    I: IntoIterator<Item = ProcessEntry>,
{
    processes
        .into_iter()
        .find(|p| is_blocking_cmdline(&p.cmdline))
        .map(|p| p.pid)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
