//! Diagnostic tool for emdist.
//!
//! This module implements `emdist --doctor`, which checks the setup for common
//! issues without changing anything:
//! - Home directory readable.
//! - State of `~/.emacs.d` (missing, symlink, not a symlink, stale target).
//! - Distributions found.
//! - Running Emacs instances that would block a switch.
//!
//! It reports each check with a pass/fail/warn status.

use anstyle::AnsiColor;
use anyhow::Result;

use crate::detector::ProcessSource;
use crate::distros::{ActiveLink, active_distro_name, resolve_active_link, sorted_distributions};
use crate::paths::Paths;
use crate::ui::Ui;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Run the doctor diagnostics.
///
/// Only an unreadable home directory is returned as an error; every other
/// problem is reported inline.
pub fn run_doctor(paths: &Paths, ui: &Ui, processes: &dyn ProcessSource) -> Result<()> {
    ui.section("emdist Doctor");
    ui.newline();

    // 1. Home directory, fatal when unreadable
    let distros = sorted_distributions(&paths.home_dir)?;
    check_step(ui, "Home Directory", || {
        ui.println(format!(
            "  {} Home directory readable: {}",
            ui.icon_ok(),
            paths.home_dir.display()
        ));
        CheckStatus::Pass
    });

    // 2. Active link
    check_step(ui, "Active Link", || check_active_link(paths, &distros, ui));

    // 3. Distributions
    check_step(ui, "Distributions", || {
        if distros.is_empty() {
            ui.println(format!(
                "  {} No distributions found (expected ~/.emacs.d-<name> directories)",
                ui.icon_warn()
            ));
            return CheckStatus::Warn;
        }

        ui.println(format!("  Found {} distributions:", distros.len()));
        let mut status = CheckStatus::Pass;
        for name in &distros {
            if paths.distro_dir(name).is_dir() {
                ui.println(format!("    {} {}", ui.icon_ok(), name));
            } else {
                ui.println(format!("    {} {} (not a directory)", ui.icon_warn(), name));
                status = CheckStatus::Warn;
            }
        }
        status
    });

    // 4. Running Emacs
    check_step(ui, "Running Emacs", || {
        match processes.find_blocking_instance() {
            Ok(None) => {
                ui.println(format!("  {} No blocking Emacs instance", ui.icon_ok()));
                CheckStatus::Pass
            }
            Ok(Some(pid)) => {
                ui.println(format!(
                    "  {} Emacs running with the active distribution (pid {})",
                    ui.icon_warn(),
                    pid
                ));
                ui.println(format!("  {} Switching now requires --force", ui.icon_info()));
                CheckStatus::Warn
            }
            Err(e) => {
                ui.println(format!("  {} Cannot scan processes: {}", ui.icon_err(), e));
                CheckStatus::Fail
            }
        }
    });

    Ok(())
}

/// Check `~/.emacs.d` against the listed distributions
pub fn check_active_link(paths: &Paths, distros: &[String], ui: &Ui) -> CheckStatus {
    let link = match resolve_active_link(&paths.active_link) {
        Ok(link) => link,
        Err(e) => {
            ui.println(format!("  {} {}", ui.icon_err(), e));
            return CheckStatus::Fail;
        }
    };

    match link {
        ActiveLink::Missing => {
            ui.println(format!(
                "  {} {} does not exist (no active distribution)",
                ui.icon_warn(),
                paths.active_link.display()
            ));
            CheckStatus::Warn
        }
        ActiveLink::NotASymlink => {
            ui.println(format!(
                "  {} {} is not a symbolic link; switching will refuse to replace it",
                ui.icon_err(),
                paths.active_link.display()
            ));
            CheckStatus::Fail
        }
        ActiveLink::Symlink { target } => {
            ui.println(format!("  {} Symlink points to: {}", ui.icon_ok(), target.display()));
            let name = match active_distro_name(&target) {
                Ok(name) => name,
                Err(e) => {
                    ui.println(format!("  {} {}", ui.icon_err(), e));
                    return CheckStatus::Fail;
                }
            };
            if !paths.is_distro_path(&target) {
                ui.println(format!(
                    "  {} Target is outside the home directory",
                    ui.icon_warn()
                ));
            }
            if distros.contains(&name) {
                ui.println(format!("  {} Active distribution: {}", ui.icon_ok(), name));
                CheckStatus::Pass
            } else {
                ui.println(format!(
                    "  {} Target matches no listed distribution (stale link)",
                    ui.icon_err()
                ));
                CheckStatus::Fail
            }
        }
    }
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F)
where
    F: FnOnce() -> CheckStatus,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    match check_fn() {
        CheckStatus::Pass => {}
        CheckStatus::Warn => ui.println(ui.colored("  Warnings reported.", AnsiColor::Yellow)),
        CheckStatus::Fail => ui.println(ui.colored("  Issues detected!", AnsiColor::Red)),
    }
    ui.newline();
}
