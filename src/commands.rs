//! High-level command orchestration for the CLI.
//!
//! This module contains the handler for each thing `emdist` can be asked to do.
//! It serves as the coordination layer, interacting with:
//! - `crate::distros` to enumerate distributions and resolve the active link.
//! - `crate::switch` to replace the active link.
//! - `crate::detector` to look for Emacs instances before switching.
//! - `crate::ui` for output.

use anyhow::{Context, Result};
use std::path::Path;

use crate::detector::ProcessSource;
use crate::distros::{ActiveLink, DistroEntry, Listing, build_listing};
use crate::doctor::run_doctor;
use crate::error::DistroError;
use crate::paths::Paths;
use crate::switch::{check_replaceable, check_target, switch_to};
use crate::ui::Ui;

/// Output format for the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    #[default]
    Plain,
    Json,
}

/// Render entries one per line, the active one marked with `* `
pub fn render_listing(entries: &[DistroEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let marker = if e.active { "* " } else { "  " };
            format!("{marker}{}\n", e.name)
        })
        .collect()
}

/// Warning and its continuation line for a link naming no listed distribution
pub fn stale_link_warning(target: &Path) -> (String, String) {
    (
        "~/.emacs.d does not seem to point to a valid distribution".to_string(),
        format!("~/.emacs.d -> {}", target.display()),
    )
}

/// List all distributions, marking the active one
pub fn list(paths: &Paths, ui: &Ui, format: ListFormat) -> Result<()> {
    let listing = build_listing(paths)?;
    report_link(paths, &listing, ui);

    match format {
        ListFormat::Plain => ui.print(render_listing(&listing.entries)),
        ListFormat::Json => {
            let json = serde_json::to_string_pretty(&listing.entries)
                .context("Failed to serialize distribution listing")?;
            ui.println(json);
        }
    }

    if let Some(target) = listing.stale_target() {
        let (warning, detail) = stale_link_warning(target);
        ui.enewline();
        ui.warn(warning);
        ui.warn_cont(detail);
    }

    Ok(())
}

fn report_link(paths: &Paths, listing: &Listing, ui: &Ui) {
    match &listing.link {
        ActiveLink::Missing => ui.detail(format!("{} does not exist", paths.active_link.display())),
        ActiveLink::Symlink { target } => ui.detail(format!(
            "{} -> {}",
            paths.active_link.display(),
            target.display()
        )),
        ActiveLink::NotASymlink => ui.warn(format!(
            "{} is not a symbolic link; no distribution is active",
            paths.active_link.display()
        )),
    }
}

/// Switch the active link to distribution `name`.
///
/// When a distribution is currently active, a running Emacs that loaded its
/// init file aborts the switch with `BlockingInstance` before anything is
/// touched, unless `force` is set. The requested distribution is checked first.
pub fn use_distro(
    paths: &Paths,
    name: &str,
    ui: &Ui,
    processes: &dyn ProcessSource,
    force: bool,
) -> Result<()> {
    let had_prior_link = check_replaceable(paths)?;
    let distro_dir = check_target(paths, name)?;

    // Without a prior link no distribution is active, so nothing can depend on it
    if had_prior_link {
        let snapshot = processes.snapshot()?;
        ui.detail(format!("Scanned {} processes", snapshot.len()));
        if let Some(pid) = crate::detector::find_blocking_instance(snapshot) {
            if !force {
                return Err(DistroError::BlockingInstance { pid }).context(
                    "Refusing to switch while Emacs is running (quit it or pass --force)",
                );
            }
            ui.warn(format!(
                "Emacs (pid {}) is running on the current distribution; switching anyway",
                pid
            ));
        }
    }

    ui.detail(format!("Target: {}", distro_dir.display()));
    let spinner = ui.spinner(format!("Switching to distribution '{}'...", name));

    match switch_to(paths, name, had_prior_link) {
        Ok(()) => {
            ui.spinner_finish_ok(&spinner, format!("Active distribution: {}", name));
            Ok(())
        }
        Err(e) => {
            ui.spinner_abandon(&spinner);
            Err(e.into())
        }
    }
}

/// Run read-only diagnostics
pub fn doctor(paths: &Paths, ui: &Ui, processes: &dyn ProcessSource) -> Result<()> {
    run_doctor(paths, ui, processes)
}
