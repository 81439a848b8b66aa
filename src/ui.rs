//! UI module for emdist - styling, color detection, diagnostics, spinners.
//!
//! stdout carries the distribution listing only; warnings, errors and verbose
//! details go to stderr so the listing stays pipeable.
//!
//! # No-color detection (in priority order):
//! 1. `--no-color` CLI flag (highest priority)
//! 2. `NO_COLOR` environment variable (any value)
//! 3. `TERM=dumb` environment variable
//! 4. Non-TTY stdout (detected via anstream)

use anstream::{eprintln, print, println};
use anstyle::{AnsiColor, Color, Style};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Color mode for output
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Always emit ANSI colors
    Always,
    /// Emit colors only if TTY and not disabled
    #[default]
    Auto,
    /// Never emit ANSI colors
    Never,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            _ => Err(format!("invalid color mode: {}", s)),
        }
    }
}

/// UI context holding resolved display settings
#[derive(Debug, Clone)]
pub struct Ui {
    /// Whether colors are enabled
    pub color_enabled: bool,
    /// Whether spinners are enabled (requires TTY + color)
    pub spinner_enabled: bool,
    /// Whether `detail` lines are printed
    pub verbose: bool,
}

impl Ui {
    /// Create a new UI context with color mode detection.
    ///
    /// Priority:
    /// 1. `force_no_color` (from --no-color flag)
    /// 2. `NO_COLOR` env var
    /// 3. `TERM=dumb`
    /// 4. TTY detection (for Auto mode)
    pub fn new(mode: ColorMode, force_no_color: bool) -> Self {
        let color_enabled = Self::resolve_color(mode, force_no_color);
        let is_tty = std::io::stderr().is_terminal();
        let spinner_enabled = color_enabled && is_tty;

        if !color_enabled {
            anstream::ColorChoice::write_global(anstream::ColorChoice::Never);
        }

        Self {
            color_enabled,
            spinner_enabled,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn resolve_color(mode: ColorMode, force_no_color: bool) -> bool {
        if force_no_color {
            return false;
        }

        // Any value disables color, even an empty one
        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
            return false;
        }

        match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    // -------------------------------------------------------------------------
    // Styled label helpers
    // -------------------------------------------------------------------------

    fn style_label(&self, color: AnsiColor) -> Style {
        if self.color_enabled {
            Style::new().fg_color(Some(Color::Ansi(color))).bold()
        } else {
            Style::new()
        }
    }

    /// Print OK label (green) with message to stdout
    pub fn ok(&self, msg: impl AsRef<str>) {
        let label = self.style_label(AnsiColor::Green);
        println!("{label}OK{label:#} {}", msg.as_ref());
    }

    /// Print Warning label (yellow) with message to stderr
    pub fn warn(&self, msg: impl AsRef<str>) {
        let label = self.style_label(AnsiColor::Yellow);
        eprintln!("{label}Warning:{label:#} {}", msg.as_ref());
    }

    /// Print a continuation line aligned under a warning
    pub fn warn_cont(&self, msg: impl AsRef<str>) {
        eprintln!("         {}", msg.as_ref());
    }

    /// Print a dimmed line to stderr, only with `--verbose`
    pub fn detail(&self, msg: impl AsRef<str>) {
        if self.verbose {
            eprintln!("{}", self.dim(msg));
        }
    }

    /// Return a styled string (dimmed/gray) - for inline use
    pub fn dim(&self, s: impl AsRef<str>) -> String {
        if self.color_enabled {
            let st = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));
            format!("{st}{}{st:#}", s.as_ref())
        } else {
            s.as_ref().to_string()
        }
    }

    /// Return a styled string (bold) - for inline use
    pub fn bold(&self, s: impl AsRef<str>) -> String {
        if self.color_enabled {
            let st = Style::new().bold();
            format!("{st}{}{st:#}", s.as_ref())
        } else {
            s.as_ref().to_string()
        }
    }

    /// Return a styled string with specific color - for inline use
    pub fn colored(&self, s: impl AsRef<str>, color: AnsiColor) -> String {
        if self.color_enabled {
            let st = Style::new().fg_color(Some(Color::Ansi(color)));
            format!("{st}{}{st:#}", s.as_ref())
        } else {
            s.as_ref().to_string()
        }
    }

    // -------------------------------------------------------------------------
    // Status icons (with fallback for no-color)
    // -------------------------------------------------------------------------

    pub fn icon_ok(&self) -> &'static str {
        if self.color_enabled { "✓" } else { "[OK]" }
    }

    pub fn icon_warn(&self) -> &'static str {
        if self.color_enabled { "⚠" } else { "[!]" }
    }

    pub fn icon_err(&self) -> &'static str {
        if self.color_enabled { "✗" } else { "[X]" }
    }

    pub fn icon_info(&self) -> &'static str {
        if self.color_enabled { "•" } else { "-" }
    }

    // -------------------------------------------------------------------------
    // Spinners (indicatif)
    // -------------------------------------------------------------------------

    /// Create a spinner for the switch.
    /// Returns a no-op spinner when disabled.
    pub fn spinner(&self, message: impl Into<std::borrow::Cow<'static, str>>) -> ProgressBar {
        if self.spinner_enabled {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                    .template("{spinner:.cyan} {msg}")
                    .expect("valid template"),
            );
            pb.set_message(message);
            pb.enable_steady_tick(Duration::from_millis(80));
            pb
        } else {
            let pb = ProgressBar::hidden();
            pb.set_message(message);
            pb
        }
    }

    /// Finish a spinner with a success message
    pub fn spinner_finish_ok(
        &self,
        pb: &ProgressBar,
        msg: impl Into<std::borrow::Cow<'static, str>>,
    ) {
        if self.spinner_enabled {
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{msg}")
                    .expect("valid template"),
            );
            let icon = self.colored("✓", AnsiColor::Green);
            pb.finish_with_message(format!("{} {}", icon, msg.into()));
        } else {
            pb.finish_and_clear();
            self.ok(msg.into());
        }
    }

    /// Finish a spinner without a message; the error is reported by `main`
    pub fn spinner_abandon(&self, pb: &ProgressBar) {
        pb.finish_and_clear();
    }

    // -------------------------------------------------------------------------
    // Println helpers (using anstream for proper tty handling)
    // -------------------------------------------------------------------------

    /// Print a line to stdout
    pub fn println(&self, msg: impl AsRef<str>) {
        println!("{}", msg.as_ref());
    }

    /// Print text to stdout as-is
    pub fn print(&self, msg: impl AsRef<str>) {
        print!("{}", msg.as_ref());
    }

    /// Print an empty line to stdout
    pub fn newline(&self) {
        println!();
    }

    /// Print an empty line to stderr
    pub fn enewline(&self) {
        eprintln!();
    }

    /// Print a section header
    pub fn section(&self, title: impl AsRef<str>) {
        println!("{}", self.bold(title));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_color_mode_parse() {
        assert_eq!("always".parse::<ColorMode>().unwrap(), ColorMode::Always);
        assert_eq!("auto".parse::<ColorMode>().unwrap(), ColorMode::Auto);
        assert_eq!("NEVER".parse::<ColorMode>().unwrap(), ColorMode::Never);
        assert!("invalid".parse::<ColorMode>().is_err());
    }

    #[test]
    fn test_ui_force_no_color() {
        let ui = Ui::new(ColorMode::Always, true);
        assert!(!ui.color_enabled);
        assert!(!ui.spinner_enabled);
    }

    #[test]
    #[serial]
    fn test_no_color_env() {
        // SAFETY: serialized with every other test touching the environment
        unsafe { std::env::set_var("NO_COLOR", "1") };
        let ui = Ui::new(ColorMode::Always, false);
        unsafe { std::env::remove_var("NO_COLOR") };
        assert!(!ui.color_enabled);
    }

    #[test]
    #[serial]
    fn test_term_dumb() {
        let previous = std::env::var_os("TERM");
        // SAFETY: serialized with every other test touching the environment
        unsafe { std::env::set_var("TERM", "dumb") };
        let ui = Ui::new(ColorMode::Always, false);
        match previous {
            Some(term) => unsafe { std::env::set_var("TERM", term) },
            None => unsafe { std::env::remove_var("TERM") },
        }
        assert!(!ui.color_enabled);
    }

    #[test]
    fn test_icons_no_color() {
        let ui = Ui::new(ColorMode::Never, false);
        assert_eq!(ui.icon_ok(), "[OK]");
        assert_eq!(ui.icon_err(), "[X]");
        assert_eq!(ui.icon_warn(), "[!]");
        assert_eq!(ui.icon_info(), "-");
    }

    #[test]
    fn test_styles_no_color() {
        let ui = Ui::new(ColorMode::Never, false);
        assert_eq!(ui.dim("test"), "test");
        assert_eq!(ui.bold("test"), "test");
        assert_eq!(ui.colored("test", AnsiColor::Red), "test");
    }

    #[test]
    fn test_verbose_default_off() {
        let ui = Ui::new(ColorMode::Never, false);
        assert!(!ui.verbose);
        assert!(ui.with_verbose(true).verbose);
    }

    #[test]
    fn test_spinner_disabled() {
        let ui = Ui::new(ColorMode::Never, false);
        let pb = ui.spinner("test");
        ui.spinner_abandon(&pb);
        assert!(pb.is_finished());
    }
}
