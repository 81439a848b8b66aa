use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

use emdist::{
    commands::{self, ListFormat},
    detector::ProcFs,
    paths::Paths,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "emdist")]
#[command(about = "Emacs distribution switcher - manage multiple ~/.emacs.d variants")]
#[command(
    long_about = "Lists the ~/.emacs.d-<name> distributions in your home directory, or \
                  points ~/.emacs.d at one of them.\n\n\
                  Switching is refused while an Emacs that loaded its init file is \
                  running (Emacs started with -q/-Q is ignored); use --force to \
                  switch anyway."
)]
#[command(version)]
struct Cli {
    /// Distribution to activate; lists distributions when omitted
    distro: Option<String>,

    /// Switch even if a running Emacs is using the current distribution
    #[arg(long, requires = "distro")]
    force: bool,

    /// Print the listing as JSON
    #[arg(long, conflicts_with = "distro")]
    json: bool,

    /// Check the setup and report problems
    #[arg(long, conflicts_with_all = ["distro", "json"])]
    doctor: bool,

    /// Home directory holding ~/.emacs.d and the distributions
    #[arg(long, env = "EMDIST_HOME", value_name = "DIR")]
    home: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Show what emdist is looking at
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "emdist", &mut std::io::stdout());
        return Ok(());
    }

    let paths = Paths::new(cli.home)?;
    let ui = Ui::new(cli.color, cli.no_color).with_verbose(cli.verbose);
    let processes = ProcFs::new(&paths.proc_root);

    if cli.doctor {
        return commands::doctor(&paths, &ui, &processes);
    }

    // An empty name lists, same as no name
    match cli.distro.filter(|name| !name.is_empty()) {
        Some(name) => commands::use_distro(&paths, &name, &ui, &processes, cli.force),
        None => {
            let format = if cli.json {
                ListFormat::Json
            } else {
                ListFormat::Plain
            };
            commands::list(&paths, &ui, format)
        }
    }
}
