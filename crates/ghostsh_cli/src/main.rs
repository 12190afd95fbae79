mod logging;
mod repl;

use anyhow::Result;
use clap::Parser;
use ghostsh_builtins::{Pipeline, ShellState};
use ghostsh_ui::ShellConfig;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

/// ghostsh command-line interface.
#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive shell with structured pipelines and inline suggestions", long_about = None)]
struct Cli {
    /// Run one command line and exit instead of starting the interactive shell.
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    command: Option<String>,

    /// Configuration file (default: <config_dir>/ghostsh/config.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `ghostsh_ui=trace` (overrides GHOSTSH_LOG).
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Keep history, aliases and bookmarks in memory only.
    #[arg(long)]
    no_history: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = match logging::init(cli.log_level.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ghostsh: logging disabled: {e:#}");
            None
        }
    };

    let config = ShellConfig::load_or_default(cli.config.as_deref());
    let mut state = if cli.no_history {
        ShellState::ephemeral()
    } else {
        ShellState::load(&config.store_paths())
    };
    let pipeline = Pipeline::default();

    let ok = if let Some(line) = cli.command {
        repl::run_line(&mut state, &pipeline, &line)?
    } else if io::stdin().is_terminal() {
        repl::run_interactive(&config, &mut state, &pipeline)?;
        true
    } else {
        repl::run_script(io::stdin().lock(), &mut state, &pipeline)?
    };
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
