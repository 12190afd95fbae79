//! Interactive and scripted line loops

use anyhow::{Context, Result};
use ghostsh_builtins::{Pipeline, ShellState};
use ghostsh_core::GrammarRegistry;
use ghostsh_ui::{LineReader, LocalFs, ReadOutcome, ShellConfig, ShellSources, Suggester};
use std::io::{self, BufRead, Write};

/// Prompt, edit, run, until `exit` or Ctrl+D.
pub fn run_interactive(config: &ShellConfig, state: &mut ShellState, pipeline: &Pipeline) -> Result<()> {
    let grammar = GrammarRegistry::shared();
    let fs = LocalFs::new();
    let options = config.editor.suggest_options();
    let mut reader = LineReader::new(&config.editor);
    ghostsh_core::gsh_log_info!("interactive session started");

    loop {
        let prompt = config.prompt.render_current();
        let outcome = {
            let sources = ShellSources::new(state, pipeline.builtins());
            let suggester = Suggester::new(grammar, &fs, &sources, options);
            reader.read_line(&prompt, &suggester, &sources)?
        };
        let line = match outcome {
            ReadOutcome::Exit => break,
            ReadOutcome::Line(line) => line,
        };
        state.history.record(&line);
        run_line(state, pipeline, &line)?;
        if state.exit_requested {
            break;
        }
    }
    ghostsh_core::gsh_log_info!("interactive session ended");
    Ok(())
}

/// Run each line of `input` without the editor. Returns whether every line
/// succeeded.
pub fn run_script<R: BufRead>(input: R, state: &mut ShellState, pipeline: &Pipeline) -> Result<bool> {
    let mut ok = true;
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        ok &= run_line(state, pipeline, &line)?;
        if state.exit_requested {
            break;
        }
    }
    Ok(ok)
}

/// Run one line against stdout/stderr. Returns whether it succeeded.
pub fn run_line(state: &mut ShellState, pipeline: &Pipeline, line: &str) -> Result<bool> {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    let failed = pipeline
        .execute_line(state, line, &mut out, &mut err)
        .context("Failed to write command output")?;
    out.flush().context("Failed to flush stdout")?;
    Ok(failed.is_none())
}
