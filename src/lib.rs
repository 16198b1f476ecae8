//! dupescan - duplicate file finder
//!
//! Walks a set of root directories, hashes every regular file with BLAKE3 on
//! a background worker and groups files with identical digests. Results
//! stream to the caller as [`engine::ScanEvent`]s so a front end stays
//! responsive; selected duplicates can then be deleted or moved with
//! [`actions`].

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod session;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::actions::{delete_files, move_files, validate_preserves_copy, ActionReport};
use crate::cli::{Cli, Commands, ScanArgs};
use crate::config::Settings;
use crate::duplicates::GroupReport;
use crate::engine::ScanEngine;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::ScanProgressBar;
use crate::scanner::RootSet;
use crate::session::ScanSession;

/// Run the command-line application.
///
/// # Errors
///
/// Returns an error for invalid configuration, an empty root set, or a
/// failure writing the report. Per-file failures are reported in the
/// output and reflected in the exit code instead.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let settings = Settings::load(cli.config.as_deref(), &cli.command.overrides())?;
    let color = !cli.no_color && io::stdout().is_terminal();

    match &cli.command {
        Commands::Scan(args) => run_scan(args, &settings, cli.quiet, color),
        Commands::Delete(args) => {
            let report = delete_files(&args.paths, &settings.delete_config());
            print_actions(&report, "Deleted", args.json)?;
            Ok(ExitCode::for_actions(&report))
        }
        Commands::Move(args) => {
            let report = move_files(&args.paths, &args.destination, &settings.move_config());
            print_actions(&report, "Moved", args.json)?;
            Ok(ExitCode::for_actions(&report))
        }
    }
}

fn run_scan(args: &ScanArgs, settings: &Settings, quiet: bool, color: bool) -> Result<ExitCode> {
    let roots: RootSet = args.paths.iter().cloned().collect();
    let shutdown = signal::install_handler();
    let engine = ScanEngine::new(settings.engine_config().with_cancel_token(shutdown.token()));

    let handle = engine.begin_scan(&roots).context("Failed to start scan")?;
    let progress = ScanProgressBar::new(quiet || args.no_progress || !io::stderr().is_terminal());

    let mut session = ScanSession::new();
    for event in handle.events() {
        progress.observe(&event);
        session.apply(&event);
    }
    handle
        .join()
        .context("Scan worker terminated abnormally")?;

    let outcome = session
        .outcome()
        .cloned()
        .context("Scan ended without a completion event")?;
    for skip in &outcome.walk_skips {
        log::warn!("Skipped: {}", skip);
    }

    let report = session.current_groups();
    let mut exit_code = ExitCode::for_scan(&outcome, &report);

    let mut stdout = io::stdout().lock();
    if args.json {
        JsonOutput::new(&report, &outcome, exit_code).write_to(&mut stdout, true)?;
    } else {
        TextOutput::new(&report, &outcome)
            .with_color(color)
            .write_to(&mut stdout)?;
    }
    drop(stdout);

    if outcome.cancelled {
        return Ok(exit_code);
    }

    let action = if args.delete_duplicates {
        Some(delete_files(&redundant_copies(&report)?, &settings.delete_config()))
    } else if let Some(destination) = &args.move_duplicates {
        Some(move_files(
            &redundant_copies(&report)?,
            destination,
            &settings.move_config(),
        ))
    } else {
        None
    };

    if let Some(action) = action {
        let verb = if args.delete_duplicates { "Deleted" } else { "Moved" };
        if !args.json {
            print_actions(&action, verb, false)?;
        }
        if !action.all_succeeded() {
            exit_code = ExitCode::PartialSuccess;
        }
    }

    Ok(exit_code)
}

/// Every member but the first of each group.
fn redundant_copies(report: &GroupReport) -> Result<Vec<PathBuf>> {
    let mut selected = Vec::with_capacity(report.total_reclaimable_files);
    for group in &report.groups {
        let chosen = &group.paths[1..];
        validate_preserves_copy(chosen, &group.paths)
            .with_context(|| format!("Refusing to act on group {}", group.id))?;
        selected.extend_from_slice(chosen);
    }
    Ok(selected)
}

fn print_actions(report: &ActionReport, verb: &str, json: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, report)?;
        writeln!(stdout)?;
    } else {
        for failure in &report.failures {
            writeln!(stdout, "Failed: {}: {}", failure.path.display(), failure.error)?;
        }
        writeln!(stdout, "{}", report.summary(verb))?;
    }
    Ok(())
}
