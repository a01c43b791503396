use console::Term;
use dlc_renamer::archive::{ExtractFilter, PsarcUnpacker};
use dlc_renamer::batch::{BatchOrchestrator, BatchSummary, ItemReport, RenameOutcome};
use dlc_renamer::config::Options;
use dlc_renamer::logging::init_run_log;
use dlc_renamer::utils::discovery::discover_archives;
use dlc_renamer::utils::mover::NoClobberMover;
use dlc_renamer::utils::progress::{create_progress_bar, print_line};
use dlc_renamer::utils::validation::validate_directory;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use std::env;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

const WORK_DIR_NAME: &str = "dlc-renamer";

pub fn handle_rename(dir: &Path, no_pause: bool) -> Result<(), Box<dyn Error>> {
    let cwd = env::current_dir()?;
    let (options, warnings) = Options::load(&cwd)?;

    if options.logging_enabled {
        let log_path = init_run_log(&cwd)?;
        println!(
            "{} {}",
            "Logging to:".bright_black(),
            log_path.display().to_string().cyan()
        );
    }
    for warning in &warnings {
        log::warn!("{}: {warning}", Options::options_path(&cwd).display());
        eprintln!("  {} {}", "Warning:".yellow(), warning);
    }
    if let Ok(json) = serde_json::to_string(&options) {
        log::debug!("Options: {json}");
    }

    validate_directory(dir)?;

    let term = Term::stdout();
    let interactive = term.is_term();
    let can_prompt = interactive && io::stdin().is_terminal() && !no_pause;
    let pause_on_error = can_prompt && options.pause_on_error;

    println!(
        "{} {}",
        "Renaming archives in:".bright_black(),
        dir.display().to_string().cyan()
    );

    let files = discover_archives(dir, options.include_subfolders)?;
    log::info!("Found {} archives in {}", files.len(), dir.display());
    if files.is_empty() {
        println!("{} No archives found", "⚠".yellow());
        finish(&term, can_prompt)?;
        return Ok(());
    }

    println!(
        "{} Found {} archives\n",
        "ℹ".blue(),
        files.len().to_string().cyan().bold()
    );

    let unpacker = PsarcUnpacker::new(ExtractFilter::MetadataOnly);
    let mover = NoClobberMover;
    let work_dir = env::temp_dir().join(WORK_DIR_NAME);
    let orchestrator = BatchOrchestrator::new(&options, &unpacker, &mover, &work_dir);

    let pb = create_progress_bar(files.len() as u64, interactive);
    pb.set_message("Renaming...");

    let summary = orchestrator.run(&files, |report| {
        report_item(&pb, dir, report);
        if pause_on_error && report.is_failure() {
            pb.suspend(|| pause(&term));
        }
        pb.inc(1);
    });

    pb.finish_and_clear();
    print_summary(&summary);

    finish(&term, can_prompt)?;
    Ok(())
}

fn report_item(pb: &ProgressBar, dir: &Path, report: &ItemReport) {
    if let Some(warning) = &report.cleanup_warning {
        print_line(pb, format!("  {} {}", "Warning:".yellow(), warning));
    }
    if report.is_silent() {
        return;
    }

    let line = match &report.outcome {
        RenameOutcome::Renamed { old, new } => format!(
            "  {} {} {} {}",
            "✓".green(),
            display_name(dir, old).bright_black(),
            "→".bright_black(),
            display_name(dir, new).green()
        ),
        RenameOutcome::Skipped { path, reason } => format!(
            "  {} {} ({})",
            "-".bright_black(),
            display_name(dir, path),
            reason.bright_black()
        ),
        RenameOutcome::Failed { old, error, .. } => format!(
            "  {} {} {}",
            "Error:".red(),
            display_name(dir, old).red(),
            error.to_string().bright_black()
        ),
    };
    print_line(pb, line);
}

/// Path relative to the directory being renamed, for shorter output.
fn display_name(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .map(PathBuf::from)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn pause(term: &Term) {
    let _ = term.write_line(&format!(
        "{}",
        "Press Enter to continue...".yellow().bold()
    ));
    let _ = term.read_line();
}

fn finish(term: &Term, wait: bool) -> Result<(), Box<dyn Error>> {
    if wait {
        term.write_line(&format!("\n{}", "Done. Press Enter to exit.".bold()))?;
        term.read_line()?;
    } else {
        println!("\n{}", "Done.".bold());
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!("{} {}", "✓".green().bold(), "Rename complete!".bold());
    println!(
        "  {} {} files renamed",
        "Renamed:".bright_black(),
        summary.renamed.to_string().green().bold()
    );
    println!(
        "  {} {} files left as they were",
        "Skipped:".bright_black(),
        summary.skipped.to_string().yellow().bold()
    );
    if summary.collisions > 0 {
        println!(
            "  {} {} names needed a counter suffix",
            "Collisions:".bright_black(),
            summary.collisions.to_string().cyan().bold()
        );
    }
    if summary.failed > 0 {
        println!(
            "  {} {} files had errors",
            "Errors:".bright_black(),
            summary.failed.to_string().red().bold()
        );
    }
    if summary.cleanup_warnings > 0 {
        println!(
            "  {} {} temporary folders could not be removed",
            "Warnings:".bright_black(),
            summary.cleanup_warnings.to_string().yellow().bold()
        );
    }
}
