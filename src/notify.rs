//! Per-file notifications and console output.
//!
//! The organizer reports each completed move to a [`MoveNotifier`]. The CLI
//! uses [`ConsoleReporter`], which prints one line per move, optionally
//! drives a progress bar, and prints a summary table at the end.

use crate::organizer::PlannedMove;
use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A file that was moved into its destination container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEvent {
    /// Original file name, unchanged by the move.
    pub file_name: String,
    /// Where the file was before the move.
    pub from: PathBuf,
    /// Where the file is now.
    pub to: PathBuf,
    /// The destination container directory.
    pub container: PathBuf,
}

/// Receives one notification per moved file.
pub trait MoveNotifier {
    fn moved(&mut self, event: &MoveEvent);
}

impl MoveNotifier for Vec<MoveEvent> {
    fn moved(&mut self, event: &MoveEvent) {
        self.push(event.clone());
    }
}

/// Formats the notification line for a move.
pub fn move_line(event: &MoveEvent) -> String {
    format!(
        "Moved: {} -> {}",
        event.file_name,
        event.container.display()
    )
}

/// Console sink for organize runs.
pub struct ConsoleReporter {
    quiet: bool,
    progress: Option<ProgressBar>,
    counts: BTreeMap<String, usize>,
}

impl ConsoleReporter {
    /// Creates a reporter that prints a line per move.
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            progress: None,
            counts: BTreeMap::new(),
        }
    }

    /// Adds a progress bar sized for `total` moves.
    ///
    /// The bar draws to stdout, above which the per-file lines are printed. It
    /// stays hidden when stdout is not a terminal.
    pub fn with_progress(mut self, total: u64) -> Self {
        if !self.quiet && total > 0 {
            self.progress = Some(create_progress_bar(total));
        }
        self
    }

    /// Number of files reported so far.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Finishes the progress bar and prints the summary table.
    pub fn finish(self) {
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        if self.quiet {
            return;
        }
        if self.total() == 0 {
            info("No files to organize.");
            return;
        }
        summary_table(&self.counts);
    }

    fn print_line(&self, line: &str) {
        match &self.progress {
            Some(pb) if !pb.is_hidden() => pb.println(line),
            _ => println!("{}", line),
        }
    }
}

impl MoveNotifier for ConsoleReporter {
    fn moved(&mut self, event: &MoveEvent) {
        let container = event
            .container
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        *self.counts.entry(container).or_insert(0) += 1;

        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
        if !self.quiet {
            self.print_line(&format!("{} {}", "✓".green(), move_line(event)));
        }
    }
}

/// Prints the moves a plan would perform without touching the disk.
pub fn dry_run_report(plan: &[PlannedMove], quiet: bool) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for planned in plan {
        *counts.entry(planned.key.to_string()).or_insert(0) += 1;
        if !quiet {
            dry_run_notice(&format!(
                "Would move: {} -> {}",
                planned.file_name,
                planned.destination_container().display()
            ));
        }
    }

    if quiet {
        return;
    }
    if counts.is_empty() {
        info("No files to organize.");
        return;
    }
    summary_table(&counts);
    info("Dry run complete. No files were modified.");
}

/// Prints an error message in red with an X mark.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn info(message: &str) {
    println!("{}", message.cyan());
}

pub fn header(header: &str) {
    println!("\n{}", header.bold());
}

pub fn dry_run_notice(message: &str) {
    println!("{}", format!("[DRY RUN] {}", message).yellow());
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stdout());
    let style = ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    pb.set_style(style);
    pb
}

/// Prints a table of file counts per container.
pub fn summary_table(counts: &BTreeMap<String, usize>) {
    header("SUMMARY");

    let total: usize = counts.values().sum();
    let width = counts.keys().map(|name| name.len()).max().unwrap_or(0).max(9); // "Directory"

    println!(
        "{:<width$} | {}",
        "Directory".bold(),
        "Files".bold(),
        width = width
    );
    println!("{}", "-".repeat(width + 10));

    for (container, count) in counts {
        println!(
            "{:<width$} | {} {}",
            container,
            count.to_string().green(),
            plural(*count),
            width = width
        );
    }

    println!("{}", "-".repeat(width + 10));
    println!(
        "{:<width$} | {} {}",
        "Total".bold(),
        total.to_string().green().bold(),
        plural(total),
        width = width
    );
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
