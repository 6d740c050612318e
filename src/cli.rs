//! Command-line interface for tidyext.
//!
//! Parses arguments, loads the filter configuration, and drives either a
//! real organize run or a dry run over the target directory.

use crate::config::Config;
use crate::error::OrganizeResult;
use crate::notify::{self, ConsoleReporter};
use crate::organizer::DirectoryOrganizer;
use clap::Parser;
use std::path::PathBuf;

/// Organize files by extension.
#[derive(Debug, Clone, Parser)]
#[command(name = "tidyext", version, about)]
pub struct Cli {
    /// Path to the directory to organize
    pub directory: PathBuf,

    /// Show what would be moved without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Load filter rules from this TOML file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress per-file output and the summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs one invocation of the CLI.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use tidyext::cli::{Cli, run};
///
/// let cli = Cli::parse_from(["tidyext", "/path/to/directory", "--dry-run"]);
/// if let Err(e) = run(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run(cli: &Cli) -> OrganizeResult<()> {
    let organizer = DirectoryOrganizer::new(&cli.directory)?;
    let filters = Config::load(cli.config.as_deref())?.compile()?;
    let organizer = organizer.with_filters(filters);

    let plan = organizer.plan()?;

    if cli.dry_run {
        if !cli.quiet {
            notify::info(&format!(
                "DRY RUN: analyzing contents of {}",
                organizer.target().display()
            ));
        }
        notify::dry_run_report(&plan, cli.quiet);
        return Ok(());
    }

    if !cli.quiet {
        notify::info(&format!(
            "Organizing contents of {}",
            organizer.target().display()
        ));
    }

    let mut reporter = ConsoleReporter::new(cli.quiet).with_progress(plan.len() as u64);
    organizer.apply(plan, &mut reporter)?;
    reporter.finish();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_directory_only() {
        let cli = Cli::parse_from(["tidyext", "/tmp/downloads"]);
        assert_eq!(cli.directory, PathBuf::from("/tmp/downloads"));
        assert!(!cli.dry_run);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "tidyext",
            "-n",
            "--config",
            "rules.toml",
            "--quiet",
            "-v",
            "dir",
        ]);
        assert!(cli.dry_run);
        assert!(cli.quiet);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("rules.toml")));
    }

    #[test]
    fn test_directory_is_required() {
        assert!(Cli::try_parse_from(["tidyext"]).is_err());
    }
}
