//! tidyext - sort a directory's files into subdirectories by extension
//!
//! Every regular file directly under the target directory is moved to
//! `<target>/<extension>/<name>`. Extensions are lowercased; files without
//! one go to `no_extension/`. Subdirectories are left alone, so running the
//! organizer again is a no-op.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod organizer;

pub use classify::{ClassificationKey, NO_EXTENSION};
pub use config::{CompiledFilters, Config, ConfigError};
pub use error::{OrganizeError, OrganizeResult};
pub use notify::{ConsoleReporter, MoveEvent, MoveNotifier};
pub use organizer::{DirectoryOrganizer, PlannedMove};

pub use cli::{Cli, run};
