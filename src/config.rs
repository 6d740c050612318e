//! Filter configuration.
//!
//! By default every regular file in the target directory is organized. A TOML
//! file can narrow that down with exclusion rules:
//! - Exact filename matching
//! - Extension matching (compared against the classification key)
//! - Glob pattern matching
//! - Regex pattern matching
//! - Include patterns that override every exclusion
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! skip_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! extensions = ["part", "crdownload"]
//! patterns = ["*.tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::classify::ClassificationKey;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file is not valid TOML or does not match the expected structure.
    #[error("invalid configuration in {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("failed to read configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filters: FilterRules,
}

/// Filter rules applied to each regular file before it is classified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Leave files whose name starts with "." in place. Defaults to false.
    #[serde(default)]
    pub skip_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist that overrides every exclusion.
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for leaving files in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g. "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, case-insensitive, without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Loads configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided (it must exist)
    /// 2. `~/.config/tidyext/config.toml`
    /// 3. Built-in defaults (no filters)
    ///
    /// The target directory is never searched: a config file living there
    /// would itself be sorted into `toml/`.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        if let Some(home_config) = Self::user_config_path()
            && home_config.is_file()
        {
            return Self::load_from_file(&home_config);
        }

        Ok(Self::default())
    }

    /// Returns the per-user configuration path, if `HOME` is set.
    pub fn user_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("tidyext")
                .join("config.toml"),
        )
    }

    /// Loads configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "loaded configuration");

        toml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Compiles the filter rules for matching.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

/// Filter rules with every pattern pre-compiled.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    skip_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                pattern: pattern.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden_files: rules.skip_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Returns true if the file should be organized.
    ///
    /// Include patterns win over everything. Otherwise the file is left in
    /// place if it is hidden (when enabled), or matches an excluded filename,
    /// extension, glob or regex.
    pub fn should_include(&self, file_name: &str, key: &ClassificationKey) -> bool {
        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return true;
        }

        if self.skip_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        if !key.is_no_extension() && self.exclude_extensions.contains(key.as_str()) {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(file_name))
    }

    /// Returns true if no rule can ever exclude a file.
    pub fn is_empty(&self) -> bool {
        !self.skip_hidden_files
            && self.exclude_filenames.is_empty()
            && self.exclude_extensions.is_empty()
            && self.exclude_patterns.is_empty()
            && self.exclude_regexes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn includes(filters: &CompiledFilters, name: &str) -> bool {
        filters.should_include(name, &ClassificationKey::from_file_name(name))
    }

    fn compile(rules: FilterRules) -> CompiledFilters {
        Config { filters: rules }.compile().unwrap()
    }

    #[test]
    fn test_default_config_includes_everything() {
        let compiled = Config::default().compile().unwrap();
        assert!(compiled.is_empty());
        assert!(includes(&compiled, ".env"));
        assert!(includes(&compiled, "report.pdf"));
        assert!(includes(&compiled, "noext"));
    }

    #[test]
    fn test_skip_hidden_files() {
        let compiled = compile(FilterRules {
            skip_hidden_files: true,
            ..Default::default()
        });

        assert!(!includes(&compiled, ".DS_Store"));
        assert!(includes(&compiled, "visible.txt"));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                filenames: vec!["Thumbs.db".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!includes(&compiled, "Thumbs.db"));
        assert!(includes(&compiled, "thumbs.db"));
    }

    #[test]
    fn test_exclude_extensions_case_insensitive() {
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                extensions: vec!["part".to_string(), ".TMP".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!includes(&compiled, "movie.mkv.part"));
        assert!(!includes(&compiled, "scratch.tmp"));
        assert!(!includes(&compiled, "SCRATCH.TMP"));
        assert!(includes(&compiled, "movie.mkv"));
    }

    #[test]
    fn test_exclude_extension_ignores_dotfile_name() {
        // ".part" has no extension, so an excluded "part" extension does not apply
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                extensions: vec!["part".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(includes(&compiled, ".part"));
    }

    #[test]
    fn test_exclude_glob_and_regex() {
        let compiled = compile(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["~$*".to_string()],
                regex: vec![r"^draft_\d+\.".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!includes(&compiled, "~$budget.xlsx"));
        assert!(!includes(&compiled, "draft_12.docx"));
        assert!(includes(&compiled, "draft.docx"));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let compiled = compile(FilterRules {
            skip_hidden_files: true,
            exclude: ExcludeRules {
                extensions: vec!["log".to_string()],
                ..Default::default()
            },
            include: IncludeRules {
                patterns: vec![".env".to_string(), "keep-*.log".to_string()],
            },
        });

        assert!(includes(&compiled, ".env"));
        assert!(includes(&compiled, "keep-this.log"));
        assert!(!includes(&compiled, ".other"));
        assert!(!includes(&compiled, "server.log"));
    }

    #[test]
    fn test_invalid_patterns_return_errors() {
        let bad_regex = Config {
            filters: FilterRules {
                exclude: ExcludeRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        assert!(matches!(
            bad_regex.compile(),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));

        let bad_glob = Config {
            filters: FilterRules {
                exclude: ExcludeRules {
                    patterns: vec!["[invalid".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        assert!(matches!(
            bad_glob.compile(),
            Err(ConfigError::InvalidGlobPattern { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[filters]
skip_hidden_files = true

[filters.exclude]
extensions = ["bak"]
"#,
        )
        .expect("Failed to write config");

        let config = Config::load(Some(&path)).expect("Failed to load config");
        assert!(config.filters.skip_hidden_files);
        assert_eq!(config.filters.exclude.extensions, vec!["bak".to_string()]);
        assert!(config.filters.include.patterns.is_empty());
    }

    #[test]
    fn test_load_empty_file_gives_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "").expect("Failed to write config");

        let config = Config::load(Some(&path)).expect("Failed to load config");
        assert!(config.compile().unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/non/existent/config.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[filters\nskip_hidden_files = maybe").expect("Failed to write config");

        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
