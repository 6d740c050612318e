/// Sorting of a directory's files into per-extension subdirectories.
///
/// [`DirectoryOrganizer`] lists the direct children of its target directory,
/// classifies every regular file by extension, and moves it into
/// `<target>/<key>/<original name>`. Subdirectories are never entered, so a
/// second run over an organized directory does nothing.
///
/// A run aborts on the first I/O error. Moves that already happened are not
/// rolled back, but files set aside under a staging name get their original
/// name back.
use crate::classify::ClassificationKey;
use crate::config::CompiledFilters;
use crate::error::{OrganizeError, OrganizeResult};
use crate::notify::{ConsoleReporter, MoveEvent, MoveNotifier};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A regular file and the container it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// Location of the file at listing time.
    pub source: PathBuf,
    /// File name for display (lossy UTF-8).
    pub file_name: String,
    pub key: ClassificationKey,
    raw_name: OsString,
    container: PathBuf,
    staged: Option<PathBuf>,
}

impl PlannedMove {
    /// The directory the file is moved into.
    pub fn destination_container(&self) -> &Path {
        &self.container
    }

    /// The final path of the file, keeping its original name.
    pub fn destination(&self) -> PathBuf {
        self.container.join(&self.raw_name)
    }

    fn current_location(&self) -> &Path {
        self.staged.as_deref().unwrap_or(&self.source)
    }
}

/// Classifies and moves the files of one directory.
#[derive(Debug, Clone)]
pub struct DirectoryOrganizer {
    target: PathBuf,
    filters: CompiledFilters,
}

impl DirectoryOrganizer {
    /// Creates an organizer for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidTarget`] if the path does not exist or
    /// is not a directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidyext::DirectoryOrganizer;
    ///
    /// let organizer = DirectoryOrganizer::new("/home/user/Downloads")?;
    /// organizer.organize()?;
    /// # Ok::<(), tidyext::OrganizeError>(())
    /// ```
    pub fn new(path: impl AsRef<Path>) -> OrganizeResult<Self> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(Self {
                target: path.to_path_buf(),
                filters: CompiledFilters::default(),
            }),
            Ok(_) => Err(OrganizeError::InvalidTarget {
                path: path.to_path_buf(),
                reason: "not a directory".to_string(),
            }),
            Err(e) => Err(OrganizeError::InvalidTarget {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    /// Leaves files rejected by `filters` in place.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Lists the regular files of the target directory with their keys.
    ///
    /// The result follows the listing order of the platform, which is
    /// unspecified. Nothing on disk is changed.
    pub fn plan(&self) -> OrganizeResult<Vec<PlannedMove>> {
        let read_err = |source| OrganizeError::ReadDir {
            path: self.target.clone(),
            source,
        };

        let mut plan = Vec::new();
        for entry in fs::read_dir(&self.target).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();

            // Symlinks count as files when they point at one.
            if !fs::metadata(&path).is_ok_and(|meta| meta.is_file()) {
                tracing::debug!(path = %path.display(), "skipping non-file entry");
                continue;
            }

            let raw_name = entry.file_name();
            let file_name = raw_name.to_string_lossy().into_owned();
            let key = ClassificationKey::from_file_name(&raw_name);

            if !self.filters.is_empty() && !self.filters.should_include(&file_name, &key) {
                tracing::debug!(file = %file_name, "excluded by filters");
                continue;
            }

            plan.push(PlannedMove {
                container: self.target.join(key.as_str()),
                source: path,
                file_name,
                key,
                raw_name,
                staged: None,
            });
        }

        Ok(plan)
    }

    /// Organizes the target directory, printing one line per moved file.
    pub fn organize(&self) -> OrganizeResult<()> {
        let mut reporter = ConsoleReporter::new(false);
        self.organize_with(&mut reporter)?;
        reporter.finish();
        Ok(())
    }

    /// Organizes the target directory, reporting moves to `notifier`.
    pub fn organize_with(&self, notifier: &mut dyn MoveNotifier) -> OrganizeResult<()> {
        let plan = self.plan()?;
        self.apply(plan, notifier).map(|_| ())
    }

    /// Performs a plan produced by [`plan`](Self::plan).
    ///
    /// Returns the number of files moved.
    pub fn apply(
        &self,
        mut plan: Vec<PlannedMove>,
        notifier: &mut dyn MoveNotifier,
    ) -> OrganizeResult<usize> {
        tracing::info!(target_dir = %self.target.display(), files = plan.len(), "organizing");

        let result = check_containers(&plan)
            .and_then(|()| self.stage_blockers(&mut plan))
            .and_then(|()| self.move_all(&plan, notifier));

        match &result {
            Ok(moved) => tracing::info!(moved, "organize complete"),
            Err(e) => {
                tracing::warn!(error = %e, "aborting organize run");
                unstage(&plan);
            }
        }
        result
    }

    /// Moves aside files whose own name is needed as a container name.
    ///
    /// A file called `pdf` sitting next to `report.pdf` would otherwise block
    /// the `pdf` directory, depending on which one the listing yields first.
    fn stage_blockers(&self, plan: &mut [PlannedMove]) -> OrganizeResult<()> {
        let containers: HashSet<OsString> = plan
            .iter()
            .map(|planned| OsString::from(planned.key.as_str()))
            .collect();

        for planned in plan.iter_mut() {
            if !containers.contains(&planned.raw_name) {
                continue;
            }

            let staged = self.staging_path(&planned.raw_name);
            fs::rename(&planned.source, &staged).map_err(|source| OrganizeError::Staging {
                path: planned.source.clone(),
                staged: staged.clone(),
                source,
            })?;
            tracing::debug!(
                file = %planned.file_name,
                staged = %staged.display(),
                "staged file blocking its container name"
            );
            planned.staged = Some(staged);
        }

        Ok(())
    }

    fn staging_path(&self, name: &OsStr) -> PathBuf {
        let mut base = OsString::from(".tidyext-staging.");
        base.push(name);

        let mut candidate = self.target.join(&base);
        let mut attempt = 1u32;
        while fs::symlink_metadata(&candidate).is_ok() {
            let mut numbered = base.clone();
            numbered.push(format!(".{attempt}"));
            candidate = self.target.join(numbered);
            attempt += 1;
        }
        candidate
    }

    fn move_all(
        &self,
        plan: &[PlannedMove],
        notifier: &mut dyn MoveNotifier,
    ) -> OrganizeResult<usize> {
        let mut ready: HashSet<&Path> = HashSet::new();

        for planned in plan {
            if !ready.contains(planned.container.as_path()) {
                ensure_container(&planned.container)?;
                ready.insert(planned.container.as_path());
            }

            let from = planned.current_location();
            let to = planned.destination();
            // rename replaces an existing file of the same name
            fs::rename(from, &to).map_err(|source| OrganizeError::MoveFailed {
                from: from.to_path_buf(),
                to: to.clone(),
                source,
            })?;

            notifier.moved(&MoveEvent {
                file_name: planned.file_name.clone(),
                from: planned.source.clone(),
                to,
                container: planned.container.clone(),
            });
        }

        Ok(plan.len())
    }
}

/// Fails if a container path is taken by something that will not be staged.
///
/// Runs before any rename so an aborted run never leaves staged files behind
/// for this reason.
fn check_containers(plan: &[PlannedMove]) -> OrganizeResult<()> {
    let staged_names: HashSet<&OsStr> = plan.iter().map(|p| p.raw_name.as_os_str()).collect();

    let mut checked: HashSet<&Path> = HashSet::new();
    for planned in plan {
        if !checked.insert(planned.container.as_path()) {
            continue;
        }
        let is_blocked = fs::metadata(&planned.container).is_ok_and(|meta| !meta.is_dir());
        if is_blocked && !staged_names.contains(OsStr::new(planned.key.as_str())) {
            return Err(OrganizeError::ContainerBlocked {
                path: planned.container.clone(),
            });
        }
    }
    Ok(())
}

/// Gives staged files that were not moved their original name back.
///
/// If the original path has meanwhile become a container with files in it,
/// the file goes to its own container instead, still under its own name.
fn unstage(plan: &[PlannedMove]) {
    for planned in plan {
        let Some(staged) = &planned.staged else {
            continue;
        };
        if fs::symlink_metadata(staged).is_err() {
            continue;
        }

        if fs::metadata(&planned.source).is_ok_and(|meta| meta.is_dir()) {
            // only succeeds when nothing was moved into it yet
            let _ = fs::remove_dir(&planned.source);
        }

        let restored = fs::rename(staged, &planned.source)
            .map(|()| planned.source.clone())
            .or_else(|_| {
                let destination = planned.destination();
                ensure_container(&planned.container)
                    .map_err(|e| io::Error::other(e.to_string()))?;
                fs::rename(staged, &destination).map(|()| destination)
            });

        match restored {
            Ok(path) => tracing::debug!(
                file = %planned.file_name,
                restored = %path.display(),
                "restored staged file"
            ),
            Err(e) => tracing::error!(
                file = %planned.file_name,
                staged = %staged.display(),
                error = %e,
                "could not restore staged file"
            ),
        }
    }
}

/// Creates `path` as a directory unless one is already there.
fn ensure_container(path: &Path) -> OrganizeResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(OrganizeError::ContainerBlocked {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir(path).map_err(|source| OrganizeError::ContainerCreation {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "created container");
            Ok(())
        }
        Err(source) => Err(OrganizeError::ContainerCreation {
            path: path.to_path_buf(),
            source,
        }),
    }
}
