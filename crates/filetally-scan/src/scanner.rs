//! Rayon-backed directory traversal that tallies files by type.

use std::fs::{self, DirEntry, Metadata};
use std::path::{Path, PathBuf};
use std::time::Instant;

use jwalk::{Parallelism, WalkDir};
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use filetally_core::{
    AnalysisConfig, AnalysisState, FileTypeKey, Filters, ScanError, ScanWarning, Snapshot,
    VCS_DIR_NAME, WarningKind, classify, is_hidden_name,
};

use crate::visited::{DirIdentity, VisitedSet};

/// Worker thread stack size. Traversal recurses once per directory level.
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Traversal engine that walks a tree once and aggregates per-type stats.
///
/// Each directory is listed by one worker; when a directory has several
/// subdirectories and more than one worker is configured, the subtrees are
/// handed to the pool and the parent waits for all of them before it is
/// done. The pool's work-stealing deques hold pending subtrees, so a wide
/// tree never creates more threads than configured.
pub struct TypeScanner {
    config: AnalysisConfig,
    filters: Filters,
    pool: ThreadPool,
    workers: usize,
    state: AnalysisState,
}

impl TypeScanner {
    /// Create a scanner, compiling filters and building the worker pool.
    pub fn new(config: AnalysisConfig) -> Result<Self, ScanError> {
        if config.size_threshold.min() > config.size_threshold.max() {
            return Err(ScanError::InvalidThreshold {
                min: config.size_threshold.min(),
                max: config.size_threshold.max(),
            });
        }

        let filters = Filters::from_config(&config)?;
        let workers = match config.threads {
            0 => num_cpus::get().max(1),
            n => n,
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .stack_size(WORKER_STACK_SIZE)
            .thread_name(|i| format!("filetally-worker-{i}"))
            .build()
            .map_err(|e| ScanError::InvalidConfig {
                message: format!("cannot start worker pool: {e}"),
            })?;

        Ok(Self {
            config,
            filters,
            pool,
            workers,
            state: AnalysisState::new(),
        })
    }

    /// Number of worker threads traversal runs on.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Live statistics of the most recent run.
    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    /// Analyze the configured root and return a sorted snapshot.
    ///
    /// Statistics are reset at the start of every call. Fatal errors
    /// (invalid root, counter overflow) abort the run and no snapshot is
    /// produced; unreadable entries are logged, collected as warnings and
    /// skipped.
    pub fn analyze(&mut self) -> Result<Snapshot, ScanError> {
        let start = Instant::now();
        self.state.reset();

        let root = &self.config.root;
        let root_path = root.canonicalize().map_err(|e| ScanError::io(root, e))?;
        let root_metadata = fs::metadata(&root_path).map_err(|e| ScanError::io(&root_path, e))?;
        if !root_metadata.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let run = Run {
            filters: &self.filters,
            state: &self.state,
            visited: VisitedSet::new(),
            warnings: Mutex::new(Vec::new()),
            parallel: self.workers > 1,
            follow_symlinks: self.config.follow_symlinks,
        };

        debug!(root = %root_path.display(), workers = self.workers, "starting analysis");
        let root_identity = DirIdentity::resolve(&root_path, &root_metadata);
        self.pool
            .install(|| run.visit_dir(&root_path, root_identity))?;

        let visited_dirs = run.visited.claimed();
        let warnings = run.warnings.into_inner();
        let scan_duration = start.elapsed();

        info!(
            files = self.state.total_files(),
            bytes = self.state.total_bytes(),
            hidden = self.state.hidden_files(),
            dirs = visited_dirs,
            warnings = warnings.len(),
            elapsed_ms = scan_duration.as_millis() as u64,
            "analysis complete"
        );

        Ok(Snapshot::from_state(
            &self.state,
            root_path,
            self.filters.show_hidden,
            scan_duration,
            warnings,
        ))
    }
}

/// A subdirectory queued for traversal.
struct SubdirTask {
    path: PathBuf,
    identity: DirIdentity,
}

/// Shared context for one traversal.
struct Run<'a> {
    filters: &'a Filters,
    state: &'a AnalysisState,
    visited: VisitedSet,
    warnings: Mutex<Vec<ScanWarning>>,
    parallel: bool,
    follow_symlinks: bool,
}

impl Run<'_> {
    /// Traverse one directory and, transitively, its subtree.
    ///
    /// Returns once every file has been folded in and every subtree task
    /// has finished.
    fn visit_dir(&self, dir: &Path, identity: DirIdentity) -> Result<(), ScanError> {
        if !self.visited.claim(identity) {
            debug!(path = %dir.display(), "directory already visited");
            return Ok(());
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                self.warn(ScanWarning::read_error(dir, &err));
                return Ok(());
            }
        };

        let mut subdirs = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => self.visit_entry(&entry, &mut subdirs)?,
                Err(err) => self.warn(ScanWarning::read_error(dir, &err)),
            }
        }

        self.dispatch(subdirs)
    }

    /// Run queued subtrees, fanning out only when it pays off.
    fn dispatch(&self, subdirs: Vec<SubdirTask>) -> Result<(), ScanError> {
        if self.parallel && subdirs.len() > 1 {
            subdirs
                .into_par_iter()
                .try_for_each(|task| self.visit_dir(&task.path, task.identity))
        } else {
            for task in subdirs {
                self.visit_dir(&task.path, task.identity)?;
            }
            Ok(())
        }
    }

    fn visit_entry(&self, entry: &DirEntry, subdirs: &mut Vec<SubdirTask>) -> Result<(), ScanError> {
        let path = entry.path();
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        if self.filters.should_skip_entry(&path, &name) {
            debug!(path = %path.display(), "excluded");
            return Ok(());
        }

        let Some(metadata) = self.entry_metadata(entry, &path) else {
            return Ok(());
        };

        if metadata.is_dir() {
            let identity = DirIdentity::resolve(&path, &metadata);
            if name == VCS_DIR_NAME {
                return self.record_vcs_blob(&path, identity);
            }
            subdirs.push(SubdirTask { path, identity });
        } else if metadata.is_file() {
            self.record_file(&path, &name, metadata.len())?;
        }
        Ok(())
    }

    /// Metadata for an entry, following symlinks when configured.
    ///
    /// Returns `None` for entries that should be skipped; failures are
    /// recorded as warnings.
    fn entry_metadata(&self, entry: &DirEntry, path: &Path) -> Option<Metadata> {
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                self.warn(ScanWarning::metadata_error(path, &err));
                return None;
            }
        };

        if file_type.is_symlink() {
            if !self.follow_symlinks {
                return None;
            }
            return match fs::metadata(path) {
                Ok(metadata) => Some(metadata),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    self.warn(ScanWarning::broken_symlink(path));
                    None
                }
                Err(err) => {
                    self.warn(ScanWarning::metadata_error(path, &err));
                    None
                }
            };
        }

        if !file_type.is_dir() && !file_type.is_file() {
            return None;
        }

        match entry.metadata() {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                self.warn(ScanWarning::metadata_error(path, &err));
                None
            }
        }
    }

    /// Apply size, type and hidden-file rules to one regular file.
    fn record_file(&self, path: &Path, name: &str, size: u64) -> Result<(), ScanError> {
        if !self.filters.within_size(size) {
            return Ok(());
        }

        let key = classify(path);
        if !self.filters.included(&key) {
            return Ok(());
        }

        if is_hidden_name(name) && !self.filters.show_hidden {
            self.state.record_hidden(size)
        } else {
            self.state.record_visible(key, size)
        }
    }

    /// Size a version-control directory as one opaque blob.
    fn record_vcs_blob(&self, path: &Path, identity: DirIdentity) -> Result<(), ScanError> {
        if !self.visited.claim(identity) {
            return Ok(());
        }

        let size = self.directory_size(path)?;
        debug!(path = %path.display(), size, "sized version-control directory");

        if self.filters.show_hidden {
            self.state.record_visible(FileTypeKey::VcsMetadata, size)
        } else {
            self.state.record_hidden(size)
        }
    }

    /// Total length of all regular files below `dir`.
    fn directory_size(&self, dir: &Path) -> Result<u64, ScanError> {
        let walker = WalkDir::new(dir)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false);

        let mut total: u64 = 0;
        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_else(|| dir.to_path_buf());
                    self.warn(ScanWarning::new(path, err.to_string(), WarningKind::ReadError));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.metadata() {
                Ok(metadata) => {
                    total = total
                        .checked_add(metadata.len())
                        .ok_or(ScanError::CounterOverflow {
                            counter: "Directory size",
                        })?;
                }
                Err(err) => {
                    self.warn(ScanWarning::new(
                        entry.path(),
                        err.to_string(),
                        WarningKind::MetadataError,
                    ));
                }
            }
        }
        Ok(total)
    }

    fn warn(&self, warning: ScanWarning) {
        warn!("{}", warning.message);
        self.warnings.lock().push(warning);
    }
}
