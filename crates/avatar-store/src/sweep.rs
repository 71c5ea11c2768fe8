//! Orphan sweep: remove avatar files no user record points at.
//!
//! An upload writes its file before the record points at it, so a file that
//! looks unreferenced may belong to a request still in flight. Files newer
//! than [`SweepOptions::min_age`] are left alone for that reason.

use std::collections::HashSet;
use std::fs;
use std::time::Duration;

use avatar_core::Result;
use walkdir::WalkDir;

use crate::path::{self, AVATAR_DIR};
use crate::AvatarStore;

/// Grace window applied by the `sweep` command unless overridden.
pub const DEFAULT_MIN_AGE: Duration = Duration::from_secs(300);

/// How [`AvatarStore::sweep_orphans`] treats the files it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Report orphans without deleting them.
    pub dry_run: bool,
    /// Unreferenced files modified more recently than this are kept.
    pub min_age: Duration,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            min_age: DEFAULT_MIN_AGE,
        }
    }
}

/// Outcome of [`AvatarStore::sweep_orphans`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of files inspected.
    pub scanned: usize,
    /// Relative paths removed (or that would be removed on a dry run).
    pub removed: Vec<String>,
    /// Relative paths that could not be removed.
    pub failed: Vec<String>,
    /// Unreferenced files kept because they are younger than the grace window.
    pub skipped_recent: usize,
}

impl AvatarStore {
    /// Remove every file under `avatars/` whose relative path is not in
    /// `referenced`.
    ///
    /// With `dry_run` set nothing is deleted; the report lists what would
    /// have been removed. Files younger than `min_age`, or whose modification
    /// time cannot be read, are skipped. Empty per-user directories are
    /// pruned afterwards.
    pub fn sweep_orphans(
        &self,
        referenced: &HashSet<String>,
        options: SweepOptions,
    ) -> Result<SweepReport> {
        let SweepOptions { dry_run, min_age } = options;
        let avatar_root = self.root().join(AVATAR_DIR);
        let mut report = SweepReport::default();
        if !avatar_root.is_dir() {
            return Ok(report);
        }

        for entry in WalkDir::new(&avatar_root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry during sweep: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            report.scanned += 1;
            let Some(relative) = path::relativize(self.root(), entry.path()) else {
                tracing::warn!("Skipping non-UTF-8 path {}", entry.path().display());
                continue;
            };
            if referenced.contains(&relative) {
                continue;
            }
            if !old_enough(&entry, min_age) {
                tracing::debug!(path = %relative, "Keeping recent unreferenced avatar");
                report.skipped_recent += 1;
                continue;
            }

            if dry_run {
                tracing::info!(path = %relative, "Would remove orphaned avatar");
                report.removed.push(relative);
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    tracing::info!(path = %relative, "Removed orphaned avatar");
                    report.removed.push(relative);
                }
                Err(e) => {
                    tracing::warn!(path = %relative, "Failed to remove orphaned avatar: {e}");
                    report.failed.push(relative);
                }
            }
        }

        if !dry_run {
            prune_empty_dirs(&avatar_root);
        }

        Ok(report)
    }
}

fn old_enough(entry: &walkdir::DirEntry, min_age: Duration) -> bool {
    if min_age.is_zero() {
        return true;
    }
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age >= min_age)
}

/// Remove empty user directories below `avatar_root`. Errors are ignored;
/// a directory that is not empty simply stays.
fn prune_empty_dirs(avatar_root: &std::path::Path) {
    for entry in WalkDir::new(avatar_root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
    {
        let _ = fs::remove_dir(entry.path());
    }
}
