//! Per-item outcomes and the batch summary.

use crate::archive::ArchiveError;
use crate::manifest::MetadataError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Where an item got to before it reached a terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Discovered,
    Unpacked,
    MetadataExtracted,
    Named,
    Renamed,
}

impl ItemState {
    /// The state that follows on the way to a successful rename.
    pub fn next(self) -> Option<Self> {
        match self {
            ItemState::Discovered => Some(ItemState::Unpacked),
            ItemState::Unpacked => Some(ItemState::MetadataExtracted),
            ItemState::MetadataExtracted => Some(ItemState::Named),
            ItemState::Named => Some(ItemState::Renamed),
            ItemState::Renamed => None,
        }
    }
}

/// Failures that stop a single item. None of them stop the batch.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("could not unpack archive: {0}")]
    Unpack(#[source] ArchiveError),
    #[error("could not read metadata: {0}")]
    Metadata(#[source] MetadataError),
    #[error("rename failed: {0}")]
    Rename(#[source] io::Error),
    #[error("{} already exists", .0.display())]
    Collision(PathBuf),
}

impl ProcessError {
    /// Unpack and metadata failures, as opposed to rename failures.
    pub fn is_extraction(&self) -> bool {
        matches!(self, ProcessError::Unpack(_) | ProcessError::Metadata(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Wrong extension or magic bytes.
    Unsupported,
    /// Path carries an incompatible-format marker.
    IncompatibleFormat,
    /// No manifest, or a manifest without entries.
    MetadataAbsent,
    /// The file already has its canonical name.
    AlreadyNamed,
}

impl SkipReason {
    /// Skips that happen before any metadata is known go unreported.
    pub fn is_silent(self) -> bool {
        !matches!(self, SkipReason::AlreadyNamed)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Unsupported => "not a supported archive",
            SkipReason::IncompatibleFormat => "incompatible archive format",
            SkipReason::MetadataAbsent => "no song metadata found",
            SkipReason::AlreadyNamed => "already has the canonical name",
        };
        f.write_str(text)
    }
}

#[derive(Debug)]
pub enum RenameOutcome {
    Renamed {
        old: PathBuf,
        new: PathBuf,
    },
    Skipped {
        path: PathBuf,
        reason: SkipReason,
    },
    Failed {
        old: PathBuf,
        attempted_new: Option<PathBuf>,
        error: ProcessError,
    },
}

/// Removing the unpack directory failed after all retries.
#[derive(Debug, Error)]
#[error("could not remove {}: {error}", .path.display())]
pub struct CleanupWarning {
    pub path: PathBuf,
    #[source]
    pub error: io::Error,
}

#[derive(Debug)]
pub struct ItemReport {
    pub outcome: RenameOutcome,
    /// Last state reached before the outcome was decided.
    pub state: ItemState,
    pub cleanup_warning: Option<CleanupWarning>,
    /// The first rename attempt collided and a counter suffix was used.
    pub collision_resolved: bool,
}

impl ItemReport {
    pub(crate) fn new(outcome: RenameOutcome, state: ItemState) -> Self {
        Self {
            outcome,
            state,
            cleanup_warning: None,
            collision_resolved: false,
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(&self.outcome, RenameOutcome::Skipped { reason, .. } if reason.is_silent())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, RenameOutcome::Failed { .. })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub renamed: u32,
    pub skipped: u32,
    pub failed: u32,
    pub collisions: u32,
    pub cleanup_warnings: u32,
}

impl BatchSummary {
    pub fn record(&mut self, report: &ItemReport) {
        match report.outcome {
            RenameOutcome::Renamed { .. } => self.renamed += 1,
            RenameOutcome::Skipped { .. } => self.skipped += 1,
            RenameOutcome::Failed { .. } => self.failed += 1,
        }
        if report.collision_resolved {
            self.collisions += 1;
        }
        if report.cleanup_warning.is_some() {
            self.cleanup_warnings += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.renamed + self.skipped + self.failed
    }
}
