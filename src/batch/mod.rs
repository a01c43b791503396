//! Batch orchestration.
//!
//! Each discovered archive is carried through
//! `Discovered → Unpacked → MetadataExtracted → Named → Renamed` one at a
//! time. Any item may end early as skipped or failed; an item's failure is
//! recorded and the batch moves on to the next file.
//!
//! The unpack directory is removed before the rename is attempted, whether
//! or not metadata was found, so nothing is left behind when a rename fails.
//! A removal failure is only a warning.

mod outcome;

pub use self::outcome::{
    BatchSummary, CleanupWarning, ItemReport, ItemState, ProcessError, RenameOutcome, SkipReason,
};

use crate::archive::{Unpacker, has_incompatible_marker, is_supported_archive};
use crate::cleanup::{RetryPolicy, cleanup_with, remove_tree};
use crate::collision::{self, is_counter_variant};
use crate::config::Options;
use crate::manifest::{self, TrackMetadata};
use crate::naming::compute_name;
use crate::utils::mover::{FileMover, MoveResult};
use std::io;
use std::path::{Path, PathBuf};

pub struct BatchOrchestrator<'a> {
    options: &'a Options,
    unpacker: &'a dyn Unpacker,
    mover: &'a dyn FileMover,
    work_dir: PathBuf,
    cleanup_policy: RetryPolicy,
    remover: fn(&Path) -> io::Result<()>,
}

impl<'a> BatchOrchestrator<'a> {
    /// `work_dir` is where archives are unpacked while their metadata is read.
    pub fn new(
        options: &'a Options,
        unpacker: &'a dyn Unpacker,
        mover: &'a dyn FileMover,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            options,
            unpacker,
            mover,
            work_dir: work_dir.into(),
            cleanup_policy: RetryPolicy::default(),
            remover: remove_tree,
        }
    }

    pub fn with_cleanup_policy(mut self, policy: RetryPolicy) -> Self {
        self.cleanup_policy = policy;
        self
    }

    /// Replace the single-attempt removal used when cleaning up unpack
    /// directories.
    pub fn with_remover(mut self, remover: fn(&Path) -> io::Result<()>) -> Self {
        self.remover = remover;
        self
    }

    /// Process every file in order, handing each report to `on_item` as soon
    /// as it is decided.
    pub fn run(&self, files: &[PathBuf], mut on_item: impl FnMut(&ItemReport)) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for path in files {
            let report = self.process(path);
            summary.record(&report);
            on_item(&report);
        }

        log::info!(
            "Run finished: {} renamed, {} skipped, {} failed",
            summary.renamed,
            summary.skipped,
            summary.failed
        );
        summary
    }

    /// Carry a single archive through the pipeline.
    pub fn process(&self, path: &Path) -> ItemReport {
        log::debug!("{}: discovered", path.display());

        if !is_supported_archive(path) {
            return skipped(path, SkipReason::Unsupported, ItemState::Discovered);
        }
        if has_incompatible_marker(path) {
            return skipped(path, SkipReason::IncompatibleFormat, ItemState::Discovered);
        }

        let unpacked = match self.unpacker.unpack(path, &self.work_dir) {
            Ok(dir) => dir,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                return failed(path, None, ProcessError::Unpack(e), ItemState::Discovered);
            }
        };
        log::debug!("{}: unpacked to {}", path.display(), unpacked.display());
        let state = advance(path, ItemState::Discovered);

        let extracted = manifest::load_track_metadata(&unpacked);
        let cleanup_warning = self.remove_unpacked(&unpacked);

        let mut report = match extracted {
            Ok(Some(metadata)) => self.rename(path, &metadata, advance(path, state)),
            Ok(None) => skipped(path, SkipReason::MetadataAbsent, state),
            Err(e) => {
                log::error!("{}: {e}", path.display());
                failed(path, None, ProcessError::Metadata(e), state)
            }
        };
        report.cleanup_warning = cleanup_warning;
        report
    }

    fn remove_unpacked(&self, dir: &Path) -> Option<CleanupWarning> {
        match cleanup_with(dir, self.cleanup_policy, self.remover) {
            Ok(()) => None,
            Err(error) => {
                let warning = CleanupWarning {
                    path: dir.to_path_buf(),
                    error,
                };
                log::warn!("{warning}");
                Some(warning)
            }
        }
    }

    fn rename(&self, path: &Path, metadata: &TrackMetadata, state: ItemState) -> ItemReport {
        let raw_filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let new_name = compute_name(metadata, self.options, &raw_filename);
        let target = path.with_file_name(&new_name);
        log::debug!("{}: named {new_name}", path.display());
        let state = advance(path, state);

        // A counter suffix from an earlier collision still counts as the
        // canonical name.
        if is_counter_variant(path, &target) {
            log::info!("{raw_filename}: {}", SkipReason::AlreadyNamed);
            return skipped(path, SkipReason::AlreadyNamed, state);
        }

        let (result, target, collided) = match self.mover.move_file(path, &target) {
            MoveResult::AlreadyExists => {
                let resolved = collision::resolve(&target, |p| self.mover.exists(p));
                log::debug!(
                    "{}: {} exists, trying {}",
                    path.display(),
                    target.display(),
                    resolved.display()
                );
                (self.mover.move_file(path, &resolved), resolved, true)
            }
            other => (other, target, false),
        };

        let mut report = match result {
            MoveResult::Success => {
                Self::log_renamed(path, &target, metadata);
                ItemReport::new(
                    RenameOutcome::Renamed {
                        old: path.to_path_buf(),
                        new: target,
                    },
                    advance(path, state),
                )
            }
            MoveResult::AlreadyExists => {
                log::error!("{}: {} already exists", path.display(), target.display());
                failed(path, Some(target.clone()), ProcessError::Collision(target), state)
            }
            MoveResult::OtherError(e) => {
                log::error!("{}: rename to {} failed: {e}", path.display(), target.display());
                failed(path, Some(target), ProcessError::Rename(e), state)
            }
        };
        report.collision_resolved = collided;
        report
    }

    fn log_renamed(old: &Path, new: &Path, metadata: &TrackMetadata) {
        log::info!(
            "Old Filename: {} | New Filename: {} | Artist: {} | Song: {}",
            old.display(),
            new.display(),
            metadata.artist_name,
            metadata.song_name,
        );
        if let Some(author) = &metadata.package_author {
            log::debug!("{}: packaged by {author}", new.display());
        }
    }
}

fn advance(path: &Path, from: ItemState) -> ItemState {
    let to = from.next().unwrap_or(from);
    log::debug!("{}: {from:?} -> {to:?}", path.display());
    to
}

fn skipped(path: &Path, reason: SkipReason, state: ItemState) -> ItemReport {
    log::debug!("{}: skipped ({reason})", path.display());
    ItemReport::new(
        RenameOutcome::Skipped {
            path: path.to_path_buf(),
            reason,
        },
        state,
    )
}

fn failed(path: &Path, attempted_new: Option<PathBuf>, error: ProcessError, state: ItemState) -> ItemReport {
    ItemReport::new(
        RenameOutcome::Failed {
            old: path.to_path_buf(),
            attempted_new,
            error,
        },
        state,
    )
}
