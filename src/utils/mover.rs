//! File move primitive that never overwrites.
//!
//! `std::fs::rename` silently replaces an existing destination on Unix, so
//! moves go through a hard link first: linking fails with `AlreadyExists`
//! atomically if the destination is taken, and only then is the source
//! unlinked. Filesystems without hard links (FAT, exFAT, some network
//! shares) fall back to an existence check followed by a plain rename.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug)]
pub enum MoveResult {
    Success,
    AlreadyExists,
    OtherError(io::Error),
}

pub trait FileMover {
    fn move_file(&self, src: &Path, dst: &Path) -> MoveResult;

    /// Existence check used while searching for a free name.
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoClobberMover;

impl FileMover for NoClobberMover {
    fn move_file(&self, src: &Path, dst: &Path) -> MoveResult {
        match fs::hard_link(src, dst) {
            Ok(()) => match fs::remove_file(src) {
                Ok(()) => MoveResult::Success,
                Err(e) => {
                    // Leave the source as the only copy.
                    if let Err(undo) = fs::remove_file(dst) {
                        log::warn!("Could not remove link {}: {undo}", dst.display());
                    }
                    MoveResult::OtherError(e)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => MoveResult::AlreadyExists,
            Err(e) if e.kind() == io::ErrorKind::NotFound => MoveResult::OtherError(e),
            Err(e) => {
                log::debug!("Hard link unavailable for {} ({e}), renaming", src.display());
                rename_if_absent(self, src, dst)
            }
        }
    }
}

fn rename_if_absent(mover: &impl FileMover, src: &Path, dst: &Path) -> MoveResult {
    if mover.exists(dst) {
        return MoveResult::AlreadyExists;
    }
    match fs::rename(src, dst) {
        Ok(()) => MoveResult::Success,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => MoveResult::AlreadyExists,
        Err(e) => MoveResult::OtherError(e),
    }
}
