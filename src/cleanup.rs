//! Bounded-retry removal of temporary unpack directories.
//!
//! An archive is unpacked, read and then immediately deleted. On some
//! platforms the handles opened while reading are released asynchronously, so
//! the first removal attempt can fail with a busy or not-empty error. Those
//! errors are retried a fixed number of times with a short pause.

use crate::constants::{CLEANUP_ATTEMPTS, CLEANUP_BACKOFF_MS};
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: CLEANUP_ATTEMPTS,
            backoff: Duration::from_millis(CLEANUP_BACKOFF_MS),
        }
    }
}

/// Recursively delete `path`, tolerating a path that is already gone.
pub fn cleanup(path: &Path, policy: RetryPolicy) -> io::Result<()> {
    cleanup_with(path, policy, remove_tree)
}

/// Single removal attempt used by [`cleanup`].
pub fn remove_tree(path: &Path) -> io::Result<()> {
    fs::remove_dir_all(path)
}

/// [`cleanup`] with an injectable removal primitive.
pub fn cleanup_with(
    path: &Path,
    policy: RetryPolicy,
    mut remove: impl FnMut(&Path) -> io::Result<()>,
) -> io::Result<()> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match remove(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) if is_transient(&e) && attempt < attempts => {
                log::debug!(
                    "Cleanup of {} failed (attempt {attempt}/{attempts}): {e}",
                    path.display()
                );
                thread::sleep(policy.backoff);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Errors caused by handles that have not been released yet.
fn is_transient(error: &io::Error) -> bool {
    match error.kind() {
        io::ErrorKind::ResourceBusy | io::ErrorKind::DirectoryNotEmpty => true,
        // Windows reports sharing violations on recently closed files as
        // access denied.
        io::ErrorKind::PermissionDenied => cfg!(windows),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 10,
            backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_cleanup_missing_path_first_attempt() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("never-created");

        let mut calls = 0;
        let result = cleanup_with(&missing, fast_policy(), |p| {
            calls += 1;
            fs::remove_dir_all(p)
        });

        assert!(result.is_ok());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_cleanup_removes_tree() {
        let temp_dir = TempDir::new().unwrap();
        let unpacked = temp_dir.path().join("song_unpacked");
        fs::create_dir_all(unpacked.join("manifests/songs")).unwrap();
        fs::write(unpacked.join("manifests/songs/song.json"), "{}").unwrap();

        cleanup(&unpacked, fast_policy()).unwrap();
        assert!(!unpacked.exists());
    }

    #[test]
    fn test_cleanup_retries_transient_errors() {
        let mut calls = 0;
        let result = cleanup_with(Path::new("busy"), fast_policy(), |_| {
            calls += 1;
            if calls < 3 {
                Err(io::Error::from(io::ErrorKind::ResourceBusy))
            } else {
                Ok(())
            }
        });

        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_cleanup_gives_up_after_bound() {
        let mut calls = 0;
        let result = cleanup_with(Path::new("stuck"), fast_policy(), |_| {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::DirectoryNotEmpty))
        });

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::DirectoryNotEmpty);
        assert_eq!(calls, 10);
    }

    #[test]
    fn test_cleanup_other_errors_propagate() {
        let mut calls = 0;
        let result = cleanup_with(Path::new("bad"), fast_policy(), |_| {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::InvalidInput))
        });

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
        assert_eq!(calls, 1);
    }
}
