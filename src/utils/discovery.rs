//! Archive discovery.
//!
//! Collects the archives a run will process. Traversal is sequential and the
//! result is sorted so a batch always visits files in the same order.
//!
//! # Error Handling
//!
//! Failing to read the top-level directory is an error. Failures on nested
//! directories are logged and skipped so one unreadable folder does not hide
//! the rest of the library.

use crate::constants::ARCHIVE_EXTENSION;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Check if a file or directory is hidden (starts with '.')
pub fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

pub fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        .unwrap_or(false)
}

/// Collect all `*.psarc` files in `dir`, descending into subdirectories when
/// `recursive` is set.
pub fn discover_archives(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = Vec::new();
    scan_directory(dir, recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<(), Box<dyn Error>> {
    let entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    let mut directories = Vec::new();

    for entry in entries {
        let path = entry.path();

        if is_hidden_file(&path) {
            continue;
        }

        if path.is_dir() {
            if recursive {
                directories.push(path);
            }
        } else if path.is_file() && has_archive_extension(&path) {
            files.push(path);
        }
    }

    for subdir in directories {
        if let Err(e) = scan_directory(&subdir, recursive, files) {
            log::warn!("Failed to scan directory '{}': {e}", subdir.display());
        }
    }

    Ok(())
}
