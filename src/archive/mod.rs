//! Archive detection and unpacking.
//!
//! The renamer only needs to look inside an archive long enough to read its
//! metadata, so unpacking sits behind the [`Unpacker`] trait. [`PsarcUnpacker`]
//! is the built-in implementation for unencrypted PSARC archives.

pub mod psarc;

use crate::constants::{
    ARCHIVE_EXTENSION, ARCHIVE_MAGIC, INCOMPATIBLE_MARKERS, METADATA_EXTENSION, TOOLKIT_SIDECAR,
};
use crate::cleanup::{RetryPolicy, cleanup};
use psarc::{PsarcReader, safe_relative_path};
use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not a PSARC archive")]
    NotAnArchive,
    #[error("unsupported archive: {0}")]
    Unsupported(String),
    #[error("corrupt archive: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Unpacks an archive below `destination_root` and returns the directory the
/// contents were written to. The caller owns (and must remove) that directory.
pub trait Unpacker {
    fn unpack(&self, archive: &Path, destination_root: &Path) -> Result<PathBuf, ArchiveError>;
}

/// Which archive members get written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractFilter {
    All,
    /// Manifests and the toolkit sidecar only.
    #[default]
    MetadataOnly,
}

impl ExtractFilter {
    fn accepts(self, name: &str) -> bool {
        match self {
            ExtractFilter::All => true,
            ExtractFilter::MetadataOnly => {
                let path = Path::new(name);
                let file_name = path.file_name().map(|n| n.to_string_lossy().to_ascii_lowercase());
                let is_manifest = path
                    .extension()
                    .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(METADATA_EXTENSION))
                    .unwrap_or(false);
                is_manifest || file_name.as_deref() == Some(TOOLKIT_SIDECAR)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PsarcUnpacker {
    pub filter: ExtractFilter,
}

impl PsarcUnpacker {
    pub fn new(filter: ExtractFilter) -> Self {
        Self { filter }
    }
}

impl Unpacker for PsarcUnpacker {
    fn unpack(&self, archive: &Path, destination_root: &Path) -> Result<PathBuf, ArchiveError> {
        let mut reader = PsarcReader::open(archive)?;

        let stem = archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        let target = destination_root.join(format!("{stem}_{}", Uuid::new_v4().simple()));
        fs::create_dir_all(&target)?;

        match self.extract_all(&mut reader, archive, &target) {
            Ok(()) => Ok(target),
            Err(e) => {
                if let Err(cleanup_err) = cleanup(&target, RetryPolicy::default()) {
                    log::warn!("Could not remove {}: {cleanup_err}", target.display());
                }
                Err(e)
            }
        }
    }
}

impl PsarcUnpacker {
    fn extract_all<R: Read + Seek>(
        &self,
        reader: &mut PsarcReader<R>,
        archive: &Path,
        target: &Path,
    ) -> Result<(), ArchiveError> {
        let names = reader.names().to_vec();
        for (index, name) in names.iter().enumerate() {
            if !self.filter.accepts(name) {
                continue;
            }
            let Some(relative) = safe_relative_path(name) else {
                log::warn!("Skipping unsafe entry `{name}` in {}", archive.display());
                continue;
            };

            let data = reader.read_file(index)?;
            let out_path = target.join(relative);
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out_path, data)?;
        }
        Ok(())
    }
}

/// Extension plus magic check.
pub fn is_supported_archive(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        .unwrap_or(false);
    if !has_extension {
        return false;
    }

    let mut magic = [0u8; 4];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .map(|_| &magic == ARCHIVE_MAGIC)
        .unwrap_or(false)
}

/// Whether the path carries a marker of an archive format we must not touch.
pub fn has_incompatible_marker(path: &Path) -> bool {
    let path = path.to_string_lossy().to_lowercase();
    INCOMPATIBLE_MARKERS.iter().any(|marker| path.contains(marker))
}
