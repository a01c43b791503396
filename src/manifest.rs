//! Track metadata found inside an unpacked archive.
//!
//! An unpacked song archive carries one or more JSON manifests (one per
//! arrangement) whose first entry holds the artist/song attributes, and
//! optionally a `toolkit.version` sidecar written by the packaging tool with
//! the package version and author.

use crate::constants::{METADATA_EXTENSION, TOOLKIT_SIDECAR};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub artist_name: String,
    pub artist_name_sort: String,
    pub song_name: String,
    pub song_name_sort: String,
    /// Highest phrase difficulty; anything above zero means the archive
    /// carries dynamic difficulty levels.
    pub difficulty: u32,
    pub package_version: Option<String>,
    pub package_author: Option<String>,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed manifest {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "Entries", default)]
    entries: BTreeMap<String, ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    #[serde(rename = "Attributes")]
    attributes: Attributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Attributes {
    #[serde(default)]
    artist_name: String,
    #[serde(default)]
    artist_name_sort: Option<String>,
    #[serde(default)]
    song_name: String,
    #[serde(default)]
    song_name_sort: Option<String>,
    #[serde(default)]
    max_phrase_difficulty: Option<u32>,
}

/// Package information from the `toolkit.version` sidecar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolkitInfo {
    pub package_version: Option<String>,
    pub package_author: Option<String>,
}

/// Find the metadata for an unpacked archive: the first manifest (in sorted
/// path order) plus the toolkit sidecar if present.
///
/// Returns `Ok(None)` when no manifest exists or the first manifest has no
/// entries.
pub fn load_track_metadata(root: &Path) -> Result<Option<TrackMetadata>, MetadataError> {
    let documents = find_metadata_documents(root)?;
    let Some(first) = documents.first() else {
        return Ok(None);
    };

    let Some(mut metadata) = parse_metadata_document(first)? else {
        return Ok(None);
    };

    if let Some(sidecar) = find_file_named(root, TOOLKIT_SIDECAR)? {
        let info = read_toolkit_info(&sidecar)?;
        metadata.package_version = info.package_version;
        metadata.package_author = info.package_author;
    }

    Ok(Some(metadata))
}

/// All `*.json` files under `root`, recursively, sorted by path.
pub fn find_metadata_documents(root: &Path) -> Result<Vec<PathBuf>, MetadataError> {
    let mut documents = Vec::new();
    collect_files(root, &mut |path| has_extension(path, METADATA_EXTENSION), &mut documents)?;
    documents.sort();
    Ok(documents)
}

/// Parse the first entry of a manifest document.
pub fn parse_metadata_document(path: &Path) -> Result<Option<TrackMetadata>, MetadataError> {
    let contents = fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest_str(&contents).map_err(|source| MetadataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_manifest_str(contents: &str) -> Result<Option<TrackMetadata>, serde_json::Error> {
    // Some packagers write a UTF-8 BOM.
    let contents = contents.trim_start_matches('\u{feff}');
    let manifest: Manifest = serde_json::from_str(contents)?;

    Ok(manifest.entries.into_values().next().map(|entry| {
        let attrs = entry.attributes;
        TrackMetadata {
            artist_name_sort: non_blank(attrs.artist_name_sort).unwrap_or_else(|| attrs.artist_name.clone()),
            song_name_sort: non_blank(attrs.song_name_sort).unwrap_or_else(|| attrs.song_name.clone()),
            artist_name: attrs.artist_name,
            song_name: attrs.song_name,
            difficulty: attrs.max_phrase_difficulty.unwrap_or(0),
            package_version: None,
            package_author: None,
        }
    }))
}

/// Parse `Key: value` lines of a `toolkit.version` sidecar.
pub fn read_toolkit_info(path: &Path) -> Result<ToolkitInfo, MetadataError> {
    let contents = fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_toolkit_info(&contents))
}

pub fn parse_toolkit_info(contents: &str) -> ToolkitInfo {
    let mut info = ToolkitInfo::default();

    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        match key.trim().to_ascii_lowercase().as_str() {
            "package version" => info.package_version = value,
            "package author" => info.package_author = value,
            _ => {}
        }
    }

    info
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn find_file_named(root: &Path, name: &str) -> Result<Option<PathBuf>, MetadataError> {
    let mut matches = Vec::new();
    collect_files(
        root,
        &mut |path| {
            path.file_name()
                .map(|n| n.to_string_lossy().eq_ignore_ascii_case(name))
                .unwrap_or(false)
        },
        &mut matches,
    )?;
    matches.sort();
    Ok(matches.into_iter().next())
}

fn collect_files(
    dir: &Path,
    matches: &mut dyn FnMut(&Path) -> bool,
    found: &mut Vec<PathBuf>,
) -> Result<(), MetadataError> {
    let io_err = |source: io::Error| MetadataError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_files(&path, matches, found)?;
        } else if path.is_file() && matches(&path) {
            found.push(path);
        }
    }

    Ok(())
}
