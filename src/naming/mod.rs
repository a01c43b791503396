//! Canonical filename synthesis.
//!
//! Turns the metadata extracted from an archive plus the run [`Options`] into
//! a candidate filename of the form
//! `{artist}{sep}{song}{sep}v{version}[{sep}DD]_p.psarc`. Everything here is
//! pure and total: malformed input degrades to defaults rather than failing.

pub mod sanitize;

use crate::config::{Options, Source};
use crate::constants::{ARCHIVE_SUFFIX, DEFAULT_VERSION};
use crate::manifest::TrackMetadata;
use regex::Regex;
use std::sync::LazyLock;

/// One or more `v`/`V`, a digit, then optionally a separator and one more digit.
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[vV]+(\d(?:[._-]\d)?)").expect("version pattern is valid"));

/// Filename marker for dynamic difficulty content.
const DD_MARKER: &str = "_DD";

/// Compute the canonical filename for an archive.
///
/// `raw_filename` is the archive's current file name (no directory); it is
/// only consulted when the version or difficulty source is
/// [`Source::FromFilename`].
pub fn compute_name(metadata: &TrackMetadata, options: &Options, raw_filename: &str) -> String {
    let artist = format_segment(&metadata.artist_name_sort, options);
    let song = format_segment(&metadata.song_name_sort, options);

    format!(
        "{artist}{sep}{song}{version}{difficulty}{ARCHIVE_SUFFIX}",
        sep = options.artist_song_separator,
        version = version_tag(metadata, options, raw_filename),
        difficulty = difficulty_tag(metadata, options, raw_filename),
    )
}

/// Sanitize a name and substitute the configured space separator.
pub fn format_segment(value: &str, options: &Options) -> String {
    let cleaned = if options.override_clean_name {
        sanitize::strip_forbidden(value)
    } else {
        sanitize::clean_name(value)
    };
    cleaned.replace(' ', &options.space_separator)
}

pub fn version_tag(metadata: &TrackMetadata, options: &Options, raw_filename: &str) -> String {
    let version = match options.version_source {
        Source::FromMetadata => metadata
            .package_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VERSION)
            .to_string(),
        Source::FromFilename => version_from_filename(raw_filename)
            .unwrap_or(DEFAULT_VERSION)
            .to_string(),
    };

    let mut version = version.replace(['.', '-'], "_");
    if options.zero_pad_version && version.chars().count() == 1 {
        version.push_str("_0");
    }

    format!("{}v{version}", options.artist_song_separator)
}

pub fn difficulty_tag(metadata: &TrackMetadata, options: &Options, raw_filename: &str) -> String {
    let has_dd = match options.difficulty_source {
        Source::FromMetadata => metadata.difficulty > 0,
        Source::FromFilename => raw_filename.contains(DD_MARKER),
    };

    if has_dd {
        format!("{}DD", options.artist_song_separator)
    } else {
        String::new()
    }
}

/// First version marker in a filename, without the leading `v`.
pub fn version_from_filename(raw_filename: &str) -> Option<&str> {
    VERSION_PATTERN
        .captures(raw_filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
