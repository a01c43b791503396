//! Run options for the renamer.
//!
//! Options are read once at startup from an optional plain-text file in the
//! working directory (see [`OPTIONS_FILE_NAME`]). The file is line oriented:
//! each line is `Key: value`, blank lines and lines starting with `#` are
//! ignored. Every option has a declared default, so a missing file or a
//! malformed line simply leaves the default in place. Once built, an
//! [`Options`] value is never mutated for the rest of the run.

use crate::constants::OPTIONS_FILE_NAME;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a piece of naming information is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Source {
    /// Parse it out of the archive's current filename.
    #[default]
    FromFilename,
    /// Read it from the metadata embedded in the archive.
    FromMetadata,
}

impl Source {
    fn parse(value: &str) -> Option<Self> {
        match normalize_key(value).as_str() {
            "fromfilename" | "filename" => Some(Source::FromFilename),
            "frommetadata" | "metadata" => Some(Source::FromMetadata),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Options {
    pub artist_song_separator: String,
    pub space_separator: String,
    pub version_source: Source,
    pub difficulty_source: Source,
    pub zero_pad_version: bool,
    pub override_clean_name: bool,
    pub include_subfolders: bool,
    pub logging_enabled: bool,
    pub pause_on_error: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("line {line}: expected `Key: value`")]
    MissingSeparator { line: usize },
    #[error("unknown option `{0}`")]
    UnknownKey(String),
    #[error("option `{key}` expects {expected}, got `{value}`")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

fn default_artist_song_separator() -> String {
    "_".to_string()
}

fn default_space_separator() -> String {
    "-".to_string()
}

fn default_include_subfolders() -> bool {
    true
}

fn default_pause_on_error() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    pub fn new() -> Self {
        Self {
            artist_song_separator: default_artist_song_separator(),
            space_separator: default_space_separator(),
            version_source: Source::default(),
            difficulty_source: Source::default(),
            zero_pad_version: false,
            override_clean_name: false,
            include_subfolders: default_include_subfolders(),
            logging_enabled: false,
            pause_on_error: default_pause_on_error(),
        }
    }

    pub fn options_path(dir: &Path) -> PathBuf {
        dir.join(OPTIONS_FILE_NAME)
    }

    /// Load options from `dir`, falling back to defaults when no options file
    /// exists. Lines that cannot be applied are returned as warnings.
    pub fn load(dir: &Path) -> io::Result<(Self, Vec<ConfigError>)> {
        let path = Self::options_path(dir);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((Self::default(), Vec::new())),
            Err(e) => Err(e),
        }
    }

    /// Parse the contents of an options file. Never fails: every line that
    /// cannot be applied leaves the corresponding default untouched and is
    /// reported in the returned warnings.
    pub fn parse(contents: &str) -> (Self, Vec<ConfigError>) {
        let mut options = Self::new();
        let mut warnings = Vec::new();

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                warnings.push(ConfigError::MissingSeparator { line: index + 1 });
                continue;
            };

            if let Err(e) = options.set_value(key.trim(), unquote(value.trim())) {
                warnings.push(e);
            }
        }

        (options, warnings)
    }

    /// Apply a single option. Keys are matched ignoring case,
    /// spaces, underscores and dashes, so `ZeroPadVersion` and
    /// `zero_pad_version` are the same option.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match normalize_key(key).as_str() {
            "artistsongseparator" => self.artist_song_separator = value.to_string(),
            "spaceseparator" => self.space_separator = value.to_string(),
            "versionsource" => self.version_source = parse_source(key, value)?,
            "difficultysource" => self.difficulty_source = parse_source(key, value)?,
            "zeropadversion" => self.zero_pad_version = parse_bool(key, value)?,
            "overridecleanname" => self.override_clean_name = parse_bool(key, value)?,
            "includesubfolders" => self.include_subfolders = parse_bool(key, value)?,
            "logging" | "loggingenabled" => self.logging_enabled = parse_bool(key, value)?,
            "pauseonerror" => self.pause_on_error = parse_bool(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Strip one pair of matching surrounding quotes so whitespace-only values
/// such as `" "` survive the line trim.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

fn parse_source(key: &str, value: &str) -> Result<Source, ConfigError> {
    Source::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: "FromFilename or FromMetadata",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_options_new() {
        let options = Options::new();
        assert_eq!(options.artist_song_separator, "_");
        assert_eq!(options.space_separator, "-");
        assert_eq!(options.version_source, Source::FromFilename);
        assert_eq!(options.difficulty_source, Source::FromFilename);
        assert!(!options.zero_pad_version);
        assert!(!options.override_clean_name);
        assert!(options.include_subfolders);
        assert!(!options.logging_enabled);
        assert!(options.pause_on_error);
    }

    #[test]
    fn test_options_default() {
        let options: Options = Default::default();
        assert_eq!(options, Options::new());
    }

    #[test]
    fn test_parse_full_file() {
        let contents = "\
# Renamer options
ArtistSongSeparator: __
SpaceSeparator: _
VersionSource: FromMetadata
DifficultySource: FromMetadata
ZeroPadVersion: true
OverrideCleanName: yes
IncludeSubfolders: false
Logging: true
";
        let (options, warnings) = Options::parse(contents);
        assert!(warnings.is_empty());
        assert_eq!(options.artist_song_separator, "__");
        assert_eq!(options.space_separator, "_");
        assert_eq!(options.version_source, Source::FromMetadata);
        assert_eq!(options.difficulty_source, Source::FromMetadata);
        assert!(options.zero_pad_version);
        assert!(options.override_clean_name);
        assert!(!options.include_subfolders);
        assert!(options.logging_enabled);
    }

    #[test]
    fn test_parse_keeps_defaults_on_bad_lines() {
        let contents = "ZeroPadVersion: maybe\nno separator here\nColour: blue\nSpaceSeparator: +";
        let (options, warnings) = Options::parse(contents);

        assert!(!options.zero_pad_version);
        assert_eq!(options.space_separator, "+");
        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[1], ConfigError::MissingSeparator { line: 2 });
        assert_eq!(warnings[2], ConfigError::UnknownKey("Colour".to_string()));
    }

    #[test]
    fn test_parse_quoted_and_empty_values() {
        let (options, warnings) = Options::parse("SpaceSeparator: \" \"\nArtistSongSeparator:");
        assert!(warnings.is_empty());
        assert_eq!(options.space_separator, " ");
        assert_eq!(options.artist_song_separator, "");
    }

    #[test]
    fn test_set_value_key_forms() {
        let mut options = Options::new();

        options.set_value("zero_pad_version", "1").unwrap();
        assert!(options.zero_pad_version);

        options.set_value("version-source", "metadata").unwrap();
        assert_eq!(options.version_source, Source::FromMetadata);

        let result = options.set_value("difficulty_source", "guess");
        assert!(result.is_err());
        assert_eq!(options.difficulty_source, Source::FromFilename);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let (options, warnings) = Options::load(temp_dir.path()).unwrap();
        assert_eq!(options, Options::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_load_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            Options::options_path(temp_dir.path()),
            "Logging: true\nIncludeSubfolders: false\n",
        )
        .unwrap();

        let (options, warnings) = Options::load(temp_dir.path()).unwrap();
        assert!(warnings.is_empty());
        assert!(options.logging_enabled);
        assert!(!options.include_subfolders);
    }
}
