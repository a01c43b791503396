//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency across the codebase.

/// Spinner animation characters for progress indicators
pub const SPINNER_CHARS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// File extension of the archives this tool renames
pub const ARCHIVE_EXTENSION: &str = "psarc";

/// Magic bytes at the start of every PSARC archive
pub const ARCHIVE_MAGIC: &[u8; 4] = b"PSAR";

/// Suffix appended to every generated filename
pub const ARCHIVE_SUFFIX: &str = "_p.psarc";

/// Path fragments marking archives in a format we cannot rename safely
pub const INCOMPATIBLE_MARKERS: &[&str] = &["rs1compatibility"];

/// Options file looked up in the working directory
pub const OPTIONS_FILE_NAME: &str = "renamer-options.txt";

/// Prefix of the timestamped run log
pub const LOG_FILE_PREFIX: &str = "dlc-renamer";

/// Name of the sidecar descriptor carrying package version and author
pub const TOOLKIT_SIDECAR: &str = "toolkit.version";

/// Extension of metadata documents inside an unpacked archive
pub const METADATA_EXTENSION: &str = "json";

/// Forbidden characters stripped by the lightweight sanitizer
pub const FORBIDDEN_CHARS: &[char] = &['\\', '/', '?', '*', ':', '"', '<', '>', '|', '&'];

/// Default number of cleanup attempts
pub const CLEANUP_ATTEMPTS: u32 = 10;

/// Pause between cleanup attempts in milliseconds
pub const CLEANUP_BACKOFF_MS: u64 = 50;

/// Fallback version when none can be determined
pub const DEFAULT_VERSION: &str = "1";
