//! Counter-suffix search for a free destination filename.
//!
//! Only consulted after a move has been refused because the destination
//! already exists; the happy path never probes the filesystem.

use std::path::{Path, PathBuf};

/// Find a path that `exists` reports as free, starting from `candidate`.
///
/// Each round splits the file stem into a base and an optional trailing
/// `" (N)"` counter, bumps the counter and tries `"base (N).ext"`. A stem
/// without a counter starts at 1, so the first alternative is `"base (2)"`.
/// The counter strictly increases, so no candidate is tried twice.
pub fn resolve(candidate: &Path, exists: impl Fn(&Path) -> bool) -> PathBuf {
    let mut result = candidate.to_path_buf();
    let parent = candidate.parent().map(Path::to_path_buf).unwrap_or_default();
    let extension = candidate
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    while exists(&result) {
        let stem = result
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (base, count) = split_counter(&stem);
        result = parent.join(format!("{base} ({}){extension}", count + 1));
    }

    result
}

/// Whether `path` is `candidate` itself or `candidate` with a counter
/// suffix, as produced by [`resolve`] on an earlier run.
pub fn is_counter_variant(path: &Path, candidate: &Path) -> bool {
    if path.parent() != candidate.parent() || path.extension() != candidate.extension() {
        return false;
    }
    match (path.file_stem(), candidate.file_stem()) {
        (Some(stem), Some(candidate_stem)) => {
            split_counter(&stem.to_string_lossy()).0 == candidate_stem.to_string_lossy()
        }
        _ => false,
    }
}

/// Split `"name (N)"` into `("name", N)`. Anything that doesn't end in a
/// parenthesised integer below `u64::MAX` is returned whole with a count
/// of 1.
pub fn split_counter(stem: &str) -> (&str, u64) {
    if let Some(inner) = stem.strip_suffix(')')
        && let Some(open) = inner.rfind('(')
        && let Ok(count) = inner[open + 1..].parse::<u64>()
        && count < u64::MAX
    {
        return (inner[..open].trim_end(), count);
    }
    (stem, 1)
}
