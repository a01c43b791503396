//! Path and input validation utilities.

use owo_colors::OwoColorize;
use std::error::Error;
use std::path::Path;

/// Validate that `path` exists and is a directory that can be scanned.
///
/// # Example
///
/// ```ignore
/// use crate::utils::validation::validate_directory;
/// use std::path::Path;
///
/// validate_directory(Path::new("."))?;
/// ```
pub fn validate_directory(path: &Path) -> Result<(), Box<dyn Error>> {
    if !path.exists() {
        return Err(format!(
            "{} Path does not exist: {}",
            "Error:".red().bold(),
            path.display()
        )
        .into());
    }
    if !path.is_dir() {
        return Err(format!(
            "{} Not a directory: {}",
            "Error:".red().bold(),
            path.display()
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory_valid() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_directory(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_validate_directory_missing() {
        let path = Path::new("/this/path/does/not/exist/hopefully/12345");
        let result = validate_directory(path);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_directory_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("song_p.psarc");
        fs::write(&file_path, "test").unwrap();

        let result = validate_directory(&file_path);
        assert!(result.unwrap_err().to_string().contains("Not a directory"));
    }
}
