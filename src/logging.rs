//! Run log setup.

use crate::constants::LOG_FILE_PREFIX;
use chrono::{DateTime, Local};
use simplelog::{CombinedLogger, Config, LevelFilter, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Log file name for a run started at `started`.
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!(
        "{LOG_FILE_PREFIX}_{}.log",
        started.format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Install the file logger for this run, writing into `dir`.
///
/// Can only be called once per process.
pub fn init_run_log(dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let log_path = dir.join(log_file_name(Local::now()));

    CombinedLogger::init(vec![WriteLogger::new(
        LevelFilter::Debug,
        Config::default(),
        File::create(&log_path)?,
    )])?;

    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            log_file_name(started),
            "dlc-renamer_2024-03-09_07-05-01.log"
        );
    }
}
