//! Progress bar helpers for the rename run.

use crate::constants::SPINNER_CHARS;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Create the batch progress bar.
///
/// When `visible` is false (output is not a terminal) the bar is hidden, but
/// `println` still reaches stdout so per-file lines are never lost.
pub fn create_progress_bar(total: u64, visible: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .tick_strings(SPINNER_CHARS)
            .progress_chars("█▓░"),
    );
    if !visible {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb
}

/// Print a line above the progress bar, or straight to stdout when the bar
/// is hidden (indicatif drops `println` output for hidden bars).
pub fn print_line(pb: &ProgressBar, line: impl AsRef<str>) {
    if pb.is_hidden() {
        println!("{}", line.as_ref());
    } else {
        pb.println(line);
    }
}
