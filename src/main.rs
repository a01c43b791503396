//! DLC Renamer - gives downloaded song archives consistent filenames.
//!
//! Every `.psarc` archive in a directory is opened just long enough to read
//! its song manifest, and is then renamed to
//! `Artist_Song_v<version>[_DD]_p.psarc` based on the artist and song sort
//! names it carries. Renames never overwrite an existing file: a name that
//! is already taken gets a ` (N)` counter suffix instead.
//!
//! Behaviour is tuned through an optional `renamer-options.txt` in the
//! working directory (separators, where the version and difficulty tags come
//! from, subfolder scanning, and logging).

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "dlc-renamer")]
#[command(about = "Rename custom song archives from their embedded metadata")]
#[command(version)]
struct Cli {
    /// Directory containing the archives (defaults to current directory)
    #[arg(default_value = ".")]
    dir: PathBuf,
    /// Never wait for a key press, even after errors
    #[arg(long)]
    no_pause: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    cli::rename::handle_rename(&cli.dir, cli.no_pause)?;

    Ok(())
}
