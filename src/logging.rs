//! File logging for the terminal UI
//!
//! The UI owns stdout and stderr while running, so log records go to a file.
//! `RUST_LOG` controls the filter, defaulting to `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use env_logger::{Builder, Env, Target};

/// Log file used when `--log-file` is not given
pub fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "grok-sdr").map(|dirs| dirs.cache_dir().join("grok-sdr.log"))
}

/// Routes the `log` facade to `path`, appending to any existing file
///
/// Returns an error if the file cannot be opened. A logger that was already
/// installed (as in tests) is left in place.
pub fn init(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    Ok(())
}
