//! Log output for the binary.
//!
//! The terminal belongs to the TUI, so logs only ever go to a file. Without
//! a log file no subscriber is installed and `tracing` macros are no-ops.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::FmtSubscriber;

/// Keeps the background log writer alive. Dropping it flushes pending lines.
#[must_use]
pub struct Log {
    _guard: WorkerGuard,
}

/// Install a global subscriber writing to `path` at `level` and above.
///
/// Lines are handed to a background thread, so logging from the sampling
/// task never waits on the disk.
pub fn init(path: &Path, level: Level) -> Result<Log> {
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(path)?);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(file_writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;
    Ok(Log { _guard: guard })
}

/// An appender for exactly `path`, appending across runs.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn appender_writes_to_the_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysdash.log");

        let mut appender = file_appender(&path).unwrap();
        appender.write_all(b"first\n").unwrap();
        appender.write_all(b"second\n").unwrap();
        appender.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn appender_keeps_earlier_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysdash.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let mut appender = file_appender(&path).unwrap();
        appender.write_all(b"later\n").unwrap();
        appender.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "earlier\nlater\n");
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(file_appender(Path::new("/")).is_err());
    }
}
