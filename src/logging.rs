//! File logging for cinesearch
//!
//! The terminal UI owns stdout and stderr, so diagnostics go to a log file
//! instead. The logger plugs into the `log` facade; the rest of the crate
//! just uses `log::info!` and friends.
//!
//! The file is truncated at startup and flushed after every entry.

use crate::error::{CineSearchError, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Global logger instance
static LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Log target for the fetch lifecycle
pub const FETCH_TARGET: &str = "FETCH";

/// Log target for input and debounce events
pub const INPUT_TARGET: &str = "INPUT";

/// Logger writing one line per record to a file
pub struct FileLogger {
    file: Mutex<Option<File>>,
    path: PathBuf,
    min_level: LevelFilter,
}

impl FileLogger {
    /// Open (and truncate) the log file
    pub fn open(path: &Path, min_level: LevelFilter) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file: Mutex::new(Some(file)),
            path: path.to_path_buf(),
            min_level,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let entry = format_entry(
            &timestamp.to_string(),
            record.level(),
            record.target(),
            &record.args().to_string(),
        );

        let mut guard = self.file.lock();
        if let Some(ref mut file) = *guard {
            let _ = file.write_all(entry.as_bytes());
            let _ = file.flush();
        }
    }

    fn flush(&self) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Render a single log line
pub fn format_entry(timestamp: &str, level: Level, target: &str, message: &str) -> String {
    format!("[{}] [{:5}] [{}] {}\n", timestamp, level, target, message)
}

/// Install the global file logger. Only the first call has any effect.
pub fn init(path: &Path, min_level: LevelFilter) -> Result<()> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let logger = FileLogger::open(path, min_level)?;
    let logger = LOGGER.get_or_init(|| logger);
    if log::set_logger(logger).is_ok() {
        log::set_max_level(min_level);
    }
    Ok(())
}

/// Path of the active log file, if logging was initialized
pub fn log_path() -> Option<&'static Path> {
    LOGGER.get().map(|l| l.path())
}

// ============================================================================
// Fetch lifecycle helpers
// ============================================================================

/// A request is about to go out
pub fn log_request(seq: u64, query: &str, url: &str) {
    log::info!(target: FETCH_TARGET, "#{} query='{}' GET {}", seq, query, url);
}

/// A request settled and its outcome was applied
pub fn log_settled(seq: u64, summary: &str, elapsed: Duration) {
    log::info!(
        target: FETCH_TARGET,
        "#{} settled in {}ms: {}",
        seq,
        elapsed.as_millis(),
        summary
    );
}

/// Underlying cause of a failed request. Never shown to the user.
pub fn log_fetch_failure(seq: u64, cause: &CineSearchError) {
    log::log!(
        target: FETCH_TARGET,
        failure_level(cause),
        "#{} Error fetching movies: {}",
        seq,
        cause
    );
}

/// Remote failures are expected from time to time; local ones are bugs
pub fn failure_level(cause: &CineSearchError) -> Level {
    if cause.is_remote() {
        Level::Warn
    } else {
        Level::Error
    }
}

/// The worker skipped a queued request because a newer one was waiting
pub fn log_coalesced(skipped: u64, newer: u64) {
    log::debug!(
        target: FETCH_TARGET,
        "#{} skipped before sending, #{} queued behind it",
        skipped,
        newer
    );
}

/// An outcome arrived after a newer request had been issued
pub fn log_stale_outcome(seq: u64, latest: u64) {
    log::debug!(
        target: FETCH_TARGET,
        "#{} discarded, superseded by #{}",
        seq,
        latest
    );
}

/// A query was committed by the debounce gate
pub fn log_commit(query: &str) {
    log::debug!(target: INPUT_TARGET, "committed query '{}'", query);
}

/// Sends panic reports to the log instead of stderr while alive.
///
/// The terminal UI draws on the alternate screen, where the default hook's
/// output would land in the middle of the frame. Dropping the guard puts the
/// previous hook back.
pub struct PanicLogGuard {
    previous: Option<PanicHook>,
}

type PanicHook = Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>;

impl PanicLogGuard {
    pub fn install() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|info| {
            log::error!(target: "PANIC", "{}", info);
        }));
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for PanicLogGuard {
    fn drop(&mut self) {
        // Swapping hooks while unwinding aborts the process
        if std::thread::panicking() {
            return;
        }
        if let Some(previous) = self.previous.take() {
            let _ = panic::take_hook();
            panic::set_hook(previous);
        }
    }
}

/// Write a separator line for readability
pub fn separator(label: &str) {
    log::info!(target: "---", "========== {} ==========", label);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_into(logger: &FileLogger, level: Level, target: &str, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target(target)
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn entry_layout() {
        let line = format_entry("2024-01-01 00:00:00.000", Level::Warn, "FETCH", "boom");
        assert_eq!(line, "[2024-01-01 00:00:00.000] [WARN ] [FETCH] boom\n");
    }

    #[test]
    fn writes_records_at_or_above_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let logger = FileLogger::open(&path, LevelFilter::Info).unwrap();

        record_into(&logger, Level::Info, FETCH_TARGET, "kept");
        record_into(&logger, Level::Debug, FETCH_TARGET, "dropped");
        record_into(&logger, Level::Error, "MAIN", "also kept");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[FETCH] kept"));
        assert!(content.contains("[MAIN] also kept"));
        assert!(!content.contains("dropped"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn remote_failures_warn_local_ones_error() {
        assert_eq!(failure_level(&CineSearchError::Status(503)), Level::Warn);
        assert_eq!(
            failure_level(&CineSearchError::Panicked("boom".into())),
            Level::Error
        );
        assert_eq!(failure_level(&CineSearchError::WorkerGone), Level::Error);
    }

    #[test]
    fn panics_go_to_the_log_file_while_guarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panic.log");
        init(&path, LevelFilter::Debug).unwrap();

        {
            let _guard = PanicLogGuard::install();
            let caught = panic::catch_unwind(|| panic!("card renderer exploded"));
            assert!(caught.is_err());
        }

        let active = log_path().unwrap().to_path_buf();
        let content = std::fs::read_to_string(active).unwrap();
        assert!(content.contains("[PANIC]"));
        assert!(content.contains("card renderer exploded"));
    }

    #[test]
    fn open_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        std::fs::write(&path, "old contents\n").unwrap();

        let logger = FileLogger::open(&path, LevelFilter::Debug).unwrap();
        record_into(&logger, Level::Info, "MAIN", "fresh");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("old contents"));
        assert!(content.contains("fresh"));
    }
}
