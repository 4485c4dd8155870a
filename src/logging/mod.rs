//! # Batch Run Logging
//!
//! Per-run structured logging built on the tracing ecosystem.
//!
//! A [`LoggingConfig`] is built once per extraction run and installed as a
//! [`tracing::Dispatch`] that the coordinating thread and every worker thread enter.
//! Installing per run instead of globally keeps concurrent runs (and tests) isolated
//! and gives the run a well-defined teardown point.
//!
//! Two sinks are attached:
//! - **file**: filtered at `file_level`; written directly in sequential mode, or through
//!   the [`fan_in`] channel and its single listener thread in concurrent mode
//! - **console** (stderr): filtered at `console_level`
//!
//! The dispatch-wide threshold is the more verbose of the two.
//!
//! A log file that cannot be opened does not stop the run: the failure is reported
//! on stderr and file records are written to stderr instead.

pub mod fan_in;
pub mod format;
pub mod sink;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{fmt, Layer, Registry};

use crate::config::LoggingSettings;

pub use fan_in::{FanInListener, FanInWriter, ListenerReport};
pub use format::RecordFormat;
pub use sink::{FileSink, LogTarget};

type FileLayer = Box<dyn Layer<Layered<LevelFilter, Registry>> + Send + Sync>;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file '{}': {source}", path.display())]
    LogFileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to start log fan-in listener: {0}")]
    ListenerSpawn(#[source] io::Error),
}

/// Description of the sinks for one batch run
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    settings: LoggingSettings,
    log_file: PathBuf,
    concurrent: bool,
    truncate: bool,
}

impl LoggingConfig {
    /// `concurrent` selects the fan-in channel; `truncate` starts a fresh log file
    pub fn new(
        settings: &LoggingSettings,
        log_file: impl Into<PathBuf>,
        concurrent: bool,
        truncate: bool,
    ) -> Self {
        Self {
            settings: settings.clone(),
            log_file: log_file.into(),
            concurrent,
            truncate,
        }
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Open the sinks, start the listener when concurrent, and build the dispatch
    ///
    /// Only a listener that cannot be started is an error.
    pub fn install(&self) -> Result<ActiveLogging, LoggingError> {
        let (file, log_file_open) = self.open_target();
        let format = RecordFormat::new(self.concurrent);

        let (file_layer, file_sink, listener): (FileLayer, _, _) = if self.concurrent {
            let listener = FanInListener::spawn(file, self.settings.channel_capacity)?;
            let layer = fmt::layer()
                .event_format(format)
                .with_ansi(false)
                .with_writer(listener.writer())
                .with_filter(self.settings.file_level)
                .boxed();
            (layer, None, Some(listener))
        } else {
            let file_sink = FileSink::new(file);
            let layer = fmt::layer()
                .event_format(format)
                .with_ansi(false)
                .with_writer(file_sink.clone())
                .with_filter(self.settings.file_level)
                .boxed();
            (layer, Some(file_sink), None)
        };

        let console_layer = fmt::layer()
            .event_format(format)
            .with_ansi(false)
            .with_writer(io::stderr)
            .with_filter(self.settings.console_level);

        let subscriber = Registry::default()
            .with(self.settings.effective_level())
            .with(file_layer)
            .with(console_layer);

        Ok(ActiveLogging {
            dispatch: Dispatch::new(subscriber),
            file_sink,
            listener,
            log_file_open,
        })
    }

    fn open_target(&self) -> (LogTarget, bool) {
        match sink::open_log_file(&self.log_file, self.truncate) {
            Ok(file) => (Box::new(file), true),
            Err(e) => {
                eprintln!("logging: {e}; writing log records to stderr");
                (Box::new(io::stderr()), false)
            }
        }
    }
}

/// Installed sinks of a running batch; torn down by [`ActiveLogging::shutdown`] or on drop
pub struct ActiveLogging {
    dispatch: Dispatch,
    file_sink: Option<FileSink>,
    listener: Option<FanInListener>,
    log_file_open: bool,
}

impl ActiveLogging {
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn is_fan_in_active(&self) -> bool {
        self.listener.is_some()
    }

    /// False when file records fell back to stderr
    pub fn has_log_file(&self) -> bool {
        self.log_file_open
    }

    /// Run `f` with this run's dispatch as the thread's default subscriber
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Flush and close the sinks; returns the listener report in concurrent mode
    pub fn shutdown(mut self) -> Option<ListenerReport> {
        self.close()
    }

    fn close(&mut self) -> Option<ListenerReport> {
        if let Some(file_sink) = self.file_sink.take() {
            if let Err(e) = file_sink.flush() {
                eprintln!("logging: failed to flush log file: {e}");
            }
        }
        self.listener.take().map(FanInListener::stop)
    }
}

impl Drop for ActiveLogging {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings(file_level: LevelFilter) -> LoggingSettings {
        LoggingSettings {
            file_level,
            console_level: LevelFilter::OFF,
            ..LoggingSettings::default()
        }
    }

    #[test]
    fn test_sequential_record_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.txt");
        let logging = LoggingConfig::new(&settings(LevelFilter::INFO), &path, false, true)
            .install()
            .unwrap();
        assert!(!logging.is_fan_in_active());

        logging.in_scope(|| {
            tracing::info!(target: "radiomics", "Processing {}", "(0, 1)");
            tracing::debug!(target: "radiomics", "filtered out");
        });
        logging.shutdown();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        // [YYYY-MM-DD HH:MM:SS] I: radiomics: Processing (0, 1)
        assert_eq!(&lines[0][0..1], "[");
        assert_eq!(&lines[0][20..], "] I: radiomics: Processing (0, 1)");
    }

    #[test]
    fn test_concurrent_records_embed_worker_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.txt");
        let logging = LoggingConfig::new(&settings(LevelFilter::INFO), &path, true, true)
            .install()
            .unwrap();
        assert!(logging.is_fan_in_active());

        let dispatch = logging.dispatch().clone();
        std::thread::Builder::new()
            .name("Worker-7".to_string())
            .spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    tracing::warn!(target: "radiomics", "from worker");
                })
            })
            .unwrap()
            .join()
            .unwrap();

        let report = logging.shutdown().unwrap();
        assert_eq!(report.records_written, 1);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.trim_end().ends_with("] W:(Worker-7) radiomics: from worker"));
    }

    #[test]
    fn test_unopenable_log_file_falls_back_to_stderr() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "regular file").unwrap();
        let path = blocker.join("features").join("log.txt");

        for concurrent in [false, true] {
            let logging = LoggingConfig::new(&settings(LevelFilter::INFO), &path, concurrent, true)
                .install()
                .unwrap();
            assert!(!logging.has_log_file());
            assert_eq!(logging.is_fan_in_active(), concurrent);
            logging.in_scope(|| tracing::info!("still logged"));
            logging.shutdown();
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_append_mode_keeps_previous_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.txt");

        for (truncate, message) in [(true, "first run"), (false, "second run")] {
            let logging = LoggingConfig::new(&settings(LevelFilter::INFO), &path, false, truncate)
                .install()
                .unwrap();
            logging.in_scope(|| tracing::info!("{message}"));
        }

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("first run"));
        assert!(text.contains("second run"));
    }
}
