//! Direct file sink used when a run has a single execution unit.

use parking_lot::{Mutex, MutexGuard};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

use super::LoggingError;

/// Open (and create the directory of) the log file
///
/// `truncate` starts a fresh log; otherwise records are appended to the existing file.
pub fn open_log_file(path: &Path, truncate: bool) -> Result<File, LoggingError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LoggingError::LogFileOpen {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let mut options = OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }

    options.open(path).map_err(|source| LoggingError::LogFileOpen {
        path: path.to_path_buf(),
        source,
    })
}

/// Destination of file records: the log file, or stderr when it cannot be opened
pub type LogTarget = Box<dyn Write + Send>;

/// Mutex-guarded buffered log target, written in place by the emitting thread
#[derive(Clone)]
pub struct FileSink {
    file: Arc<Mutex<BufWriter<LogTarget>>>,
}

impl FileSink {
    pub fn new(target: impl Write + Send + 'static) -> Self {
        let target: LogTarget = Box::new(target);
        Self {
            file: Arc::new(Mutex::new(BufWriter::new(target))),
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

/// Exclusive handle to the file for the duration of one record
pub struct FileSinkGuard<'a>(MutexGuard<'a, BufWriter<LogTarget>>);

impl Write for FileSinkGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = FileSinkGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        FileSinkGuard(self.file.lock())
    }
}
