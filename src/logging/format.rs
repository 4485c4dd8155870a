//! Log record layout shared by the file and console sinks.
//!
//! Sequential runs: `[2024-01-31 12:00:00] I: radiomics_batch::orchestration: message`
//! Concurrent runs: `[2024-01-31 12:00:00] I:(Worker-2) radiomics_batch::orchestration: message`

use chrono::Local;
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::constants::logging::{TIMESTAMP_FORMAT, UNNAMED_THREAD};

/// Event formatter producing one plain-text line per record
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFormat {
    with_worker: bool,
}

impl RecordFormat {
    /// `with_worker` embeds the emitting thread's name after the severity initial
    pub fn new(with_worker: bool) -> Self {
        Self { with_worker }
    }
}

pub fn severity_initial(level: &Level) -> char {
    match *level {
        Level::ERROR => 'E',
        Level::WARN => 'W',
        Level::INFO => 'I',
        Level::DEBUG => 'D',
        Level::TRACE => 'T',
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        write!(
            writer,
            "[{}] {}:",
            Local::now().format(TIMESTAMP_FORMAT),
            severity_initial(metadata.level())
        )?;

        if self.with_worker {
            let current = std::thread::current();
            write!(writer, "({}) ", current.name().unwrap_or(UNNAMED_THREAD))?;
        } else {
            write!(writer, " ")?;
        }

        write!(writer, "{}: ", metadata.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
