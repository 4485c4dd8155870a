//! # Log Fan-In
//!
//! Many-producer, single-consumer aggregation of formatted log records.
//!
//! Each worker thread formats its records locally and pushes the finished line into a
//! bounded channel. One listener thread drains the channel in arrival order and is the
//! only writer of the log file. Shutdown is an explicit `Stop` message: every record
//! sent before it is written, then the sink is flushed and the thread exits.
//!
//! Sink failures never propagate back to producers; they are reported on stderr and
//! the record is mirrored there instead.

use crossbeam::channel::{self, Receiver, Sender};
use std::io::{self, Write};
use std::mem;
use std::thread::{self, JoinHandle};
use tracing_subscriber::fmt::MakeWriter;

use super::LoggingError;
use crate::constants::logging::FAN_IN_THREAD_NAME;

enum FanInMessage {
    Record(Vec<u8>),
    Stop,
}

/// What the listener did before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerReport {
    pub records_written: usize,
    pub write_failures: usize,
}

/// Producer side of the fan-in channel, handed to the file layer of every worker
#[derive(Clone)]
pub struct FanInWriter {
    sender: Sender<FanInMessage>,
}

/// Buffer for one record; the record is sent when the buffer is dropped
pub struct FanInRecord<'a> {
    buffer: Vec<u8>,
    sender: &'a Sender<FanInMessage>,
}

impl Write for FanInRecord<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FanInRecord<'_> {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        // A closed channel means the listener already passed its drain barrier;
        // late records from abandoned workers are discarded.
        let _ = self
            .sender
            .send(FanInMessage::Record(mem::take(&mut self.buffer)));
    }
}

impl<'a> MakeWriter<'a> for FanInWriter {
    type Writer = FanInRecord<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        FanInRecord {
            buffer: Vec::with_capacity(256),
            sender: &self.sender,
        }
    }
}

/// Consumer side: the thread that owns the log sink
pub struct FanInListener {
    sender: Sender<FanInMessage>,
    handle: Option<JoinHandle<ListenerReport>>,
}

impl FanInListener {
    /// Start the listener thread before any producer exists
    pub fn spawn<W>(sink: W, capacity: usize) -> Result<Self, LoggingError>
    where
        W: Write + Send + 'static,
    {
        let (sender, receiver) = channel::bounded(capacity.max(1));

        let handle = thread::Builder::new()
            .name(FAN_IN_THREAD_NAME.to_string())
            .spawn(move || drain(receiver, sink))
            .map_err(LoggingError::ListenerSpawn)?;

        Ok(Self {
            sender,
            handle: Some(handle),
        })
    }

    pub fn writer(&self) -> FanInWriter {
        FanInWriter {
            sender: self.sender.clone(),
        }
    }

    /// Drain barrier: write everything already queued, flush, then join the thread
    pub fn stop(mut self) -> ListenerReport {
        self.stop_inner()
    }

    fn stop_inner(&mut self) -> ListenerReport {
        let Some(handle) = self.handle.take() else {
            return ListenerReport::default();
        };

        if self.sender.send(FanInMessage::Stop).is_err() {
            eprintln!("log fan-in: listener exited before the stop request");
        }

        match handle.join() {
            Ok(report) => report,
            Err(_) => {
                eprintln!("log fan-in: listener thread panicked");
                ListenerReport::default()
            }
        }
    }
}

impl Drop for FanInListener {
    fn drop(&mut self) {
        self.stop_inner();
    }
}

fn drain<W: Write>(receiver: Receiver<FanInMessage>, mut sink: W) -> ListenerReport {
    let mut report = ListenerReport::default();

    for message in receiver.iter() {
        match message {
            FanInMessage::Record(bytes) => match sink.write_all(&bytes) {
                Ok(()) => report.records_written += 1,
                Err(e) => {
                    report.write_failures += 1;
                    eprintln!("log fan-in: failed to write record: {e}");
                    let _ = io::stderr().write_all(&bytes);
                }
            },
            FanInMessage::Stop => break,
        }
    }

    if let Err(e) = sink.flush() {
        eprintln!("log fan-in: failed to flush log sink: {e}");
    }

    report
}
