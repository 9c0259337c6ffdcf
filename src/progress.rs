// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Build progress reporting.
//!
//! Progress lines are meant for whoever watches the build, and are kept apart
//! from diagnostic logging done through [`tracing`]. Sinks never fail from the
//! caller's point of view. A line that cannot be written is not worth aborting
//! a build over.

use std::io::{self, Write};
use tracing::warn;

/// Destination for human-readable progress lines.
pub trait ProgressSink {
    /// Write one progress line.
    fn line(&mut self, message: &str);
}

/// Progress sink over any writer.
#[derive(Debug)]
pub struct WriterSink<W>
where
    W: Write,
{
    writer: W,
}

impl<W> WriterSink<W>
where
    W: Write,
{
    /// Construct new writer backed sink.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume sink, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    /// Progress sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> ProgressSink for WriterSink<W>
where
    W: Write,
{
    fn line(&mut self, message: &str) {
        if let Err(error) = writeln!(self.writer, "{message}").and_then(|_| self.writer.flush()) {
            warn!("cannot write progress line: {error}");
        }
    }
}

/// Collect progress lines in memory.
impl ProgressSink for Vec<String> {
    fn line(&mut self, message: &str) {
        self.push(message.to_owned());
    }
}
