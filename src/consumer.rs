//! Newline-delimited consumer for upstream ensemble responses

use crate::types::response::EnsembleResponse;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// One line read from the input stream
#[derive(Debug)]
pub enum ConsumedLine {
    /// A decoded response
    Response(EnsembleResponse),
    /// A line that could not be decoded
    Malformed { line_number: u64, error: String },
}

/// Consumer reading one JSON `EnsembleResponse` per line
pub struct ResponseConsumer<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: u64,
}

impl<R: AsyncBufRead + Unpin> ResponseConsumer<R> {
    /// Create a new consumer over a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
        }
    }

    /// Read the next non-blank line; `None` at end of input
    ///
    /// Lines that are not valid UTF-8 or not valid JSON come back as
    /// [`ConsumedLine::Malformed`]. Only I/O failures are errors.
    pub async fn next(&mut self) -> Result<Option<ConsumedLine>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .await
                .context("Failed to read from input stream")?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            debug!(line_number = self.line_number, bytes = read, "Consumed line");

            return Ok(Some(match serde_json::from_slice::<EnsembleResponse>(&self.buf) {
                Ok(response) => ConsumedLine::Response(response),
                Err(e) => ConsumedLine::Malformed {
                    line_number: self.line_number,
                    error: e.to_string(),
                },
            }));
        }
    }

    /// Number of lines read so far
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}
