//! JSON transforms: [`JsonArray`] and [`NdJson`] render a stream into a byte
//! sink; [`JsonLinesSource`] decodes newline-delimited JSON back into a stream.
//!
//! Items are marshaled with Serde. Each item is fully encoded before any of
//! its bytes reach the sink, so a marshal failure leaves the output ending at
//! the last complete record. Nothing here validates a schema.

use crate::error::{Result, StreamError, TransferError, failure};
use crate::source::LineSource;
use crate::stream::{ReadStream, Transform};
use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{BufRead, Write};

/// Renders a stream as one JSON array: `[a,b,c]`. An empty stream renders as
/// `[]`.
///
/// ```
/// use pullflow::{JsonArray, MemorySource, Transform};
///
/// let mut out = Vec::new();
/// let n = JsonArray::new(MemorySource::from_vec(vec![1, 2])).write_to(&mut out).unwrap();
/// assert_eq!((n, out.as_slice()), (2, &b"[1,2]"[..]));
/// ```
pub struct JsonArray<S> {
    stream: S,
}

impl<S> JsonArray<S> {
    /// Wrap `stream`.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Give the wrapped stream back.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> Transform for JsonArray<S>
where
    S: ReadStream,
    S::Item: Serialize,
{
    fn write_to(&mut self, w: &mut dyn Write) -> Result<u64, TransferError> {
        let mut n = 0u64;
        w.write_all(b"[").map_err(|e| TransferError::new(n, e))?;
        while self.stream.advance() {
            let mut record = if n > 0 { vec![b','] } else { Vec::new() };
            serde_json::to_writer(&mut record, &self.stream.current())
                .map_err(|e| TransferError::new(n, e))?;
            w.write_all(&record).map_err(|e| TransferError::new(n, e))?;
            n += 1;
        }
        if let Some(e) = failure(self.stream.error()) {
            return Err(TransferError::new(n, e));
        }
        w.write_all(b"]").map_err(|e| TransferError::new(n, e))?;
        w.flush().map_err(|e| TransferError::new(n, e))?;
        tracing::debug!(records = n, "json array written");
        Ok(n)
    }
}

/// Renders a stream as newline-delimited JSON: one encoded item per line,
/// each followed by `\n`. An empty stream renders as nothing.
pub struct NdJson<S> {
    stream: S,
}

impl<S> NdJson<S> {
    /// Wrap `stream`.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Give the wrapped stream back.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> Transform for NdJson<S>
where
    S: ReadStream,
    S::Item: Serialize,
{
    fn write_to(&mut self, w: &mut dyn Write) -> Result<u64, TransferError> {
        let mut n = 0u64;
        while self.stream.advance() {
            let mut record = serde_json::to_vec(&self.stream.current())
                .map_err(|e| TransferError::new(n, e))?;
            record.push(b'\n');
            w.write_all(&record).map_err(|e| TransferError::new(n, e))?;
            n += 1;
        }
        if let Some(e) = failure(self.stream.error()) {
            return Err(TransferError::new(n, e));
        }
        w.flush().map_err(|e| TransferError::new(n, e))?;
        tracing::debug!(records = n, "ndjson written");
        Ok(n)
    }
}

/// Options for [`JsonLinesSource`].
#[derive(Clone, Debug)]
pub struct JsonLinesOptions {
    /// Skip lines that are empty or whitespace-only instead of failing on them.
    pub skip_blank_lines: bool,
}

impl Default for JsonLinesOptions {
    fn default() -> Self {
        Self {
            skip_blank_lines: true,
        }
    }
}

/// Decodes newline-delimited JSON into typed items.
///
/// A line that fails to parse ends the stream with a failure naming the line.
pub struct JsonLinesSource<R, T> {
    lines: LineSource<R>,
    options: JsonLinesOptions,
    current: Option<T>,
    err: Option<StreamError>,
}

impl<R: BufRead, T> JsonLinesSource<R, T> {
    /// Decode from `reader` with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, JsonLinesOptions::default())
    }

    /// Decode from `reader` with explicit options.
    pub fn with_options(reader: R, options: JsonLinesOptions) -> Self {
        Self {
            lines: LineSource::new(reader),
            options,
            current: None,
            err: None,
        }
    }
}

impl<R, T> ReadStream for JsonLinesSource<R, T>
where
    R: BufRead,
    T: DeserializeOwned + Clone + Default,
{
    type Item = T;

    fn advance(&mut self) -> bool {
        self.current = None;
        if self.err.is_some() {
            return false;
        }
        while self.lines.advance() {
            let line = self.lines.current();
            if self.options.skip_blank_lines && line.trim().is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<T>(&line)
                .with_context(|| format!("parse JSONL line {}", self.lines.lines_read()));
            match parsed {
                Ok(v) => {
                    self.current = Some(v);
                    return true;
                }
                Err(e) => {
                    self.err = Some(e.into());
                    return false;
                }
            }
        }
        false
    }

    fn current(&self) -> T {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.err.as_ref().or_else(|| self.lines.error())
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.lines.close()
    }
}
