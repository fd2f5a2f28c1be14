//! CSV transform and source.
//!
//! - [`Csv`] renders a stream of Serde-serializable records into a byte sink.
//!   The header row comes from the field names of the *first* record, so an
//!   empty stream renders as nothing at all. A record that fails to marshal
//!   writes none of its fields.
//! - [`CsvSource`] decodes CSV records back into typed items.
//!
//! Both are configured with [`CsvOptions`]; the separator is a comma or a tab.

use crate::error::{Result, StreamError, TransferError, failure};
use crate::stream::{ReadStream, Transform};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

/// Field separator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Separator {
    /// `,`
    #[default]
    Comma,
    /// `\t`
    Tab,
}

impl Separator {
    /// The separator byte.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            Separator::Comma => b',',
            Separator::Tab => b'\t',
        }
    }
}

/// CSV configuration shared by [`Csv`] and [`CsvSource`].
#[derive(Clone, Debug)]
pub struct CsvOptions {
    /// Field separator.
    pub separator: Separator,
    /// Write a header row before the first record / treat the first row as a
    /// header when reading.
    pub has_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: Separator::Comma,
            has_headers: true,
        }
    }
}

/// Renders a stream as CSV.
///
/// ```
/// use pullflow::{Csv, MemorySource, Transform};
/// use serde::Serialize;
///
/// #[derive(Clone, Default, Serialize)]
/// struct User { id: u32, name: String }
///
/// let users = vec![
///     User { id: 1, name: "Alice".into() },
///     User { id: 2, name: "Bob".into() },
/// ];
/// let mut out = Vec::new();
/// Csv::new(MemorySource::from_vec(users)).write_to(&mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "id,name\n1,Alice\n2,Bob\n");
/// ```
pub struct Csv<S> {
    stream: S,
    options: CsvOptions,
}

impl<S> Csv<S> {
    /// Wrap `stream` with default options (comma, header row).
    pub fn new(stream: S) -> Self {
        Self::with_options(stream, CsvOptions::default())
    }

    /// Wrap `stream` with explicit options.
    pub fn with_options(stream: S, options: CsvOptions) -> Self {
        Self { stream, options }
    }

    /// Give the wrapped stream back.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> Transform for Csv<S>
where
    S: ReadStream,
    S::Item: Serialize,
{
    fn write_to(&mut self, w: &mut dyn Write) -> Result<u64, TransferError> {
        let mut n = 0u64;
        while self.stream.advance() {
            let header = self.options.has_headers && n == 0;
            let record = encode_record(&self.options, &self.stream.current(), header)
                .map_err(|e| TransferError::new(n, e))?;
            w.write_all(&record).map_err(|e| TransferError::new(n, e))?;
            n += 1;
        }
        if let Some(e) = failure(self.stream.error()) {
            return Err(TransferError::new(n, e));
        }
        w.flush().map_err(|e| TransferError::new(n, e))?;
        tracing::debug!(records = n, "csv written");
        Ok(n)
    }
}

/// Encode one record, preceded by the header row when `header` is set.
fn encode_record<T: Serialize>(options: &CsvOptions, item: &T, header: bool) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .delimiter(options.separator.as_byte())
        .has_headers(header)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.serialize(item)?;
    wtr.into_inner().map_err(|e| e.into_error().into())
}

/// Decodes CSV records into typed items.
///
/// A record that fails to deserialize ends the stream with a failure.
pub struct CsvSource<R, T> {
    records: Option<csv::DeserializeRecordsIntoIter<R, T>>,
    current: Option<T>,
    err: Option<StreamError>,
}

impl<R: Read, T: DeserializeOwned> CsvSource<R, T> {
    /// Decode from `reader`.
    pub fn new(reader: R, options: &CsvOptions) -> Self {
        let rdr = ReaderBuilder::new()
            .delimiter(options.separator.as_byte())
            .has_headers(options.has_headers)
            .from_reader(reader);
        Self {
            records: Some(rdr.into_deserialize()),
            current: None,
            err: None,
        }
    }
}

impl<R, T> ReadStream for CsvSource<R, T>
where
    R: Read,
    T: DeserializeOwned + Clone + Default,
{
    type Item = T;

    fn advance(&mut self) -> bool {
        self.current = None;
        if self.err.is_some() {
            return false;
        }
        let Some(records) = self.records.as_mut() else {
            return false;
        };
        match records.next() {
            Some(Ok(v)) => {
                self.current = Some(v);
                true
            }
            Some(Err(e)) => {
                self.err = Some(e.into());
                false
            }
            None => {
                self.err = Some(StreamError::Eof);
                false
            }
        }
    }

    fn current(&self) -> T {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.err.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        if self.records.take().is_some() {
            self.current = None;
            tracing::trace!("csv source closed");
        }
        Ok(())
    }
}
