//! Sink adapters: push targets for [`pipe`](crate::pipe),
//! [`multicast`](crate::multicast) and [`write_all`](crate::write_all).

use crate::error::{Result, StreamError};
use crate::stream::WriteStream;
use std::io::Write;

/// Collects written items into a `Vec<T>`.
///
/// Every write counts as one unit. Flushing is a no-op; writing after
/// [`close`](WriteStream::close) fails with [`StreamError::Closed`].
#[derive(Debug, Clone)]
pub struct MemorySink<T> {
    items: Vec<T>,
    closed: bool,
}

impl<T> MemorySink<T> {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            closed: false,
        }
    }

    /// Items written so far.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Take ownership of the written items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for MemorySink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WriteStream for MemorySink<T> {
    type Item = T;

    fn write(&mut self, item: T) -> Result<u64> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.items.push(item);
        Ok(1)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Writes byte buffers to an [`std::io::Write`].
///
/// Each write returns the number of bytes written. The first failure is
/// sticky: every later `write` or `flush` returns it without touching the
/// writer. `close` hands the writer to its finish step once (a plain flush
/// unless built with [`with_finish`](Self::with_finish)) and drops it.
pub struct WriterSink<W: Write> {
    writer: Option<W>,
    finish: fn(W) -> std::io::Result<()>,
    written: u64,
    err: Option<StreamError>,
}

fn flush_writer<W: Write>(mut w: W) -> std::io::Result<()> {
    w.flush()
}

impl<W: Write> WriterSink<W> {
    /// Wrap a byte writer.
    pub fn new(writer: W) -> Self {
        Self::with_finish(writer, flush_writer::<W>)
    }

    /// Wrap a byte writer whose output is completed by `finish` on close,
    /// e.g. a compressor that must write a trailer.
    pub fn with_finish(writer: W, finish: fn(W) -> std::io::Result<()>) -> Self {
        Self {
            writer: Some(writer),
            finish,
            written: 0,
            err: None,
        }
    }

    /// Total bytes accepted by the writer.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Borrow the writer, unless the sink has been closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    fn fail(&mut self, err: impl Into<StreamError>) -> StreamError {
        let err = err.into();
        self.err = Some(err.clone());
        err
    }
}

impl<W: Write> WriteStream for WriterSink<W> {
    type Item = Vec<u8>;

    fn write(&mut self, item: Vec<u8>) -> Result<u64> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let Some(w) = self.writer.as_mut() else {
            return Err(StreamError::Closed);
        };
        if let Err(e) = w.write_all(&item) {
            return Err(self.fail(e));
        }
        let n = item.len() as u64;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let Some(w) = self.writer.as_mut() else {
            return Err(StreamError::Closed);
        };
        if let Err(e) = w.flush() {
            return Err(self.fail(e));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(w) = self.writer.take() else {
            return Ok(());
        };
        tracing::debug!(bytes = self.written, "writer sink closed");
        if self.err.is_some() {
            return Ok(());
        }
        (self.finish)(w).map_err(|e| self.fail(e))
    }
}
