//! Mock streams, sinks, writers and cursors.
//!
//! Counters are shared through `Rc<Cell<usize>>` handles so a test can keep
//! observing them after the mock has been moved into a pipeline.

use crate::error::{Result, StreamError};
use crate::source::RowCursor;
use crate::stream::{ReadStream, WriteStream};
use std::cell::Cell;
use std::rc::Rc;

/// Wraps a stream and counts `close()` calls.
pub struct TrackedSource<S> {
    inner: S,
    closes: Rc<Cell<usize>>,
}

impl<S> TrackedSource<S> {
    /// Track `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            closes: Rc::new(Cell::new(0)),
        }
    }

    /// Shared handle to the number of `close()` calls.
    #[must_use]
    pub fn close_count(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.closes)
    }
}

impl<S: ReadStream> ReadStream for TrackedSource<S> {
    type Item = S::Item;

    fn advance(&mut self) -> bool {
        self.inner.advance()
    }

    fn current(&self) -> S::Item {
        self.inner.current()
    }

    fn error(&self) -> Option<&StreamError> {
        self.inner.error()
    }

    fn close(&mut self) -> Result<()> {
        self.closes.set(self.closes.get() + 1);
        self.inner.close()
    }
}

/// In-memory sink that accepts `limit` writes and then fails every write.
///
/// Each accepted write counts as one unit.
pub struct FailingSink<T> {
    items: Vec<T>,
    limit: usize,
    flushes: Rc<Cell<usize>>,
    err: Option<StreamError>,
}

impl<T> FailingSink<T> {
    /// Fail on write number `limit + 1`.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit,
            flushes: Rc::new(Cell::new(0)),
            err: None,
        }
    }

    /// A sink that never fails.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Items accepted so far.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Shared handle to the number of `flush()` calls.
    #[must_use]
    pub fn flush_count(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.flushes)
    }
}

impl<T> WriteStream for FailingSink<T> {
    type Item = T;

    fn write(&mut self, item: T) -> Result<u64> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if self.items.len() >= self.limit {
            let err = StreamError::msg(format!("sink failed after {} writes", self.limit));
            self.err = Some(err.clone());
            return Err(err);
        }
        self.items.push(item);
        Ok(1)
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes.set(self.flushes.get() + 1);
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Byte writer that accepts up to `limit` bytes in total.
///
/// A write that would go past the limit fails without writing anything.
#[derive(Debug, Default)]
pub struct FailingWriter {
    buf: Vec<u8>,
    limit: usize,
}

impl FailingWriter {
    /// Accept at most `limit` bytes.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
        }
    }

    /// Bytes accepted so far.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.buf.len()
    }

    /// The accepted bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl std::io::Write for FailingWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        if self.buf.len() + data.len() > self.limit {
            return Err(std::io::Error::other(format!(
                "write limit of {} bytes exceeded",
                self.limit
            )));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// In-memory [`RowCursor`] over a `Vec` of rows.
pub struct VecCursor<T> {
    rows: Vec<T>,
    pos: usize,
    fail_scan_at: Option<usize>,
    fail_close: bool,
    closes: Rc<Cell<usize>>,
}

impl<T> VecCursor<T> {
    /// Cursor over `rows`.
    #[must_use]
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            pos: 0,
            fail_scan_at: None,
            fail_close: false,
            closes: Rc::new(Cell::new(0)),
        }
    }

    /// Fail scanning the row at 0-based `index`.
    #[must_use]
    pub fn fail_scan_at(mut self, index: usize) -> Self {
        self.fail_scan_at = Some(index);
        self
    }

    /// Fail when the cursor is closed.
    #[must_use]
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Shared handle to the number of `close()` calls.
    #[must_use]
    pub fn close_count(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.closes)
    }
}

impl<T: Clone> RowCursor for VecCursor<T> {
    type Row = T;

    fn has_next(&mut self) -> bool {
        if self.pos < self.rows.len() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn scan(&mut self, row: &mut T) -> anyhow::Result<()> {
        let index = self
            .pos
            .checked_sub(1)
            .ok_or_else(|| anyhow::anyhow!("scan before has_next"))?;
        if self.fail_scan_at == Some(index) {
            anyhow::bail!("cannot scan row {index}");
        }
        row.clone_from(&self.rows[index]);
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.closes.set(self.closes.get() + 1);
        if self.fail_close {
            anyhow::bail!("cursor release failed");
        }
        Ok(())
    }
}
