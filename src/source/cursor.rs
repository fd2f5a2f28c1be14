use crate::error::{Result, StreamError};
use crate::stream::ReadStream;

/// Row-by-row cursor exposed by a database layer.
///
/// This is the only contract the engine requires from a database driver:
/// `has_next` moves to the next row, `scan` decodes the current row into a
/// destination value, `close` releases the cursor.
pub trait RowCursor {
    /// Decoded row type.
    type Row;

    /// Move to the next row. Returns `false` when no rows remain.
    fn has_next(&mut self) -> bool;

    /// Decode the current row into `row`.
    ///
    /// # Errors
    /// Returns the driver's decode failure.
    fn scan(&mut self, row: &mut Self::Row) -> anyhow::Result<()>;

    /// Release the cursor.
    ///
    /// # Errors
    /// Returns the driver's release failure.
    fn close(&mut self) -> anyhow::Result<()>;
}

/// A stream over a [`RowCursor`].
///
/// The cursor is closed automatically the first time `has_next` returns
/// `false`; a failure releasing it at that point becomes the terminal error.
/// Scan failures are failures, never clean exhaustion.
pub struct CursorSource<C: RowCursor> {
    cursor: C,
    current: Option<C::Row>,
    err: Option<StreamError>,
    released: bool,
    closed: bool,
}

impl<C: RowCursor> CursorSource<C> {
    /// Wrap an open cursor.
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            current: None,
            err: None,
            released: false,
            closed: false,
        }
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.cursor.close().map_err(StreamError::from)
    }
}

impl<C> ReadStream for CursorSource<C>
where
    C: RowCursor,
    C::Row: Clone + Default,
{
    type Item = C::Row;

    fn advance(&mut self) -> bool {
        self.current = None;
        if self.closed || self.released || self.err.is_some() {
            return false;
        }
        if !self.cursor.has_next() {
            tracing::debug!("cursor exhausted, releasing");
            self.err = Some(match self.release() {
                Ok(()) => StreamError::Eof,
                Err(e) => e,
            });
            return false;
        }
        let mut row = C::Row::default();
        match self.cursor.scan(&mut row) {
            Ok(()) => {
                self.current = Some(row);
                true
            }
            Err(e) => {
                self.err = Some(e.into());
                false
            }
        }
    }

    fn current(&self) -> C::Row {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.err.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.current = None;
        self.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VecCursor;

    #[test]
    fn auto_closes_on_exhaustion() {
        let cursor = VecCursor::new(vec![1, 2]);
        let closes = cursor.close_count();
        let mut s = CursorSource::new(cursor);
        assert!(s.advance());
        assert!(s.advance());
        assert!(!s.advance());
        assert_eq!(closes.get(), 1);
        s.close().unwrap();
        s.close().unwrap();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn scan_failure_is_not_clean_exhaustion() {
        let mut s = CursorSource::new(VecCursor::new(vec![1, 2, 3]).fail_scan_at(1));
        assert!(s.advance());
        assert_eq!(s.current(), 1);
        assert!(!s.advance());
        assert!(s.error().is_some_and(|e| !e.is_eof()));
        assert_eq!(s.current(), 0);
    }

    #[test]
    fn release_failure_becomes_terminal_error() {
        let mut s = CursorSource::new(VecCursor::<u8>::new(vec![]).fail_close());
        assert!(!s.advance());
        assert!(s.error().is_some_and(|e| !e.is_eof()));
        assert!(s.close().is_ok());
    }
}
