use crate::error::{Result, StreamError, failure};
use crate::stream::{BoxStream, ReadStream};

/// Fan-in: read several streams back to back.
///
/// A member that ends cleanly hands over to the next one. A member that
/// fails stops the concatenation and its error becomes the terminal error.
pub struct Concat<'a, T> {
    streams: Vec<BoxStream<'a, T>>,
    idx: usize,
    err: Option<StreamError>,
    closed: bool,
}

impl<'a, T> Concat<'a, T> {
    /// Concatenate `streams` in order.
    #[must_use]
    pub fn new(streams: Vec<BoxStream<'a, T>>) -> Self {
        Self {
            streams,
            idx: 0,
            err: None,
            closed: false,
        }
    }
}

impl<T: Default> ReadStream for Concat<'_, T> {
    type Item = T;

    fn advance(&mut self) -> bool {
        if self.closed || self.err.is_some() {
            return false;
        }
        while let Some(s) = self.streams.get_mut(self.idx) {
            if s.advance() {
                return true;
            }
            if let Some(e) = failure(s.error()) {
                self.err = Some(e);
                return false;
            }
            self.idx += 1;
        }
        false
    }

    fn current(&self) -> T {
        if self.closed {
            return T::default();
        }
        self.streams
            .get(self.idx)
            .map(|s| s.current())
            .unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.err.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut first = None;
        for s in &mut self.streams {
            if let Err(e) = s.close()
                && first.is_none()
            {
                first = Some(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
