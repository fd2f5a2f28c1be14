//! Bridges between [`ReadStream`] and native [`Iterator`]s.
//!
//! - [`StreamIter`] lets a stream drive a `for` loop. The stream is closed
//!   exactly once: when iteration finishes, or when the iterator is dropped
//!   early (for example on `break`).
//! - [`IterSource`] goes the other way and wraps any iterator lazily.

use crate::error::{Result, StreamError, failure};
use crate::stream::ReadStream;

/// `for`-loop adapter over a [`ReadStream`].
///
/// Yields `Ok(item)` per step. A failure is yielded once as `Err` and ends
/// the iteration; clean exhaustion just ends it.
///
/// ```
/// use pullflow::*;
///
/// let mut seen = Vec::new();
/// for item in MemorySource::from_vec(vec![1, 2, 3]).items() {
///     seen.push(item.unwrap());
/// }
/// assert_eq!(seen, vec![1, 2, 3]);
/// ```
pub struct StreamIter<S: ReadStream> {
    stream: S,
    done: bool,
    close_err: Option<StreamError>,
}

impl<S: ReadStream> StreamIter<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self {
            stream,
            done: false,
            close_err: None,
        }
    }

    /// Failure reported by `close()` when iteration finished, if any.
    #[must_use]
    pub fn close_error(&self) -> Option<&StreamError> {
        self.close_err.as_ref()
    }

    fn finish(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        if let Err(e) = self.stream.close() {
            tracing::debug!(error = %e, "close failed at end of iteration");
            self.close_err = Some(e);
        }
    }
}

impl<S: ReadStream> Iterator for StreamIter<S> {
    type Item = Result<S::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.stream.advance() {
            return Some(Ok(self.stream.current()));
        }
        let err = failure(self.stream.error());
        self.finish();
        err.map(Err)
    }
}

impl<S: ReadStream> Drop for StreamIter<S> {
    fn drop(&mut self) {
        self.finish();
    }
}

/// A lazy [`ReadStream`] over any native iterator.
///
/// ```
/// use pullflow::{IterSource, ReadStream, ReadStreamExt};
///
/// let mut evens = IterSource::new((0..).step_by(2)).batch(2);
/// assert!(evens.advance());
/// assert_eq!(evens.current(), vec![0, 2]);
/// ```
pub struct IterSource<I: Iterator> {
    iter: Option<I>,
    current: Option<I::Item>,
    err: Option<StreamError>,
}

impl<I: Iterator> IterSource<I> {
    /// Wrap anything iterable.
    pub fn new<T: IntoIterator<IntoIter = I>>(iter: T) -> Self {
        Self {
            iter: Some(iter.into_iter()),
            current: None,
            err: None,
        }
    }
}

impl<I> ReadStream for IterSource<I>
where
    I: Iterator,
    I::Item: Clone + Default,
{
    type Item = I::Item;

    fn advance(&mut self) -> bool {
        self.current = None;
        let Some(iter) = self.iter.as_mut() else {
            return false;
        };
        match iter.next() {
            Some(item) => {
                self.current = Some(item);
                true
            }
            None => {
                self.err = Some(StreamError::Eof);
                self.iter = None;
                false
            }
        }
    }

    fn current(&self) -> I::Item {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.err.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        self.iter = None;
        self.current = None;
        Ok(())
    }
}
