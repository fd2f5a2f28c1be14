use crate::error::{Result, StreamError};
use crate::stream::ReadStream;

/// A stream over an owned `Vec<T>`.
///
/// An optional terminal error can be injected with [`MemorySource::with_error`];
/// it is reported once the items are exhausted, which makes failure paths of
/// downstream operators easy to exercise.
///
/// ```
/// use pullflow::{MemorySource, ReadStream};
///
/// let mut s = MemorySource::from_vec(vec!["a", "b"]);
/// assert_eq!(s.current(), ""); // nothing read yet
/// assert!(s.advance());
/// assert_eq!(s.current(), "a");
/// ```
#[derive(Debug)]
pub struct MemorySource<T> {
    items: std::vec::IntoIter<T>,
    current: Option<T>,
    injected: Option<StreamError>,
    err: Option<StreamError>,
    closed: bool,
}

impl<T> MemorySource<T> {
    /// Stream the items of `items` in order.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter(),
            current: None,
            injected: None,
            err: None,
            closed: false,
        }
    }

    /// Stream `items`, then terminate with `err` instead of clean exhaustion.
    #[must_use]
    pub fn with_error(items: Vec<T>, err: StreamError) -> Self {
        Self {
            injected: Some(err),
            ..Self::from_vec(items)
        }
    }

    /// Items not yet advanced over.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl<T> From<Vec<T>> for MemorySource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T> FromIterator<T> for MemorySource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone + Default> ReadStream for MemorySource<T> {
    type Item = T;

    fn advance(&mut self) -> bool {
        if self.closed || self.err.is_some() {
            self.current = None;
            return false;
        }
        match self.items.next() {
            Some(item) => {
                self.current = Some(item);
                true
            }
            None => {
                self.current = None;
                self.err = Some(self.injected.take().unwrap_or(StreamError::Eof));
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
        if !self.closed {
            self.closed = true;
            self.current = None;
            self.items = Vec::new().into_iter();
            tracing::trace!("memory source closed");
        }
        Ok(())
    }
}
