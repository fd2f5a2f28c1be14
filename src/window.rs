//! Windowing operators: fixed-size [`Batch`]es, consecutive-key [`Group`]s
//! and their structural inverse, [`Flatten`].
//!
//! ## Partial windows and failures
//! When the inner stream stops while a window is being filled, the partially
//! filled window is still delivered. An inner *failure* observed at that
//! point is held back and only surfaces through `error()` on the following
//! `advance()`, so consumers always see the buffered data first:
//!
//! ```text
//! inner:  1 2 3 4 5 ✗
//! batch(3):  advance → [1,2,3]   error() = None
//!            advance → [4,5]     error() = None
//!            advance → false     error() = Some(✗)
//! ```
//!
//! The window returned by `current()` is only valid for one step. Consumers
//! that need it later must keep the returned `Vec`.

use crate::error::{Result, StreamError, failure};
use crate::stream::ReadStream;

/// Upper bound on the capacity reserved for a batch before it is filled.
const MAX_BATCH_RESERVE: usize = 1024;

/// Tracks the end of the inner stream for windowing operators.
#[derive(Debug, Default)]
struct Ending {
    /// Inner stream stopped; no more pulls.
    done: bool,
    /// Failure seen while filling the last window, not yet reported.
    deferred: Option<StreamError>,
    /// Failure reported through `error()`.
    reported: Option<StreamError>,
}

impl Ending {
    fn record<S: ReadStream + ?Sized>(&mut self, inner: &S) {
        self.done = true;
        self.deferred = failure(inner.error());
    }

    /// Surface a deferred failure. Returns `true` if nothing more can be read.
    fn finished(&mut self) -> bool {
        if let Some(e) = self.deferred.take() {
            self.reported = Some(e);
        }
        self.done
    }
}

/// Chunks the inner stream into `Vec`s of `size` items.
///
/// Every batch except possibly the last has exactly `size` items; the last
/// has between 1 and `size`. An empty inner stream yields no batches.
pub struct Batch<S: ReadStream> {
    inner: S,
    size: usize,
    current: Option<Vec<S::Item>>,
    end: Ending,
}

impl<S: ReadStream> Batch<S> {
    /// Batch `inner` into chunks of `size` (a `size` of zero is treated as one).
    pub fn new(inner: S, size: usize) -> Self {
        Self {
            inner,
            size: size.max(1),
            current: None,
            end: Ending::default(),
        }
    }
}

impl<S> ReadStream for Batch<S>
where
    S: ReadStream,
    S::Item: Clone,
{
    type Item = Vec<S::Item>;

    fn advance(&mut self) -> bool {
        self.current = None;
        if self.end.finished() {
            return false;
        }
        let mut buf = Vec::with_capacity(self.size.min(MAX_BATCH_RESERVE));
        while buf.len() < self.size {
            if !self.inner.advance() {
                self.end.record(&self.inner);
                break;
            }
            buf.push(self.inner.current());
        }
        if buf.is_empty() {
            // Nothing buffered: report the failure now instead of on the next call.
            return !self.end.finished();
        }
        self.current = Some(buf);
        true
    }

    fn current(&self) -> Vec<S::Item> {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.end.reported.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.inner.close()
    }
}

/// Groups *consecutive* items that share a key.
///
/// Adjacency is strict: a key reappearing after a different key starts a new
/// group. One item of lookahead is carried between calls, since a group only
/// ends when the first item of the next group has been read.
///
/// ```
/// use pullflow::*;
///
/// let mut groups = MemorySource::from_vec(vec!["a", "a", "b", "b", "b", "a"]).compact();
/// assert_eq!(
///     consume(&mut groups).unwrap(),
///     vec![vec!["a", "a"], vec!["b", "b", "b"], vec!["a"]]
/// );
/// ```
pub struct Group<S: ReadStream, F, K> {
    inner: S,
    key_fn: F,
    pending: Option<(K, S::Item)>,
    current: Option<Vec<S::Item>>,
    end: Ending,
}

impl<S: ReadStream, F, K> Group<S, F, K> {
    /// Group `inner` by the key produced by `key_fn`.
    pub fn new(inner: S, key_fn: F) -> Self {
        Self {
            inner,
            key_fn,
            pending: None,
            current: None,
            end: Ending::default(),
        }
    }
}

impl<S, F, K> ReadStream for Group<S, F, K>
where
    S: ReadStream,
    S::Item: Clone,
    F: FnMut(&S::Item) -> K,
    K: PartialEq,
{
    type Item = Vec<S::Item>;

    fn advance(&mut self) -> bool {
        self.current = None;
        let (key, first) = match self.pending.take() {
            Some(head) => head,
            None => {
                if self.end.finished() || !self.inner.advance() {
                    if !self.end.done {
                        self.end.record(&self.inner);
                    }
                    self.end.finished();
                    return false;
                }
                let item = self.inner.current();
                ((self.key_fn)(&item), item)
            }
        };

        let mut group = vec![first];
        while !self.end.done {
            if !self.inner.advance() {
                self.end.record(&self.inner);
                break;
            }
            let item = self.inner.current();
            let k = (self.key_fn)(&item);
            if k == key {
                group.push(item);
            } else {
                self.pending = Some((k, item));
                break;
            }
        }
        self.current = Some(group);
        true
    }

    fn current(&self) -> Vec<S::Item> {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.end.reported.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.pending = None;
        self.inner.close()
    }
}

/// Yields every element of every collection produced by the inner stream.
///
/// Empty collections are skipped. `Flatten` over [`Batch`] reproduces the
/// original items in order; the batch boundaries are lost.
pub struct Flatten<S>
where
    S: ReadStream,
    S::Item: IntoIterator,
{
    inner: S,
    pending: Option<<S::Item as IntoIterator>::IntoIter>,
    current: Option<<S::Item as IntoIterator>::Item>,
}

impl<S> Flatten<S>
where
    S: ReadStream,
    S::Item: IntoIterator,
{
    /// Flatten `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: None,
            current: None,
        }
    }
}

impl<S, T> ReadStream for Flatten<S>
where
    S: ReadStream,
    S::Item: IntoIterator<Item = T>,
    T: Clone + Default,
{
    type Item = T;

    fn advance(&mut self) -> bool {
        self.current = None;
        loop {
            if let Some(item) = self.pending.as_mut().and_then(Iterator::next) {
                self.current = Some(item);
                return true;
            }
            if !self.inner.advance() {
                self.pending = None;
                return false;
            }
            self.pending = Some(self.inner.current().into_iter());
        }
    }

    fn current(&self) -> T {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.inner.error()
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.pending = None;
        self.inner.close()
    }
}
