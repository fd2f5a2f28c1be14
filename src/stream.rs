//! Pull and push contracts every adapter and operator implements.
//!
//! A [`ReadStream`] is advanced one step at a time:
//!
//! ```text
//! Fresh ──advance()──▶ Active ──advance()──▶ Active ...
//!   │                    │
//!   └──────────┬─────────┘
//!              ▼
//!      Exhausted | Failed        (advance() returned false; see error())
//!
//! any state ──close()──▶ Closed  (terminal, idempotent)
//! ```
//!
//! The per-step contract is *advance-then-read*: call [`ReadStream::advance`]
//! and only when it returns `true` inspect [`ReadStream::current`]. Reading
//! before the first successful advance, or after an advance returned `false`,
//! yields `Item::default()` and never panics.
//!
//! A [`WriteStream`] is the push-side dual. A [`Transform`] renders a whole
//! stream into a byte sink.

use crate::bridge::StreamIter;
use crate::error::{Result, StreamError, TransferError};
use crate::ops::{Filter, FilterMap, Map, TryMap};
use crate::source::Concat;
use crate::window::{Batch, Flatten, Group};
use std::io::Write;

/// A pull-based, single-consumer sequence of items.
pub trait ReadStream {
    /// Item produced by each successful step.
    type Item;

    /// Try to produce the next item.
    ///
    /// Returns `true` iff a new item is available through [`current`](Self::current).
    /// Returns `false` on clean exhaustion and on failure; the two are told
    /// apart with [`error`](Self::error).
    fn advance(&mut self) -> bool;

    /// The item produced by the most recent successful [`advance`](Self::advance),
    /// or `Item::default()` when there is none.
    fn current(&self) -> Self::Item;

    /// Terminal error, if any. May hold [`StreamError::Eof`] for leaf adapters.
    fn error(&self) -> Option<&StreamError>;

    /// Release underlying resources. Calling it again is a no-op returning `Ok`.
    ///
    /// # Errors
    /// Returns the failure reported by the underlying resource on the first call.
    fn close(&mut self) -> Result<()>;
}

/// A push-based, single-producer item sink.
pub trait WriteStream {
    /// Item accepted by [`write`](Self::write).
    type Item;

    /// Accept one item, returning the units written (bytes for byte sinks,
    /// `1` per item for in-memory sinks).
    ///
    /// # Errors
    /// Once a write has failed, every later call returns the same error
    /// without side effects.
    fn write(&mut self, item: Self::Item) -> Result<u64>;

    /// Make buffered state externally observable.
    ///
    /// # Errors
    /// Returns the sticky write error, or the underlying flush failure.
    fn flush(&mut self) -> Result<()>;

    /// Release underlying resources. Calling it again is a no-op returning `Ok`.
    ///
    /// # Errors
    /// Returns the failure reported by the underlying resource on the first call.
    fn close(&mut self) -> Result<()>;
}

/// Render a whole stream into a byte sink.
pub trait Transform {
    /// Write every item of the wrapped stream to `w`.
    ///
    /// Returns the number of records written (not bytes).
    ///
    /// # Errors
    /// A marshal failure, an I/O failure, or a non-clean stream error aborts
    /// the transform; `TransferError::written` holds the records emitted so far.
    fn write_to(&mut self, w: &mut dyn Write) -> Result<u64, TransferError>;
}

/// Boxed, dynamically dispatched read stream.
pub type BoxStream<'a, T> = Box<dyn ReadStream<Item = T> + 'a>;

/// Boxed, dynamically dispatched write stream.
pub type BoxSink<'a, T> = Box<dyn WriteStream<Item = T> + 'a>;

impl<S: ReadStream + ?Sized> ReadStream for Box<S> {
    type Item = S::Item;

    fn advance(&mut self) -> bool {
        (**self).advance()
    }
    fn current(&self) -> Self::Item {
        (**self).current()
    }
    fn error(&self) -> Option<&StreamError> {
        (**self).error()
    }
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: ReadStream + ?Sized> ReadStream for &mut S {
    type Item = S::Item;

    fn advance(&mut self) -> bool {
        (**self).advance()
    }
    fn current(&self) -> Self::Item {
        (**self).current()
    }
    fn error(&self) -> Option<&StreamError> {
        (**self).error()
    }
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<W: WriteStream + ?Sized> WriteStream for Box<W> {
    type Item = W::Item;

    fn write(&mut self, item: Self::Item) -> Result<u64> {
        (**self).write(item)
    }
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<W: WriteStream + ?Sized> WriteStream for &mut W {
    type Item = W::Item;

    fn write(&mut self, item: Self::Item) -> Result<u64> {
        (**self).write(item)
    }
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Fluent combinators over any [`ReadStream`].
///
/// ```
/// use pullflow::*;
///
/// let mut batches = MemorySource::from_vec(vec![1, 2, 3, 4, 5, 6, 7])
///     .filter(|x: &i32| x % 2 == 1)
///     .map(|x: i32| x * 10)
///     .batch(3);
/// let got = consume(&mut batches).unwrap();
/// assert_eq!(got, vec![vec![10, 30, 50], vec![70]]);
/// ```
pub trait ReadStreamExt: ReadStream + Sized {
    /// Apply `f` to every item.
    fn map<V, F>(self, f: F) -> Map<Self, F, V>
    where
        F: FnMut(Self::Item) -> V,
    {
        Map::new(self, f)
    }

    /// Apply a fallible `f` to every item; the first failure ends the stream.
    fn try_map<V, F>(self, f: F) -> TryMap<Self, F, V>
    where
        F: FnMut(Self::Item) -> anyhow::Result<V>,
    {
        TryMap::new(self, f)
    }

    /// Keep only the items for which `p` holds.
    fn filter<P>(self, p: P) -> Filter<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Filter::new(self, p)
    }

    /// Filter and map in one pass.
    fn filter_map<V, F>(self, f: F) -> FilterMap<Self, F, V>
    where
        F: FnMut(Self::Item) -> Option<V>,
    {
        FilterMap::new(self, f)
    }

    /// Chunk items into `Vec`s of `size` items; the last chunk may be shorter.
    fn batch(self, size: usize) -> Batch<Self> {
        Batch::new(self, size)
    }

    /// Group consecutive items sharing the key produced by `key_fn`.
    fn group_by<K, F>(self, key_fn: F) -> Group<Self, F, K>
    where
        F: FnMut(&Self::Item) -> K,
        K: PartialEq,
    {
        Group::new(self, key_fn)
    }

    /// Group consecutive equal items.
    #[allow(clippy::type_complexity)]
    fn compact(self) -> Group<Self, fn(&Self::Item) -> Self::Item, Self::Item>
    where
        Self::Item: Clone + PartialEq,
    {
        Group::new(self, <Self::Item as Clone>::clone as fn(&Self::Item) -> Self::Item)
    }

    /// Yield every element of every collection produced by this stream.
    fn flatten(self) -> Flatten<Self>
    where
        Self::Item: IntoIterator,
    {
        Flatten::new(self)
    }

    /// Read `other` after this stream is cleanly exhausted.
    fn chain<'a, S>(self, other: S) -> Concat<'a, Self::Item>
    where
        Self: 'a,
        S: ReadStream<Item = Self::Item> + 'a,
    {
        Concat::new(vec![Box::new(self), Box::new(other)])
    }

    /// Erase the concrete type.
    fn boxed<'a>(self) -> BoxStream<'a, Self::Item>
    where
        Self: 'a,
    {
        Box::new(self)
    }

    /// Iterate with `for`, closing the stream exactly once when iteration
    /// finishes or the iterator is dropped.
    fn items(self) -> StreamIter<Self> {
        StreamIter::new(self)
    }
}

impl<S: ReadStream> ReadStreamExt for S {}
