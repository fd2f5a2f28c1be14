//! Terminal consumers: drain a [`ReadStream`] into a collection, a fold or
//! one or more [`WriteStream`]s.
//!
//! Consumers borrow the stream and never close it; whoever created the
//! stream owns its `close()`. Clean termination ([`StreamError::Eof`]) is
//! never reported as an error by any function in this module.

use crate::error::{MulticastError, Result, StreamError, TransferError, failure};
use crate::stream::{ReadStream, WriteStream};
use std::collections::HashMap;
use std::hash::Hash;

/// Drain `s` into a `Vec`.
///
/// # Errors
/// Returns the stream's failure, discarding the items read so far. Use
/// [`consume_err_skip`] or drive `advance`/`current` by hand to keep partial
/// results.
pub fn consume<S: ReadStream + ?Sized>(s: &mut S) -> Result<Vec<S::Item>> {
    let mut out = Vec::new();
    while s.advance() {
        out.push(s.current());
    }
    match failure(s.error()) {
        Some(e) => Err(e),
        None => Ok(out),
    }
}

/// Alias of [`consume`].
///
/// # Errors
/// See [`consume`].
pub fn read_all<S: ReadStream + ?Sized>(s: &mut S) -> Result<Vec<S::Item>> {
    consume(s)
}

/// Drain `s`, keeping every item read on a step with no error attached.
///
/// Never fails; a failure simply ends the drain.
pub fn consume_err_skip<S: ReadStream + ?Sized>(s: &mut S) -> Vec<S::Item> {
    let mut out = Vec::new();
    while s.advance() {
        if s.error().is_none() {
            out.push(s.current());
        }
    }
    if let Some(e) = failure(s.error()) {
        tracing::debug!(error = %e, kept = out.len(), "drain stopped on failure");
    }
    out
}

/// Fold the whole stream into an accumulator.
///
/// ```
/// use pullflow::{MemorySource, reduce};
///
/// let sum = reduce(&mut MemorySource::from_vec(vec![1, 2, 3]), 0, |acc, x| acc + x).unwrap();
/// assert_eq!(sum, 6);
/// ```
///
/// # Errors
/// Returns the stream's failure instead of the accumulator.
pub fn reduce<S, A, F>(s: &mut S, initial: A, mut f: F) -> Result<A>
where
    S: ReadStream + ?Sized,
    F: FnMut(A, S::Item) -> A,
{
    let mut acc = initial;
    while s.advance() {
        acc = f(acc, s.current());
    }
    match failure(s.error()) {
        Some(e) => Err(e),
        None => Ok(acc),
    }
}

/// [`reduce`] into a `Vec`, starting empty.
///
/// # Errors
/// See [`reduce`].
pub fn reduce_slice<S, V, F>(s: &mut S, f: F) -> Result<Vec<V>>
where
    S: ReadStream + ?Sized,
    F: FnMut(Vec<V>, S::Item) -> Vec<V>,
{
    reduce(s, Vec::new(), f)
}

/// [`reduce`] into a `HashMap`, starting empty.
///
/// ```
/// use pullflow::{MemorySource, reduce_map};
///
/// let mut words = MemorySource::from_vec(vec!["a", "b", "a"]);
/// let counts = reduce_map(&mut words, |mut m, w| {
///     *m.entry(w).or_insert(0u32) += 1;
///     m
/// })
/// .unwrap();
/// assert_eq!(counts["a"], 2);
/// ```
///
/// # Errors
/// See [`reduce`].
pub fn reduce_map<S, K, V, F>(s: &mut S, f: F) -> Result<HashMap<K, V>>
where
    S: ReadStream + ?Sized,
    K: Eq + Hash,
    F: FnMut(HashMap<K, V>, S::Item) -> HashMap<K, V>,
{
    reduce(s, HashMap::new(), f)
}

/// Copy every item of `src` into `dst`, then flush `dst` once.
///
/// Returns the units reported by `dst` across all writes.
///
/// # Errors
/// The first read or write failure aborts without flushing; the returned
/// [`TransferError`] carries the units written so far.
pub fn pipe<S, W>(src: &mut S, dst: &mut W) -> Result<u64, TransferError>
where
    S: ReadStream + ?Sized,
    W: WriteStream<Item = S::Item> + ?Sized,
{
    let mut written = 0u64;
    while src.advance() {
        match dst.write(src.current()) {
            Ok(n) => written += n,
            Err(e) => {
                tracing::warn!(written, error = %e, "pipe aborted on write");
                return Err(TransferError::new(written, e));
            }
        }
    }
    if let Some(e) = failure(src.error()) {
        tracing::warn!(written, error = %e, "pipe aborted on read");
        return Err(TransferError::new(written, e));
    }
    dst.flush().map_err(|e| TransferError::new(written, e))?;
    tracing::debug!(written, "pipe complete");
    Ok(written)
}

/// Fan `src` out to every destination.
///
/// Each source item is written to every destination, in destination order,
/// before the next item is pulled. After the source is exhausted every
/// destination is flushed once, in order. With no destinations the source is
/// left untouched.
///
/// Returns per-destination unit counts.
///
/// # Errors
/// The first read, write or flush failure aborts the whole fan-out; the
/// returned [`MulticastError`] carries the per-destination counts so far.
pub fn multicast<S, T>(
    src: &mut S,
    dsts: &mut [&mut dyn WriteStream<Item = T>],
) -> Result<Vec<u64>, MulticastError>
where
    S: ReadStream<Item = T> + ?Sized,
    T: Clone,
{
    let mut written = vec![0u64; dsts.len()];
    if dsts.is_empty() {
        return Ok(written);
    }
    let abort = |written: &[u64], source: StreamError| {
        tracing::warn!(error = %source, "multicast aborted");
        MulticastError {
            written: written.to_vec(),
            source,
        }
    };

    while src.advance() {
        let item = src.current();
        for (i, dst) in dsts.iter_mut().enumerate() {
            match dst.write(item.clone()) {
                Ok(n) => written[i] += n,
                Err(e) => return Err(abort(&written, e)),
            }
        }
    }
    if let Some(e) = failure(src.error()) {
        return Err(abort(&written, e));
    }
    for dst in dsts.iter_mut() {
        dst.flush().map_err(|e| abort(&written, e))?;
    }
    tracing::debug!(destinations = dsts.len(), "multicast complete");
    Ok(written)
}

/// Write every item of `items` into `dst`, then flush once.
///
/// # Errors
/// The first write failure aborts immediately; the flush failure otherwise.
pub fn write_all<W, T>(dst: &mut W, items: Vec<T>) -> Result<u64>
where
    W: WriteStream<Item = T> + ?Sized,
{
    write_seq(dst, items)
}

/// Write every item of a native iterator into `dst`, then flush once.
///
/// A write reporting zero units is accepted as a no-op.
///
/// # Errors
/// The first write failure aborts immediately; the flush failure otherwise.
pub fn write_seq<W, I>(dst: &mut W, items: I) -> Result<u64>
where
    W: WriteStream + ?Sized,
    I: IntoIterator<Item = W::Item>,
{
    let mut written = 0u64;
    for item in items {
        written += dst.write(item)?;
    }
    dst.flush()?;
    Ok(written)
}
