//! Stateless element-wise operators: [`Map`], [`TryMap`], [`Filter`] and
//! [`FilterMap`].
//!
//! Each operator wraps exactly one inner stream, pulls from it on demand and
//! delegates `close()` to it. None of them own the underlying resource.

use crate::error::{Result, StreamError};
use crate::stream::ReadStream;

/// Applies `f` to every item of the inner stream.
///
/// The mapped value is computed once per successful advance and cached.
pub struct Map<S, F, V> {
    inner: S,
    f: F,
    current: Option<V>,
}

impl<S, F, V> Map<S, F, V> {
    pub(crate) fn new(inner: S, f: F) -> Self {
        Self {
            inner,
            f,
            current: None,
        }
    }
}

impl<S, F, V> ReadStream for Map<S, F, V>
where
    S: ReadStream,
    F: FnMut(S::Item) -> V,
    V: Clone + Default,
{
    type Item = V;

    fn advance(&mut self) -> bool {
        self.current = None;
        if !self.inner.advance() {
            return false;
        }
        self.current = Some((self.f)(self.inner.current()));
        true
    }

    fn current(&self) -> V {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.inner.error()
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.inner.close()
    }
}

/// Applies a fallible `f` to every item.
///
/// The first failure of `f` ends the stream. That failure takes precedence
/// over, and is reported instead of, any later inner error.
pub struct TryMap<S, F, V> {
    inner: S,
    f: F,
    current: Option<V>,
    err: Option<StreamError>,
}

impl<S, F, V> TryMap<S, F, V> {
    pub(crate) fn new(inner: S, f: F) -> Self {
        Self {
            inner,
            f,
            current: None,
            err: None,
        }
    }
}

impl<S, F, V> ReadStream for TryMap<S, F, V>
where
    S: ReadStream,
    F: FnMut(S::Item) -> anyhow::Result<V>,
    V: Clone + Default,
{
    type Item = V;

    fn advance(&mut self) -> bool {
        self.current = None;
        if self.err.is_some() || !self.inner.advance() {
            return false;
        }
        match (self.f)(self.inner.current()) {
            Ok(v) => {
                self.current = Some(v);
                true
            }
            Err(e) => {
                self.err = Some(e.into());
                false
            }
        }
    }

    fn current(&self) -> V {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.err.as_ref().or_else(|| self.inner.error())
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.inner.close()
    }
}

/// Keeps only the items satisfying `p`.
///
/// `advance` keeps pulling from the inner stream until `p` holds or the inner
/// stream stops.
pub struct Filter<S, P> {
    inner: S,
    p: P,
    matched: bool,
}

impl<S, P> Filter<S, P> {
    pub(crate) fn new(inner: S, p: P) -> Self {
        Self {
            inner,
            p,
            matched: false,
        }
    }
}

impl<S, P> ReadStream for Filter<S, P>
where
    S: ReadStream,
    S::Item: Default,
    P: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn advance(&mut self) -> bool {
        self.matched = false;
        while self.inner.advance() {
            if (self.p)(&self.inner.current()) {
                self.matched = true;
                return true;
            }
        }
        false
    }

    fn current(&self) -> S::Item {
        if self.matched {
            self.inner.current()
        } else {
            S::Item::default()
        }
    }

    fn error(&self) -> Option<&StreamError> {
        self.inner.error()
    }

    fn close(&mut self) -> Result<()> {
        self.matched = false;
        self.inner.close()
    }
}

/// Filter and map in one pass: items for which `f` returns `None` are
/// dropped, the rest are replaced by the returned value.
pub struct FilterMap<S, F, V> {
    inner: S,
    f: F,
    current: Option<V>,
}

impl<S, F, V> FilterMap<S, F, V> {
    pub(crate) fn new(inner: S, f: F) -> Self {
        Self {
            inner,
            f,
            current: None,
        }
    }
}

impl<S, F, V> ReadStream for FilterMap<S, F, V>
where
    S: ReadStream,
    F: FnMut(S::Item) -> Option<V>,
    V: Clone + Default,
{
    type Item = V;

    fn advance(&mut self) -> bool {
        self.current = None;
        while self.inner.advance() {
            if let Some(v) = (self.f)(self.inner.current()) {
                self.current = Some(v);
                return true;
            }
        }
        false
    }

    fn current(&self) -> V {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.inner.error()
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::StreamError;
    use crate::source::MemorySource;
    use crate::stream::{ReadStream, ReadStreamExt};

    #[test]
    fn map_reads_default_before_advance() {
        let mut s = MemorySource::from_vec(vec![1, 2]).map(|x: i32| x.to_string());
        assert_eq!(s.current(), "");
        assert!(s.advance());
        assert_eq!(s.current(), "1");
        assert_eq!(s.current(), "1");
    }

    #[test]
    fn filter_reads_default_after_exhaustion() {
        let mut s = MemorySource::from_vec(vec![1, 2, 3]).filter(|x: &i32| *x == 2);
        assert!(s.advance());
        assert_eq!(s.current(), 2);
        assert!(!s.advance());
        assert_eq!(s.current(), 0);
    }

    #[test]
    fn try_map_error_wins_over_inner_error() {
        let src = MemorySource::with_error(vec![1, 2, 3], StreamError::msg("inner"));
        let mut s = src.try_map(|x: i32| {
            if x == 2 {
                anyhow::bail!("mapping failed on {x}");
            }
            Ok(x)
        });
        assert!(s.advance());
        assert!(!s.advance());
        assert!(!s.advance());
        assert_eq!(
            s.error().map(ToString::to_string).as_deref(),
            Some("mapping failed on 2")
        );
    }

    #[test]
    fn filter_map_evaluates_once_per_item() {
        let mut calls = 0;
        let mut s = MemorySource::from_vec(vec!["1", "x", "3"]).filter_map(|v: &str| {
            calls += 1;
            v.parse::<u8>().ok()
        });
        let mut got = Vec::new();
        while s.advance() {
            got.push(s.current());
        }
        drop(s);
        assert_eq!(got, vec![1, 3]);
        assert_eq!(calls, 3);
    }
}
