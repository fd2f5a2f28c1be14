//! Error types shared by every stream, sink and transform.
//!
//! Streams distinguish two terminal outcomes:
//! - **clean termination** ([`StreamError::Eof`]): there are no more items. Leaf
//!   adapters may store it, but terminal consumers never surface it.
//! - **failure**: every other variant. It aborts the pull chain and is handed
//!   back to the caller.
//!
//! [`StreamError`] is `Clone` so a sink can return the same sticky error on
//! every write after the first failure.

use std::sync::Arc;
use thiserror::Error;

/// Convenience type alias for results using [`StreamError`].
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Terminal error of a stream or sink.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StreamError {
    /// Clean end of input. Never reported to callers by terminal consumers.
    #[error("end of stream")]
    Eof,

    /// The stream or sink was used after `close()`.
    #[error("stream is closed")]
    Closed,

    /// I/O failure reading from or writing to the underlying resource.
    #[error("io error: {0}")]
    Io(Arc<std::io::Error>),

    /// A line read from a byte source was not valid UTF-8.
    #[error("decode error on line {line}: {source}")]
    Decode {
        /// 1-based line number.
        line: u64,
        /// Underlying UTF-8 failure.
        source: std::string::FromUtf8Error,
    },

    /// JSON encode or decode failure.
    #[error("json error: {0}")]
    Json(Arc<serde_json::Error>),

    /// CSV encode or decode failure.
    #[cfg(feature = "io-csv")]
    #[error("csv error: {0}")]
    Csv(Arc<csv::Error>),

    /// Failure raised by a user callback or an external collaborator.
    #[error("{0:#}")]
    Other(Arc<anyhow::Error>),
}

impl StreamError {
    /// `true` for the clean-termination sentinel.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, StreamError::Eof)
    }

    /// Wrap any displayable message as an [`StreamError::Other`].
    pub fn msg<M>(message: M) -> Self
    where
        M: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        StreamError::Other(Arc::new(anyhow::Error::msg(message)))
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Json(Arc::new(err))
    }
}

#[cfg(feature = "io-csv")]
impl From<csv::Error> for StreamError {
    fn from(err: csv::Error) -> Self {
        StreamError::Csv(Arc::new(err))
    }
}

impl From<anyhow::Error> for StreamError {
    fn from(err: anyhow::Error) -> Self {
        // Round-trip: a StreamError that went through `?` in a user callback
        // comes back as itself.
        match err.downcast::<StreamError>() {
            Ok(inner) => inner,
            Err(err) => StreamError::Other(Arc::new(err)),
        }
    }
}

/// Returns the error only if it is a real failure.
///
/// Clean termination maps to `None`; this is the translation every terminal
/// consumer applies to `ReadStream::error()`.
#[must_use]
pub fn failure(err: Option<&StreamError>) -> Option<StreamError> {
    match err {
        Some(e) if !e.is_eof() => Some(e.clone()),
        _ => None,
    }
}

/// A copy operation aborted part-way through.
///
/// Returned by [`pipe`](crate::pipe) and the serialization transforms; `written`
/// counts the units successfully delivered before the failure.
#[derive(Debug, Clone, Error)]
#[error("transfer aborted after {written} units: {source}")]
pub struct TransferError {
    /// Units written before the failure.
    pub written: u64,
    /// The failure that aborted the transfer.
    #[source]
    pub source: StreamError,
}

impl TransferError {
    pub(crate) fn new(written: u64, source: impl Into<StreamError>) -> Self {
        Self {
            written,
            source: source.into(),
        }
    }
}

/// A fan-out operation aborted part-way through.
///
/// `written[i]` is the number of units destination `i` accepted before the
/// failure.
#[derive(Debug, Clone, Error)]
#[error("multicast aborted: {source}")]
pub struct MulticastError {
    /// Per-destination unit counts, in destination order.
    pub written: Vec<u64>,
    /// The failure that aborted the fan-out.
    #[source]
    pub source: StreamError,
}
