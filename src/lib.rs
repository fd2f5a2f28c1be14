//! # Pullflow
//!
//! A **pull-based stream processing engine** for Rust. Pipelines are built
//! out of small, independently testable operators over a uniform pull
//! abstraction, and end in a terminal consumer or a serialization transform
//! that writes the stream to a byte sink.
//!
//! ## Key Features
//!
//! - **One pull contract** - [`ReadStream`] with `advance` / `current` / `error` / `close`
//! - **Sources** - in-memory collections, channels, line-split byte readers, row cursors, native iterators
//! - **Element-wise operators** - map, try_map, filter, filter_map
//! - **Windowing** - fixed-size batches, consecutive-key groups, flatten
//! - **Terminal consumers** - consume, reduce, pipe (1→1), multicast (1→N)
//! - **Serialization** - JSON array, NDJSON and CSV transforms (optional via feature flags)
//! - **Iterator bridge** - drive a stream from a `for` loop; close runs exactly once
//!
//! ## Quick Start
//!
//! ```
//! use pullflow::*;
//! use serde::Serialize;
//!
//! #[derive(Clone, Default, Serialize)]
//! struct User { id: u32, name: String }
//!
//! let lines = LineSource::new("1 Alice\n2 Bob\nbad\n3 Carol\n".as_bytes());
//! let users = lines.filter_map(|line: String| {
//!     let (id, name) = line.split_once(' ')?;
//!     Some(User { id: id.parse().ok()?, name: name.to_string() })
//! });
//!
//! let mut out = Vec::new();
//! let n = NdJson::new(users).write_to(&mut out).unwrap();
//! assert_eq!(n, 3);
//! assert!(String::from_utf8(out).unwrap().starts_with("{\"id\":1,\"name\":\"Alice\"}\n"));
//! ```
//!
//! ## Core Concepts
//!
//! ### Streams
//!
//! A [`ReadStream`] owns a cursor and a terminal-error slot. The consumer
//! calls [`advance`](ReadStream::advance) and, only when it returns `true`,
//! reads [`current`](ReadStream::current). Reading at any other time yields
//! `Item::default()`. When `advance` returns `false`,
//! [`error`](ReadStream::error) tells clean exhaustion from failure.
//!
//! ### Errors
//!
//! Clean termination is the [`StreamError::Eof`] sentinel. Leaf adapters may
//! store it, but terminal consumers never report it. Everything else is a
//! failure that aborts the pull chain.
//!
//! ### Sinks
//!
//! A [`WriteStream`] accepts items one at a time and must be flushed before
//! its output is durable. Errors are sticky.
//!
//! ### Scheduling
//!
//! Single-threaded, synchronous and pull-only: the consumer sets the pace
//! by calling `advance`. Cancelling is stopping and calling `close`. Only
//! [`ChannelSource`] acknowledges another thread, by blocking on its
//! receiver.
//!
//! ## Feature Flags
//!
//! - `io-jsonl` - JSON array / NDJSON transforms and the JSON Lines source
//! - `io-csv` - CSV transform and source
//! - `compression-gzip` / `compression-zstd` - transparent compression for file helpers
//!
//! ## Module Overview
//!
//! - [`stream`] - Pull/push contracts and the fluent [`ReadStreamExt`]
//! - [`source`] - Leaf sources and the [`Concat`] fan-in
//! - [`sink`] - Memory and byte-writer sinks
//! - [`ops`] - Element-wise operators
//! - [`window`] - Batch, Group and Flatten
//! - [`consume`] - Terminal consumers
//! - [`io`] - Serialization transforms, decoding sources and file helpers
//! - [`bridge`] - Native iterator bridge
//! - [`testing`] - Assertions and mocks for pipeline tests

pub mod bridge;
pub mod consume;
pub mod error;
pub mod io;
pub mod ops;
pub mod sink;
pub mod source;
pub mod stream;
pub mod testing;
pub mod window;

// General re-exports
pub use bridge::{IterSource, StreamIter};
pub use consume::{
    consume, consume_err_skip, multicast, pipe, read_all, reduce, reduce_map, reduce_slice,
    write_all, write_seq,
};
pub use error::{MulticastError, Result, StreamError, TransferError};
pub use io::compression::{CompressedWriter, FinishWrite};
pub use io::fs::{create_sink, open_lines, write_to_path};
pub use ops::{Filter, FilterMap, Map, TryMap};
pub use sink::{MemorySink, WriterSink};
pub use source::{
    ChannelReceiver, ChannelSource, Concat, CursorSource, LineSource, MemorySource, RowCursor,
};
pub use stream::{BoxSink, BoxStream, ReadStream, ReadStreamExt, Transform, WriteStream};
pub use window::{Batch, Flatten, Group};

// Gated re-exports
#[cfg(feature = "io-jsonl")]
pub use io::json::{JsonArray, JsonLinesOptions, JsonLinesSource, NdJson};

#[cfg(feature = "io-jsonl")]
pub use io::fs::open_json_lines;

#[cfg(feature = "io-csv")]
pub use io::csv::{Csv, CsvOptions, CsvSource, Separator};

#[cfg(feature = "io-csv")]
pub use io::fs::open_csv;
