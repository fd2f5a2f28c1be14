//! Leaf adapters that turn collections, channels, byte readers and row
//! cursors into [`ReadStream`](crate::ReadStream)s, plus the [`Concat`] fan-in.
//!
//! Every leaf adapter owns the resource it wraps and is the only place that
//! releases it. Clean exhaustion is recorded as [`StreamError::Eof`](crate::StreamError::Eof)
//! and never reported as a failure by terminal consumers.

mod channel;
mod concat;
mod cursor;
mod lines;
mod memory;

pub use channel::{ChannelReceiver, ChannelSource};
pub use concat::Concat;
pub use cursor::{CursorSource, RowCursor};
pub use lines::LineSource;
pub use memory::MemorySource;
