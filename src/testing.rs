//! Testing utilities for stream pipelines.
//!
//! - **Assertions**: compare drained streams with expected results
//! - **Mocks**: sources, sinks, writers and cursors that count calls or fail
//!   on demand, for exercising error and close paths
//! - **Mock I/O**: temporary files for file-backed sources and sinks
//!
//! # Quick Start
//!
//! ```
//! use pullflow::*;
//! use pullflow::testing::*;
//!
//! let src = TrackedSource::new(MemorySource::from_vec(vec![1, 2, 3]));
//! let closes = src.close_count();
//! assert_stream_yields(src.map(|x: i32| x * 2), &[2, 4, 6]);
//! assert_eq!(closes.get(), 1);
//! ```

pub mod assertions;
pub mod mock_io;
pub mod mocks;

pub use assertions::*;
pub use mock_io::*;
pub use mocks::*;
