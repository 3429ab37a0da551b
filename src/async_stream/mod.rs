//! Async staging into overflow buffers.
//!
//! This module drains a `futures-io::AsyncRead` into an
//! [`OverflowBuffer`](crate::OverflowBuffer), making it runtime-agnostic and
//! compatible with tokio (through `tokio-util`'s compat layer), async-std,
//! smol, and other async runtimes.
//!
//! - [`stage_async`] - Creates a future that fills a buffer from an async reader
//!
//! This module requires the `async-io` feature to be enabled.

mod stage;

pub use stage::{StageAsync, stage_async};
