//! overflowbuf
//!
//! Disk-overflow byte buffers for Rust.
//!
//! `overflowbuf` keeps the first `capacity` bytes of a stream in memory and
//! transparently spills the rest to a temporary file, then reads everything
//! back as one contiguous stream. It is designed for high-frequency,
//! short-lived staging such as:
//!
//! - buffering request/response bodies
//! - retrying uploads from a rewindable source
//! - holding payloads of unknown size without unbounded memory
//!
//! The crate intentionally:
//! - does NOT compress or encrypt
//! - does NOT share one buffer across threads
//! - does NOT support random access reads
//! - does NOT persist anything past process exit
//!
//! A buffer is written once, then read (and rewound) as often as needed,
//! then closed. A [`BufferPool`] recycles small buffers between uses.
//!
//! # Sync
//!
//! ```
//! use std::io::{Read, Write};
//! use overflowbuf::{BufferConfig, BufferPool};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = BufferPool::new();
//!     let mut buf = pool.acquire(&BufferConfig::new(4).with_prefix("body-"));
//!
//!     buf.write_all(b"abcdefgh")?; // "efgh" lands in a temp file
//!
//!     let mut body = Vec::new();
//!     buf.read_to_end(&mut body)?;
//!     assert_eq!(body, b"abcdefgh");
//!
//!     pool.release(buf)?; // removes the temp file, recycles the buffer
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use overflowbuf::{stage_async, OverflowBuffer};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead>(body: R) -> Result<(), overflowbuf::OverflowError> {
//!     let (mut buf, n) = stage_async(body, OverflowBuffer::with_capacity(64 * 1024)).await?;
//!     println!("staged {} bytes", n);
//!     buf.close()
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod error;
mod util;

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface (intentionally tiny)
//

pub use buffer::{
    BufferPool, MAX_POOLED_ALLOCATION, OverflowBuffer, ReleaseFn, StagedBody, acquire,
    default_pool, release,
};
pub use config::{BufferConfig, DEFAULT_CAPACITY, DEFAULT_MAX_IDLE, DEFAULT_PREFIX, PoolConfig};
pub use error::OverflowError;
pub use util::CallbackReader;

#[cfg(feature = "async-io")]
pub use async_stream::{StageAsync, stage_async};
