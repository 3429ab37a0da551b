//! Overflow buffers and the pool that recycles them.
//!
//! - [`OverflowBuffer`] - Memory-first byte stream that spills to a temp file
//! - [`BufferPool`] - Thread-safe free list of buffers, plus a process-wide default

mod overflow;
mod pool;

pub use overflow::OverflowBuffer;
pub use pool::{
    BufferPool, MAX_POOLED_ALLOCATION, ReleaseFn, StagedBody, acquire, default_pool, release,
};
