//! Shared pool of reusable overflow buffers.

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::buffer::OverflowBuffer;
use crate::config::{BufferConfig, PoolConfig};
use crate::error::OverflowError;
use crate::util::CallbackReader;

/// Buffers whose in-memory allocation grew past this many bytes are not
/// kept by a pool.
pub const MAX_POOLED_ALLOCATION: usize = 2048;

/// A staged body: a filled buffer that goes back to its pool on close.
pub type StagedBody = CallbackReader<OverflowBuffer, ReleaseFn>;

/// Callback run when a [`StagedBody`] is closed.
pub type ReleaseFn = Box<dyn FnOnce(OverflowBuffer) -> io::Result<()> + Send>;

/// A thread-safe free list of [`OverflowBuffer`]s.
///
/// Cloning a pool is cheap and yields a handle to the same free list.
///
/// [`release`](BufferPool::release) closes the buffer first, so a buffer
/// handed back to the pool never keeps a backing file on disk.
///
/// # Example
///
/// ```
/// use std::io::{Read, Write};
/// use overflowbuf::{BufferConfig, BufferPool};
///
/// let pool = BufferPool::new();
/// let mut buf = pool.acquire(&BufferConfig::new(16));
/// buf.write_all(b"request body")?;
///
/// let mut body = Vec::new();
/// buf.read_to_end(&mut body)?;
/// pool.release(buf)?;
///
/// assert_eq!(pool.idle(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug, Default)]
struct PoolInner {
    free: Mutex<Vec<OverflowBuffer>>,
    config: PoolConfig,
}

impl BufferPool {
    /// Creates an empty pool with the default [`PoolConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty pool with the given configuration.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                free: Mutex::new(Vec::new()),
                config,
            }),
        }
    }

    /// Returns the number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.inner.free.lock().len()
    }

    /// Takes a buffer from the pool, or creates one, set up with `config`.
    ///
    /// The buffer is always in a fresh write phase: empty, no backing file.
    pub fn acquire(&self, config: &BufferConfig) -> OverflowBuffer {
        let recycled = self.inner.free.lock().pop();
        match recycled {
            Some(mut buffer) => {
                trace!(allocated = buffer.allocated(), "recycled pooled buffer");
                buffer.configure(config);
                buffer
            }
            None => {
                trace!("pool empty, allocating buffer");
                OverflowBuffer::new(config.clone())
            }
        }
    }

    /// Closes `buffer` and keeps it for reuse.
    ///
    /// Buffers whose allocation exceeds [`MAX_POOLED_ALLOCATION`], or that
    /// arrive while the pool already holds its maximum number of idle
    /// buffers, are dropped instead.
    ///
    /// # Errors
    ///
    /// Returns the error from [`OverflowBuffer::close`] if the backing file
    /// cannot be removed. The buffer is dropped in that case.
    pub fn release(&self, mut buffer: OverflowBuffer) -> Result<(), OverflowError> {
        if let Err(e) = buffer.close() {
            warn!(error = %e, "failed to close buffer on release");
            return Err(e);
        }

        let allocated = buffer.allocated();
        if allocated > MAX_POOLED_ALLOCATION {
            debug!(allocated, "discarding oversized buffer");
            return Ok(());
        }

        buffer.reset();
        let mut free = self.inner.free.lock();
        if free.len() >= self.inner.config.max_idle() {
            debug!(idle = free.len(), "pool full, discarding buffer");
            return Ok(());
        }
        free.push(buffer);
        trace!(idle = free.len(), "buffer returned to pool");
        Ok(())
    }

    /// Drains `reader` into a pooled buffer and returns it ready for reading.
    ///
    /// Closing the returned reader releases the buffer back to this pool.
    /// Dropping it without closing still removes any backing file, but the
    /// buffer is not reused.
    ///
    /// # Errors
    ///
    /// Returns [`OverflowError::Io`] with op `"stage"` if reading from
    /// `reader` or writing into the buffer fails.
    ///
    /// # Example
    ///
    /// ```
    /// use std::io::Read;
    /// use overflowbuf::{BufferConfig, BufferPool};
    ///
    /// let pool = BufferPool::new();
    /// let mut body = pool.stage(&b"streamed body"[..], &BufferConfig::new(4))?;
    ///
    /// let mut out = String::new();
    /// body.read_to_string(&mut out)?;
    /// assert_eq!(out, "streamed body");
    ///
    /// body.close()?;
    /// assert_eq!(pool.idle(), 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn stage<R: Read>(
        &self,
        mut reader: R,
        config: &BufferConfig,
    ) -> Result<StagedBody, OverflowError> {
        let mut buffer = self.acquire(config);
        if let Err(source) = io::copy(&mut reader, &mut buffer) {
            // release logs its own failure; the copy error is the one to report
            let _ = self.release(buffer);
            return Err(OverflowError::Io { op: "stage", source });
        }

        let pool = self.clone();
        let on_close: ReleaseFn =
            Box::new(move |buffer: OverflowBuffer| pool.release(buffer).map_err(io::Error::from));
        Ok(CallbackReader::new(buffer, on_close))
    }
}

static DEFAULT_POOL: OnceLock<BufferPool> = OnceLock::new();

/// Returns the process-wide pool used by [`acquire`] and [`release`].
pub fn default_pool() -> &'static BufferPool {
    DEFAULT_POOL.get_or_init(BufferPool::new)
}

/// Takes a buffer from the process-wide pool.
///
/// An empty `dir` selects the platform temp directory.
///
/// # Example
///
/// ```
/// let buf = overflowbuf::acquire(128, "", "upload-");
/// assert_eq!(buf.capacity(), 128);
/// assert_eq!(buf.prefix(), "upload-");
/// overflowbuf::release(buf)?;
/// # Ok::<(), overflowbuf::OverflowError>(())
/// ```
pub fn acquire(
    capacity: usize,
    dir: impl Into<PathBuf>,
    prefix: impl Into<String>,
) -> OverflowBuffer {
    let config = BufferConfig::new(capacity).with_dir(dir).with_prefix(prefix);
    default_pool().acquire(&config)
}

/// Closes `buffer` and returns it to the process-wide pool.
///
/// See [`BufferPool::release`].
pub fn release(buffer: OverflowBuffer) -> Result<(), OverflowError> {
    default_pool().release(buffer)
}
