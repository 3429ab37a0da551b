//! Configuration for buffers and pools.
//!
//! - [`BufferConfig`] - In-memory capacity and backing file placement
//! - [`PoolConfig`] - How many idle buffers a [`BufferPool`](crate::BufferPool) keeps
//!
//! # Example
//!
//! ```
//! use overflowbuf::{BufferConfig, PoolConfig};
//!
//! // 64 KiB in memory, overflow into /var/tmp/upload-XXXXXX
//! let config = BufferConfig::new(64 * 1024)
//!     .with_dir("/var/tmp")
//!     .with_prefix("upload-");
//!
//! let pool = PoolConfig::new(16)?;
//! # Ok::<(), overflowbuf::OverflowError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::error::OverflowError;

/// Default in-memory capacity (2 KiB).
pub const DEFAULT_CAPACITY: usize = 2 * 1024;

/// Default filename prefix for backing files.
pub const DEFAULT_PREFIX: &str = "overflowbuf";

/// Default number of idle buffers a pool retains.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Where and when an [`OverflowBuffer`](crate::OverflowBuffer) spills to disk.
///
/// - `capacity` - bytes held in memory before writes go to the backing file
/// - `dir` - directory for the backing file; empty means [`std::env::temp_dir`]
/// - `prefix` - backing file name prefix, followed by a random suffix
///
/// # Example
///
/// ```
/// use overflowbuf::BufferConfig;
///
/// let config = BufferConfig::new(4096);
/// assert_eq!(config.capacity(), 4096);
/// assert_eq!(config.temp_dir(), std::env::temp_dir());
///
/// let config = config.with_dir("/srv/spool").with_prefix("body-");
/// assert_eq!(config.prefix(), "body-");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferConfig {
    capacity: usize,
    dir: PathBuf,
    prefix: String,
}

impl BufferConfig {
    /// Creates a configuration with the given in-memory capacity, the
    /// platform temp directory and [`DEFAULT_PREFIX`].
    ///
    /// A capacity of zero is valid: every written byte goes to the file.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            dir: PathBuf::new(),
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    /// Sets the in-memory capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the directory backing files are created in.
    ///
    /// An empty path selects the platform temp directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Sets the backing file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the in-memory capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured directory, possibly empty.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the backing file name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the directory backing files are actually created in.
    pub fn temp_dir(&self) -> PathBuf {
        if self.dir.as_os_str().is_empty() {
            std::env::temp_dir()
        } else {
            self.dir.clone()
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Configuration for a [`BufferPool`](crate::BufferPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    max_idle: usize,
}

impl PoolConfig {
    /// Creates a pool configuration retaining at most `max_idle` buffers.
    ///
    /// # Errors
    ///
    /// Returns [`OverflowError::InvalidConfig`] if `max_idle` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use overflowbuf::PoolConfig;
    ///
    /// assert_eq!(PoolConfig::new(8)?.max_idle(), 8);
    /// assert!(PoolConfig::new(0).is_err());
    /// # Ok::<(), overflowbuf::OverflowError>(())
    /// ```
    pub fn new(max_idle: usize) -> Result<Self, OverflowError> {
        if max_idle == 0 {
            return Err(OverflowError::InvalidConfig {
                message: "max_idle must be non-zero",
            });
        }
        Ok(Self { max_idle })
    }

    /// Returns the maximum number of idle buffers retained.
    pub fn max_idle(&self) -> usize {
        self.max_idle
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle: DEFAULT_MAX_IDLE,
        }
    }
}
