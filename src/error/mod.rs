//! Error types for overflowbuf.

use std::fmt;
use std::io;

/// Errors that can occur while filling, draining or recycling a buffer.
///
/// End of stream is not an error: reads report it as `Ok(0)`, following the
/// [`std::io::Read`] contract.
#[derive(Debug)]
pub enum OverflowError {
    /// A write was attempted after the buffer entered its read phase.
    ///
    /// The fill cycle is over; start a new buffer to write more data.
    WriteAfterRead,

    /// A write was attempted on a buffer that has been closed.
    Closed,

    /// An I/O error occurred on the backing file.
    Io {
        /// The operation that failed (`"create"`, `"write"`, `"read"`, ...).
        op: &'static str,
        /// The underlying error.
        source: io::Error,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl OverflowError {
    /// Wraps an I/O error with the name of the operation that produced it.
    pub(crate) fn io(op: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| OverflowError::Io { op, source }
    }

    /// Recovers an `OverflowError` carried inside an [`io::Error`].
    ///
    /// The [`std::io::Read`] and [`std::io::Write`] impls of
    /// [`OverflowBuffer`](crate::OverflowBuffer) can only return
    /// `io::Error`; this gives the original error back.
    ///
    /// # Example
    ///
    /// ```
    /// use std::io::{Read, Write};
    /// use overflowbuf::{OverflowBuffer, OverflowError};
    ///
    /// let mut buf = OverflowBuffer::with_capacity(8);
    /// buf.read(&mut [0u8; 4])?;
    ///
    /// let err = buf.write(b"late").unwrap_err();
    /// assert!(matches!(
    ///     OverflowError::from_io(&err),
    ///     Some(OverflowError::WriteAfterRead)
    /// ));
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn from_io(err: &io::Error) -> Option<&OverflowError> {
        err.get_ref()?.downcast_ref::<OverflowError>()
    }
}

impl fmt::Display for OverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowError::WriteAfterRead => {
                write!(f, "write called after read or reset_read")
            }
            OverflowError::Closed => write!(f, "buffer is closed"),
            OverflowError::Io { op, source } => write!(f, "overflow buffer {}: {}", op, source),
            OverflowError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
        }
    }
}

impl std::error::Error for OverflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverflowError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<OverflowError> for io::Error {
    fn from(e: OverflowError) -> Self {
        let kind = match &e {
            OverflowError::Io { source, .. } => source.kind(),
            OverflowError::WriteAfterRead | OverflowError::Closed => io::ErrorKind::Unsupported,
            OverflowError::InvalidConfig { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, e)
    }
}
