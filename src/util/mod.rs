//! Small I/O helpers.

use std::fmt;
use std::io::{self, Read};

/// A reader that runs a callback, handed the inner reader, when closed.
///
/// Reads pass straight through. [`close`](CallbackReader::close) consumes
/// the wrapper and gives the inner reader to the callback, which decides
/// what happens to it (return it to a pool, delete a file, ...). Dropping
/// the wrapper without closing just drops the inner reader.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use overflowbuf::CallbackReader;
///
/// let mut reader = CallbackReader::new(&b"somebytes"[..], |rest: &[u8]| {
///     assert!(rest.is_empty());
///     Ok(())
/// });
///
/// let mut content = Vec::new();
/// reader.read_to_end(&mut content)?;
/// assert_eq!(content, b"somebytes");
/// reader.close()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct CallbackReader<R, F> {
    inner: R,
    on_close: Option<F>,
}

impl<R, F> CallbackReader<R, F>
where
    F: FnOnce(R) -> io::Result<()>,
{
    /// Wraps `inner`, calling `on_close` with it on close.
    pub fn new(inner: R, on_close: F) -> Self {
        Self {
            inner,
            on_close: Some(on_close),
        }
    }

    /// Runs the close callback, if any, with the inner reader.
    ///
    /// # Errors
    ///
    /// Returns whatever the callback returns.
    pub fn close(self) -> io::Result<()> {
        match self.on_close {
            Some(on_close) => on_close(self.inner),
            None => Ok(()),
        }
    }
}

impl<R> CallbackReader<R, fn(R) -> io::Result<()>> {
    /// Wraps `inner` with no close callback; closing is a no-op.
    pub fn without_callback(inner: R) -> Self {
        Self {
            inner,
            on_close: None,
        }
    }
}

impl<R, F> CallbackReader<R, F> {
    /// Returns a reference to the inner reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns a mutable reference to the inner reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read, F> Read for CallbackReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: fmt::Debug, F> fmt::Debug for CallbackReader<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackReader")
            .field("inner", &self.inner)
            .field("has_callback", &self.on_close.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_close_without_callback() {
        let reader = CallbackReader::without_callback(&b""[..]);
        assert!(reader.close().is_ok());
    }

    #[test]
    fn test_close_returns_callback_error() {
        let reader = CallbackReader::new(&b""[..], |_: &[u8]| Err(io::Error::other("foo")));
        let err = reader.close().unwrap_err();
        assert_eq!(err.to_string(), "foo");
    }

    #[test]
    fn test_callback_receives_inner() {
        let seen = Cell::new(0usize);
        let mut reader = CallbackReader::new(&b"abcdef"[..], |rest: &[u8]| {
            seen.set(rest.len());
            Ok(())
        });

        let mut head = [0u8; 4];
        reader.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"abcd");
        reader.close().unwrap();
        assert_eq!(seen.get(), 2);
    }
}
