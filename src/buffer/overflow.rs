//! Memory-first byte buffer with a lazily created backing file.
//!
//! An [`OverflowBuffer`] goes through one fill cycle:
//!
//! ```text
//!  [Writable] --write--> [Writable]
//!  [Writable] --first read or reset_read--> [Readable]
//!  [Readable] --read (exhausted)--> [Readable, eof]
//!  [Readable] --reset_read--> [Readable] (cursor rewound)
//!  [Writable|Readable] --close--> [Closed] (backing file removed)
//! ```
//!
//! Only the pool brings a closed buffer back to `Writable`.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::BytesMut;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::BufferConfig;
use crate::error::OverflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Writable,
    Readable,
    Closed,
}

/// A byte buffer that overflows to disk once its capacity has been reached.
///
/// The first [`capacity`](BufferConfig::capacity) bytes are kept in memory;
/// everything after that is appended to a temporary file created on first
/// need. Reading yields the memory prefix followed by the file contents as
/// one stream.
///
/// Writing and reading are separate phases: after the first call to
/// [`read`](Read::read) (or [`reset_read`](OverflowBuffer::reset_read)),
/// every write fails with [`OverflowError::WriteAfterRead`].
///
/// The backing file is removed by [`close`](OverflowBuffer::close), and also
/// when the buffer is dropped.
///
/// A buffer is meant to be used from one place at a time; it is `Send` but
/// callers serialize access themselves.
///
/// # Example
///
/// ```
/// use std::io::{Read, Write};
/// use overflowbuf::{BufferConfig, OverflowBuffer};
///
/// let mut buf = OverflowBuffer::new(BufferConfig::new(4));
/// buf.write_all(b"abcd")?;
/// buf.write_all(b"efgh")?;
/// assert!(buf.is_overflowed());
///
/// let mut out = String::new();
/// buf.read_to_string(&mut out)?;
/// assert_eq!(out, "abcdefgh");
///
/// buf.reset_read()?;
/// out.clear();
/// buf.read_to_string(&mut out)?;
/// assert_eq!(out, "abcdefgh");
///
/// buf.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct OverflowBuffer {
    config: BufferConfig,
    memory: BytesMut,
    read_pos: usize,
    file: Option<NamedTempFile>,
    file_len: u64,
    file_rewound: bool,
    mode: Mode,
    eof: bool,
}

impl OverflowBuffer {
    /// Creates an empty buffer in the write phase.
    ///
    /// No memory is reserved up front; the in-memory region grows as data
    /// is written, up to the configured capacity.
    pub fn new(config: BufferConfig) -> Self {
        Self {
            config,
            memory: BytesMut::new(),
            read_pos: 0,
            file: None,
            file_len: 0,
            file_rewound: false,
            mode: Mode::Writable,
            eof: false,
        }
    }

    /// Creates a buffer with the given capacity and default file placement.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(BufferConfig::new(capacity))
    }

    /// Returns the configuration this buffer was set up with.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Returns the number of bytes held in memory before overflowing.
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Returns the configured backing file directory, possibly empty.
    pub fn dir(&self) -> &Path {
        self.config.dir()
    }

    /// Returns the backing file name prefix.
    pub fn prefix(&self) -> &str {
        self.config.prefix()
    }

    /// Returns the total number of bytes written, in memory and on disk.
    pub fn len(&self) -> u64 {
        self.memory.len() as u64 + self.file_len
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of bytes held in memory.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Returns the size of the in-memory allocation.
    pub fn allocated(&self) -> usize {
        self.memory.capacity()
    }

    /// Returns `true` if a backing file has been created.
    pub fn is_overflowed(&self) -> bool {
        self.file.is_some()
    }

    /// Returns the path of the backing file, if one exists.
    pub fn backing_path(&self) -> Option<&Path> {
        self.file.as_ref().map(NamedTempFile::path)
    }

    /// Returns `true` once the buffer has entered its read phase.
    pub fn is_readable(&self) -> bool {
        self.mode == Mode::Readable
    }

    /// Returns `true` once [`close`](OverflowBuffer::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.mode == Mode::Closed
    }

    /// Rewinds reading to the start of the stream.
    ///
    /// Written content is kept, so the same data can be read again. The
    /// buffer stays in (or enters) the read phase; writes remain rejected.
    /// Has no effect on a closed buffer.
    ///
    /// # Errors
    ///
    /// Returns [`OverflowError::Io`] if the backing file cannot be seeked.
    pub fn reset_read(&mut self) -> Result<(), OverflowError> {
        if self.mode == Mode::Closed {
            return Ok(());
        }
        self.mode = Mode::Readable;
        self.read_pos = 0;
        self.eof = false;
        self.file_rewound = false;

        if let Some(file) = self.file.as_mut() {
            file.seek(SeekFrom::Start(0))
                .map_err(OverflowError::io("seek"))?;
            self.file_rewound = true;
        }
        Ok(())
    }

    /// Closes the buffer and removes its backing file, if any.
    ///
    /// The file handle is released even when removal fails; only the disk
    /// space leaks in that case. Calling `close` again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OverflowError::Io`] if the backing file cannot be removed.
    pub fn close(&mut self) -> Result<(), OverflowError> {
        self.mode = Mode::Closed;
        self.eof = true;

        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let path = file.path().to_path_buf();
        file.close().map_err(OverflowError::io("remove"))?;
        debug!(path = %path.display(), "removed overflow backing file");
        Ok(())
    }

    /// Applies a new configuration to a recycled buffer.
    pub(crate) fn configure(&mut self, config: &BufferConfig) {
        self.config.clone_from(config);
    }

    /// Returns the buffer to a fresh write phase, keeping the allocation.
    ///
    /// The backing file must already be closed.
    pub(crate) fn reset(&mut self) {
        debug_assert!(self.file.is_none(), "reset with a live backing file");
        self.memory.clear();
        self.read_pos = 0;
        self.file = None;
        self.file_len = 0;
        self.file_rewound = false;
        self.mode = Mode::Writable;
        self.eof = false;
    }

    /// Stores a prefix of `p` and returns its length.
    ///
    /// `Err` means nothing was stored. Once some bytes are in, a later
    /// failure turns into a short count and resurfaces on the next call.
    pub(crate) fn write_bytes(&mut self, p: &[u8]) -> Result<usize, OverflowError> {
        match self.mode {
            Mode::Writable => {}
            Mode::Readable => return Err(OverflowError::WriteAfterRead),
            Mode::Closed => return Err(OverflowError::Closed),
        }

        let room = self.config.capacity().saturating_sub(self.memory.len());
        let (head, tail) = p.split_at(room.min(p.len()));
        self.memory.extend_from_slice(head);
        if tail.is_empty() {
            return Ok(p.len());
        }

        match self.write_tail(tail) {
            Ok(n) => Ok(head.len() + n),
            Err(_) if !head.is_empty() => Ok(head.len()),
            Err(e) => Err(e),
        }
    }

    /// Writes all of `p`, looping over short writes.
    pub(crate) fn append(&mut self, mut p: &[u8]) -> Result<(), OverflowError> {
        while !p.is_empty() {
            match self.write_bytes(p)? {
                0 => {
                    return Err(OverflowError::Io {
                        op: "write",
                        source: io::ErrorKind::WriteZero.into(),
                    });
                }
                n => p = &p[n..],
            }
        }
        Ok(())
    }

    /// Appends to the backing file, creating it on first use.
    ///
    /// `file_len` tracks every byte that reached the file, even when a
    /// later chunk of the same call fails.
    fn write_tail(&mut self, tail: &[u8]) -> Result<usize, OverflowError> {
        let file = match self.file.take() {
            Some(file) => file,
            None => create_backing_file(&self.config)?,
        };
        let file = self.file.insert(file);

        let mut written = 0;
        while written < tail.len() {
            match file.write(&tail[written..]) {
                Ok(0) if written > 0 => break,
                Ok(0) => {
                    return Err(OverflowError::Io {
                        op: "write",
                        source: io::ErrorKind::WriteZero.into(),
                    });
                }
                Ok(n) => {
                    written += n;
                    self.file_len += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) if written > 0 => break,
                Err(e) => return Err(OverflowError::Io { op: "write", source: e }),
            }
        }
        Ok(written)
    }

    fn read_bytes(&mut self, p: &mut [u8]) -> Result<usize, OverflowError> {
        match self.mode {
            Mode::Writable => self.mode = Mode::Readable,
            Mode::Readable => {}
            Mode::Closed => return Ok(0),
        }
        if p.is_empty() || self.eof {
            return Ok(0);
        }

        let pending = &self.memory[self.read_pos..];
        let n = pending.len().min(p.len());
        p[..n].copy_from_slice(&pending[..n]);
        self.read_pos += n;
        if n == p.len() {
            return Ok(n);
        }

        let Some(file) = self.file.as_mut() else {
            self.eof = n == 0;
            return Ok(n);
        };

        // Bytes already copied from memory win over a file error; the
        // error resurfaces on the next call since no file state changed.
        if !self.file_rewound {
            match file.seek(SeekFrom::Start(0)) {
                Ok(_) => self.file_rewound = true,
                Err(_) if n > 0 => return Ok(n),
                Err(e) => return Err(OverflowError::Io { op: "seek", source: e }),
            }
        }
        match file.read(&mut p[n..]) {
            Ok(m) => {
                self.eof = n + m == 0;
                Ok(n + m)
            }
            Err(_) if n > 0 => Ok(n),
            Err(e) => Err(OverflowError::Io { op: "read", source: e }),
        }
    }
}

impl Default for OverflowBuffer {
    fn default() -> Self {
        Self::new(BufferConfig::default())
    }
}

impl Read for OverflowBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_bytes(buf)?)
    }
}

impl Write for OverflowBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => Ok(file.flush().map_err(OverflowError::io("flush"))?),
            None => Ok(()),
        }
    }
}

fn create_backing_file(config: &BufferConfig) -> Result<NamedTempFile, OverflowError> {
    let file = tempfile::Builder::new()
        .prefix(config.prefix())
        .tempfile_in(config.temp_dir())
        .map_err(OverflowError::io("create"))?;
    debug!(
        path = %file.path().display(),
        capacity = config.capacity(),
        "created overflow backing file"
    );
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(buf: &mut OverflowBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        buf.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_write_fits_in_memory() {
        let mut buf = OverflowBuffer::with_capacity(4);
        assert_eq!(buf.write(b"abcd").unwrap(), 4);
        assert!(buf.file.is_none());
        assert_eq!(buf.memory_len(), 4);
        assert_eq!(buf.mode, Mode::Writable);
    }

    #[test]
    fn test_write_splits_at_capacity() {
        let mut buf = OverflowBuffer::with_capacity(10);
        assert_eq!(buf.write(b"abcdef").unwrap(), 6);
        assert!(buf.file.is_none());

        assert_eq!(buf.write(b"ghijklmn").unwrap(), 8);
        assert_eq!(&buf.memory[..], b"abcdefghij");
        assert_eq!(buf.file_len, 4);
        assert_eq!(buf.len(), 14);
        buf.close().unwrap();
    }

    #[test]
    fn test_zero_length_write_creates_no_file() {
        let mut buf = OverflowBuffer::with_capacity(0);
        assert_eq!(buf.write(b"").unwrap(), 0);
        assert!(!buf.is_overflowed());
    }

    #[test]
    fn test_first_file_read_rewinds_once() {
        let mut buf = OverflowBuffer::with_capacity(2);
        buf.write_all(b"abcdef").unwrap();
        assert!(!buf.file_rewound);

        let mut p = [0u8; 3];
        assert_eq!(buf.read(&mut p).unwrap(), 3);
        assert_eq!(&p, b"abc");
        assert!(buf.file_rewound);

        assert_eq!(read_all(&mut buf), b"def");
        buf.close().unwrap();
    }

    #[test]
    fn test_eof_flag_is_sticky() {
        let mut buf = OverflowBuffer::with_capacity(8);
        buf.write_all(b"xy").unwrap();

        let mut p = [0u8; 8];
        assert_eq!(buf.read(&mut p).unwrap(), 2);
        assert!(!buf.eof);
        assert_eq!(buf.read(&mut p).unwrap(), 0);
        assert!(buf.eof);
        assert_eq!(buf.read(&mut p).unwrap(), 0);
    }

    #[test]
    fn test_zero_length_read_enters_read_phase_without_eof() {
        let mut buf = OverflowBuffer::with_capacity(0);
        assert_eq!(buf.read(&mut [0u8; 0]).unwrap(), 0);
        assert_eq!(buf.mode, Mode::Readable);
        assert!(!buf.eof);
    }

    #[test]
    fn test_reset_clears_state_but_keeps_allocation() {
        let mut buf = OverflowBuffer::with_capacity(100);
        buf.write_all(&[7u8; 100]).unwrap();
        buf.write_all(b"spill").unwrap();
        read_all(&mut buf);
        buf.close().unwrap();

        let allocated = buf.allocated();
        buf.reset();

        assert!(buf.memory.is_empty());
        assert_eq!(buf.allocated(), allocated);
        assert_eq!(buf.read_pos, 0);
        assert_eq!(buf.file_len, 0);
        assert!(buf.file.is_none());
        assert!(!buf.file_rewound);
        assert!(!buf.eof);
        assert_eq!(buf.mode, Mode::Writable);
    }

    #[test]
    fn test_file_failure_after_memory_is_short_write() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("later");
        let mut buf = OverflowBuffer::new(BufferConfig::new(2).with_dir(&missing));

        // Memory takes "ab", the file cannot be created for "c"
        assert_eq!(buf.write_bytes(b"abc").unwrap(), 2);
        assert_eq!(buf.len(), 2);
        assert!(buf.file.is_none());

        // With nothing stored, the failure is reported
        assert!(matches!(
            buf.write_bytes(b"c"),
            Err(OverflowError::Io { op: "create", .. })
        ));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_append_loops_until_stored() {
        let mut buf = OverflowBuffer::with_capacity(3);
        buf.append(b"abcdefg").unwrap();
        assert_eq!(buf.memory_len(), 3);
        assert_eq!(buf.file_len, 4);
        assert_eq!(read_all(&mut buf), b"abcdefg");
        buf.close().unwrap();
    }

    #[test]
    fn test_closed_buffer_rejects_writes() {
        let mut buf = OverflowBuffer::with_capacity(4);
        buf.close().unwrap();
        assert!(matches!(buf.write_bytes(b"a"), Err(OverflowError::Closed)));
        assert_eq!(buf.read(&mut [0u8; 4]).unwrap(), 0);
    }
}
