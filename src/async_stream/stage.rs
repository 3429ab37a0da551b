//! Future that stages an async reader into an overflow buffer.
//!
//! # Example
//!
//! ```ignore
//! use overflowbuf::{stage_async, OverflowBuffer};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead>(body: R) -> Result<(), overflowbuf::OverflowError> {
//!     let (mut buffer, n) = stage_async(body, OverflowBuffer::with_capacity(4096)).await?;
//!     println!("staged {} bytes, on disk: {}", n, buffer.is_overflowed());
//!     buffer.close()
//! }
//! ```

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::future::FusedFuture;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::buffer::OverflowBuffer;
use crate::error::OverflowError;

/// Size of each read from the source.
const SCRATCH_SIZE: usize = 8192;

pin_project! {
    /// A future that reads an async source to its end into an
    /// [`OverflowBuffer`].
    ///
    /// Resolves to the filled buffer and the number of bytes staged. Writes
    /// into the buffer are synchronous and may block on the backing file.
    ///
    /// If staging fails the buffer is dropped, which removes any backing
    /// file, and the future is finished: polling again returns an error.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct StageAsync<R> {
        #[pin]
        reader: R,
        buffer: Option<OverflowBuffer>,
        scratch: Vec<u8>,
        staged: u64,
        finished: bool,
    }
}

/// Stages everything `reader` yields into `buffer`.
///
/// The buffer must still be in its write phase; data is appended after
/// anything already written. Errors from the source are reported as
/// [`OverflowError::Io`] with op `"stage"`, errors from the buffer as-is.
pub fn stage_async<R: AsyncRead>(reader: R, buffer: OverflowBuffer) -> StageAsync<R> {
    StageAsync {
        reader,
        buffer: Some(buffer),
        scratch: vec![0u8; SCRATCH_SIZE],
        staged: 0,
        finished: false,
    }
}

impl<R: AsyncRead> Future for StageAsync<R> {
    type Output = Result<(OverflowBuffer, u64), OverflowError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        if *this.finished {
            return Poll::Ready(Err(OverflowError::Io {
                op: "stage",
                source: io::Error::other("staging already finished"),
            }));
        }

        loop {
            let n = match this.reader.as_mut().poll_read(cx, &mut this.scratch[..]) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(source)) => {
                    *this.finished = true;
                    *this.buffer = None;
                    return Poll::Ready(Err(OverflowError::Io { op: "stage", source }));
                }
                Poll::Ready(Ok(n)) => n,
            };

            if n == 0 {
                // End of stream
                *this.finished = true;
                return match this.buffer.take() {
                    Some(buffer) => Poll::Ready(Ok((buffer, *this.staged))),
                    None => Poll::Ready(Err(OverflowError::Closed)),
                };
            }

            let Some(buffer) = this.buffer.as_mut() else {
                *this.finished = true;
                return Poll::Ready(Err(OverflowError::Closed));
            };
            if let Err(e) = buffer.append(&this.scratch[..n]) {
                *this.finished = true;
                *this.buffer = None;
                return Poll::Ready(Err(e));
            }
            *this.staged += n as u64;
        }
    }
}

impl<R: AsyncRead> FusedFuture for StageAsync<R> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}
