//! Byte streams handed to and returned from storage providers.

use std::io::{self, Cursor, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt, ReadBuf};

/// Readable bytes returned by a download.
pub type DownloadStream = Box<dyn AsyncRead + Send + Unpin>;

/// Reader that can also seek back to its start.
trait SeekableRead: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> SeekableRead for T {}

enum Source {
    Seekable(Box<dyn SeekableRead>),
    ForwardOnly(Box<dyn AsyncRead + Send + Unpin>),
}

/// Content of an upload together with its declared length.
///
/// A provider may consume the stream partially before failing. Retrying on
/// another provider requires [`UploadStream::rewind`], which only seekable
/// sources support.
pub struct UploadStream {
    source: Source,
    len: u64,
}

impl UploadStream {
    /// In-memory content; always rewindable.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self {
            source: Source::Seekable(Box::new(Cursor::new(bytes))),
            len,
        }
    }

    /// A seekable reader (for example a `tokio::fs::File`) of `len` bytes.
    #[must_use]
    pub fn seekable<R>(reader: R, len: u64) -> Self
    where
        R: AsyncRead + AsyncSeek + Send + Unpin + 'static,
    {
        Self {
            source: Source::Seekable(Box::new(reader)),
            len,
        }
    }

    /// A reader that can only be consumed once (for example a request body).
    #[must_use]
    pub fn forward_only<R>(reader: R, len: u64) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            source: Source::ForwardOnly(Box::new(reader)),
            len,
        }
    }

    /// Declared length in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when the declared length is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether [`UploadStream::rewind`] can succeed.
    #[must_use]
    pub fn can_rewind(&self) -> bool {
        matches!(self.source, Source::Seekable(_))
    }

    /// Seek back to the first byte.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for forward-only streams, or the seek error.
    pub async fn rewind(&mut self) -> io::Result<()> {
        match &mut self.source {
            Source::Seekable(reader) => reader.seek(SeekFrom::Start(0)).await.map(|_| ()),
            Source::ForwardOnly(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "upload stream cannot be rewound",
            )),
        }
    }
}

impl AsyncRead for UploadStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.get_mut().source {
            Source::Seekable(reader) => Pin::new(&mut **reader).poll_read(cx, buf),
            Source::ForwardOnly(reader) => Pin::new(&mut **reader).poll_read(cx, buf),
        }
    }
}

impl std::fmt::Debug for UploadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadStream")
            .field("len", &self.len)
            .field("rewindable", &self.can_rewind())
            .finish_non_exhaustive()
    }
}
