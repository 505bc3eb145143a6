//! Object I/O shared by the OpenDAL-backed providers.

use hotelstore_shared::ProviderKind;
use opendal::{Operator, Writer};
use tokio::io::AsyncReadExt;
use tokio_util::compat::FuturesAsyncReadCompatExt;

use super::error::StorageError;
use super::stream::{DownloadStream, UploadStream};

pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

/// Stream `content` into a new object at `path`.
///
/// Exactly the declared number of bytes must arrive. On any failure the
/// writer is aborted so no partial object becomes visible.
pub(crate) async fn write_object(
    operator: &Operator,
    kind: ProviderKind,
    path: &str,
    content_type: &str,
    content: &mut UploadStream,
) -> Result<u64, StorageError> {
    let writer = open_writer(operator, path, content_type)
        .await
        .map_err(|e| StorageError::from_opendal(&e, path, StorageError::UploadFailed))?;
    let mut pending = PendingWrite::new(writer, path);

    let written = match pending.copy_from(content).await {
        Ok(written) => written,
        Err(reason) => {
            tracing::error!(provider = %kind, %path, error = %reason, "Upload failed");
            pending.abort().await;
            return Err(StorageError::UploadFailed(reason));
        }
    };

    pending.commit().await.map_err(|e| {
        tracing::error!(provider = %kind, %path, error = %e, "Upload commit failed");
        StorageError::from_opendal(&e, path, StorageError::UploadFailed)
    })?;

    Ok(written)
}

/// Open an existing object as a byte stream.
pub(crate) async fn read_object(
    operator: &Operator,
    kind: ProviderKind,
    path: &str,
) -> Result<DownloadStream, StorageError> {
    let failed = |e: opendal::Error| {
        if e.kind() != opendal::ErrorKind::NotFound {
            tracing::error!(provider = %kind, %path, error = %e, "Download failed");
        }
        StorageError::from_opendal(&e, path, StorageError::DownloadFailed)
    };

    let meta = operator.stat(path).await.map_err(failed)?;
    let reader = operator
        .reader_with(path)
        .chunk(CHUNK_SIZE)
        .await
        .map_err(failed)?
        .into_futures_async_read(0..meta.content_length())
        .await
        .map_err(failed)?;

    Ok(Box::new(reader.compat()))
}

/// Remove an object, reporting `NotFound` when nothing is stored at `path`.
pub(crate) async fn delete_object(
    operator: &Operator,
    kind: ProviderKind,
    path: &str,
) -> Result<(), StorageError> {
    // OpenDAL deletes are idempotent; stat first so a missing object is reported.
    operator
        .stat(path)
        .await
        .map_err(|e| StorageError::from_opendal(&e, path, StorageError::DeleteFailed))?;

    operator.delete(path).await.map_err(|e| {
        tracing::error!(provider = %kind, %path, error = %e, "Delete failed");
        StorageError::from_opendal(&e, path, StorageError::DeleteFailed)
    })
}

async fn open_writer(
    operator: &Operator,
    path: &str,
    content_type: &str,
) -> opendal::Result<Writer> {
    if operator.info().full_capability().write_with_content_type {
        operator.writer_with(path).content_type(content_type).await
    } else {
        operator.writer(path).await
    }
}

/// A writer that is aborted unless committed.
///
/// Dropping it mid-upload (for example on cancellation) schedules the abort
/// on the current runtime.
struct PendingWrite {
    writer: Option<Writer>,
    path: String,
}

impl PendingWrite {
    fn new(writer: Writer, path: &str) -> Self {
        Self {
            writer: Some(writer),
            path: path.to_string(),
        }
    }

    async fn copy_from(&mut self, content: &mut UploadStream) -> Result<u64, String> {
        let Some(writer) = self.writer.as_mut() else {
            return Err("writer already finished".to_string());
        };

        let declared = content.len();
        let mut limited = (&mut *content).take(declared.saturating_add(1));
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let n = limited.read(&mut buf).await.map_err(|e| e.to_string())?;
            if n == 0 {
                break;
            }
            written += n as u64;
            if written > declared {
                return Err(format!(
                    "content is longer than the declared {declared} bytes"
                ));
            }
            writer
                .write(buf[..n].to_vec())
                .await
                .map_err(|e| e.to_string())?;
        }

        if written < declared {
            return Err(format!(
                "content ended after {written} of {declared} declared bytes"
            ));
        }
        Ok(written)
    }

    async fn commit(mut self) -> opendal::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.close().await.map(|_| ()),
            None => Ok(()),
        }
    }

    async fn abort(mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.abort().await
        {
            tracing::warn!(path = %self.path, error = %e, "Failed to abort upload");
        }
    }
}

impl Drop for PendingWrite {
    fn drop(&mut self) {
        let Some(mut writer) = self.writer.take() else {
            return;
        };
        let path = std::mem::take(&mut self.path);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = writer.abort().await {
                    tracing::warn!(%path, error = %e, "Failed to abort dropped upload");
                }
            });
        }
    }
}
