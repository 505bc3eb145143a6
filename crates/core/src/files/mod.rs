//! Stored files: upload orchestration, metadata and access URLs.
//!
//! [`FileStorageService`] validates uploads, writes the bytes to the primary
//! storage provider (failing over to the other one when allowed), persists a
//! [`StoredFile`] record and guards deletion with the in-use check.

mod error;
mod repository;
mod service;
mod types;
mod url;

pub use error::{ErrorDetail, FileError};
pub use repository::StoredFileRepository;
pub use service::FileStorageService;
pub use types::{FileDownload, FileSummary, StoredFile, UploadFileInput};
pub use url::{ApiFileUrlResolver, FileUrlResolver};
