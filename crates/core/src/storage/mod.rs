//! Storage backends for uploaded files.
//!
//! Every backend implements [`StorageProvider`]:
//!
//! - [`BlobStorageProvider`] - Azure Blob Storage through Apache OpenDAL
//! - [`LocalFileStorageProvider`] - a directory on the local filesystem, also through OpenDAL
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    StorageProvider                       │
//! ├──────────────────────────────────────────────────────────┤
//! │ upload(stream, name, type, container) -> UploadedObject  │
//! │ download(blob_path)                   -> DownloadStream  │
//! │ delete(blob_path)                     -> ()              │
//! │ is_available()                        -> bool            │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod blob;
mod error;
mod local;
mod object;
mod provider;
mod stream;
mod validator;

pub use blob::BlobStorageProvider;
pub use error::StorageError;
pub use local::LocalFileStorageProvider;
pub use provider::{
    StorageProvider, UploadedObject, build_providers, generate_stored_file_name, join_blob_path,
    sanitize_filename,
};
pub use stream::{DownloadStream, UploadStream};
pub use validator::{FileValidator, ValidationError, file_extension};
