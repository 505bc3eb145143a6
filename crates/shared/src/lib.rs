//! Shared types, errors, and configuration for the hotel file store.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - The closed set of storage backend kinds
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, AzureBlobSettings, DatabaseConfig, FileValidationSettings, LocalStorageSettings,
    StorageSettings,
};
pub use error::{AppError, AppResult};
pub use types::{ProviderKind, StoredFileId, UserId};
