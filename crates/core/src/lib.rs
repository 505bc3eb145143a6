//! Core file storage logic for the hotel platform.
//!
//! This crate contains the storage core with ZERO web or database dependencies.
//! Metadata persistence is reached through [`files::StoredFileRepository`],
//! implemented by the db crate.
//!
//! # Modules
//!
//! - `storage` - Upload validation and the Azure Blob / local filesystem providers
//! - `files` - Upload, download and delete orchestration with provider failover

pub mod files;
pub mod storage;
