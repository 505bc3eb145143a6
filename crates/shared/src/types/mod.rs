//! Common types used across the application.

pub mod id;
pub mod provider;

pub use id::*;
pub use provider::{ProviderKind, UnknownProvider};

#[cfg(test)]
mod id_tests;
