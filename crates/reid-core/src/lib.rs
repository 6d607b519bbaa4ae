//! Core types and utilities for the federated re-ID dataset partitioner.
//!
//! This crate provides the error type, configuration structures and shared
//! identifiers used across the partitioner workspace.

pub mod cli;
pub mod config;
pub mod error;
pub mod types;

pub use cli::*;
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cli::*;
    pub use crate::config::*;
    pub use crate::error::{Error, Result};
    pub use crate::types::*;
}
