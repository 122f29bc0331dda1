//! Common types and utilities shared across the index.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and node sizing
//! - Error types
//! - The minimum degree `t`

pub mod config;
mod degree;
pub mod error;

pub use config::BTreeConfig;
pub use degree::MinDegree;
pub use error::{Error, Result};
