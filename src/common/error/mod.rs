//! Unified error types for the templater.
//!
//! This module provides a unified error type that encompasses errors from the
//! package layer and the presentation layer, presenting a consistent API to users.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
