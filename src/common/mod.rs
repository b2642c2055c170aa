//! Common types and utilities shared across the crate.

pub mod error;
pub mod xml;

pub use error::{Error, Result};
