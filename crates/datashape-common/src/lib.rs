//! Common types and utilities for the datashape type system.
//!
//! This crate provides foundational types used across all datashape crates:
//! - The error model (`Error`, `ErrorKind`, `Result`)
//! - Source spans (`Span`) and offset-to-line/column conversion
//! - Numeric literal parsing with range checks

// Error kinds and the library-wide Result alias
pub mod error;
pub use error::{Error, ErrorKind, Result};

// Span - source location tracking (byte offsets)
pub mod span;
pub use span::{Span, line_col};

// Numeric literal parsing helpers
pub mod numeric;
