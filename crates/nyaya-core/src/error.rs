//! # Error Types
//!
//! Shared error type for the foundational layer. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! Only construction failures are errors here. The expected outcomes of
//! normal operation (an undetermined offence, a missing incident date) are
//! modelled as ordinary return values by the modules that produce them.

use thiserror::Error;

/// Top-level error type for the foundational layer.
#[derive(Error, Debug)]
pub enum NyayaError {
    /// Input failed validation (identifier shape, date format).
    #[error("validation error: {0}")]
    Validation(String),
}
