//! Core types for ghrab
//!
//! Provides the error taxonomy used across the assembly pipeline and the
//! user-facing error presentation used by the CLI.
//!
//! - [`GhrabError`] - enumerated failure modes with stable report kinds
//! - [`ErrorContext`] - user-friendly wrapper with suggestions and details
//! - [`user_friendly_error`] - convert any error to the display form

pub mod error;

pub use error::{ErrorContext, GhrabError, user_friendly_error};
