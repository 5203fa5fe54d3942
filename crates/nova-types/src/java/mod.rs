//! Java-specific helpers for the type model.
//!
//! The formatters here are stable and intended for diagnostic messages.

pub mod format;
pub mod helpers;
pub mod overload;
