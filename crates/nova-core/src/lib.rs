//! Core shared types for the Nova highlighting workspace.
//!
//! This crate is intentionally small: the text model used for diagnostic ranges and the Java
//! language level that gates version-specific checks.

mod language_level;
mod text;

pub use language_level::JavaLanguageLevel;
pub use text::{LineCol, LineIndex, TextRange, TextSize};
