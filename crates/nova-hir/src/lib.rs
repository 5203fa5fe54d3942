//! Resolved program tree for Java source files.
//!
//! A [`JavaFile`] owns per-kind arenas of declarations, statements and expressions. Trees are built
//! with [`FileBuilder`] over the real source text, so every node range points into the file, and are
//! resolved against a [`nova_types::TypeStore`] when the builder finishes.

mod builder;
mod hir;
mod ids;
mod resolve;
mod scan;
mod walk;

pub use builder::FileBuilder;
pub use hir::*;
pub use ids::*;
pub use walk::NodeId;
