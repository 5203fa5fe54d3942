//! Semantic highlighting for Java: the checks a compiler front end performs after resolution,
//! reported as [`Diagnostic`]s with quick-fix descriptors.
//!
//! The entry point is [`highlight_file`], which walks one resolved [`JavaFile`] and returns what
//! it found. Hosts that keep a [`HighlightHolder`] across passes, or want to see engine faults,
//! use [`try_highlight_file`] instead.

mod calls;
pub mod codes;
mod constant;
mod context;
mod diagnostic;
mod error;
mod format;
mod holder;
mod model;
mod rules;
mod signature;
mod visitor;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use nova_config::HighlightingConfig;
use nova_core::TextSize;
use nova_hir::JavaFile;

pub use crate::diagnostic::{Diagnostic, DiagnosticBuilder, Fix, QuickFix, Severity};
pub use crate::error::{HighlightError, Result};
pub use crate::holder::HighlightHolder;
pub use crate::model::{Program, ProgramModel};

use crate::context::FileContext;
use crate::visitor::Visitor;

/// Runs every check over `file`, recording into `holder`.
///
/// The holder is writable for the duration of the pass and frozen afterwards, whether or not the
/// pass succeeded.
pub fn try_highlight_file(
    model: &dyn ProgramModel,
    file: &JavaFile,
    config: &HighlightingConfig,
    holder: &mut HighlightHolder,
) -> Result<()> {
    let ctx = FileContext::new(model, file, config);
    let _span = tracing::debug_span!(
        target: "nova.highlight",
        "highlight_file",
        file = %file.file_name,
        level = %ctx.level
    )
    .entered();

    holder.set_writable(true);
    let result = if model.is_cancelled() {
        Err(HighlightError::Cancelled)
    } else {
        Visitor::new(ctx, holder).run()
    };
    holder.set_writable(false);
    result?;

    tracing::debug!(
        target: "nova.highlight",
        diagnostics = holder.len(),
        errors = holder.error_count(),
        "highlighting finished"
    );
    Ok(())
}

/// Highlights `file` with a fresh holder. Engine faults and panics are logged and yield no
/// diagnostics for this pass.
pub fn highlight_file(model: &dyn ProgramModel, file: &JavaFile, config: &HighlightingConfig) -> Vec<Diagnostic> {
    let mut holder = HighlightHolder::new(file.file_name.clone(), TextSize::of(file.text.as_str()))
        .with_suppressed_codes(config.suppressed_codes.iter().cloned());

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        try_highlight_file(model, file, config, &mut holder)
    }));
    match outcome {
        Ok(Ok(())) => holder.into_diagnostics(),
        Ok(Err(HighlightError::Cancelled)) => {
            tracing::debug!(target: "nova.highlight", file = %file.file_name, "highlighting cancelled");
            Vec::new()
        }
        Ok(Err(err)) => {
            tracing::error!(
                target: "nova.highlight",
                file = %file.file_name,
                error = %err,
                "highlighting aborted"
            );
            Vec::new()
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref()).unwrap_or("<non-string panic payload>");
            tracing::error!(
                target: "nova.highlight",
                file = %file.file_name,
                panic = %message,
                "panic while highlighting"
            );
            Vec::new()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return Some(message);
    }
    payload.downcast_ref::<String>().map(String::as_str)
}
