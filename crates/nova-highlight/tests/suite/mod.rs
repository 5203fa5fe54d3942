use nova_config::HighlightingConfig;
use nova_highlight::{highlight_file, Program, ProgramModel, Severity};
use nova_hir::JavaFile;
use nova_types::TypeStore;

mod checks;
mod pass;
mod scenarios;

/// `(severity, code, message, highlighted text)` for each diagnostic, in report order.
pub(crate) type Found = (Severity, &'static str, String, String);

pub(crate) fn found(model: &dyn ProgramModel, file: &JavaFile, config: &HighlightingConfig) -> Vec<Found> {
    highlight_file(model, file, config)
        .into_iter()
        .map(|d| (d.severity, d.code, d.message, file.slice(d.range).to_string()))
        .collect()
}

pub(crate) fn highlight(store: &TypeStore, file: &JavaFile) -> Vec<Found> {
    found(&Program::new(store), file, &HighlightingConfig::default())
}

pub(crate) fn error(code: &'static str, message: &str, text: &str) -> Found {
    (Severity::Error, code, message.to_string(), text.to_string())
}
