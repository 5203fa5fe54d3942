use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use nova_config::{init_tracing, HighlightingConfig, LoggingConfig};
use nova_core::TextSize;
use nova_highlight::{
    codes, highlight_file, try_highlight_file, Diagnostic, HighlightError, HighlightHolder, Program,
};
use nova_hir::{FileBuilder, JavaFile};
use nova_types::TypeStore;
use pretty_assertions::assert_eq;

use super::found;

/// Two duplicate methods and a stray `break`.
fn sloppy_file(store: &mut TypeStore) -> JavaFile {
    let text = "class A { void f() {} void f() { break; } }";
    let mut b = FileBuilder::new(store, "A.java", text);
    b.class("class A", |b| {
        b.method("void f()", |_| ());
        b.method("void f()", |b| {
            b.break_(None);
        });
    });
    b.finish()
}

fn codes_of(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
    diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn repeated_passes_agree() {
    let mut store = TypeStore::with_minimal_jdk();
    let file = sloppy_file(&mut store);
    let program = Program::new(&store);
    let config = HighlightingConfig::default();

    let first = highlight_file(&program, &file, &config);
    let second = highlight_file(&program, &file, &config);
    assert_eq!(codes_of(&first), vec![codes::DUPLICATE_METHOD, codes::BREAK_OUTSIDE]);
    assert_eq!(first, second);
}

#[test]
fn holder_is_frozen_after_the_pass() {
    let mut store = TypeStore::with_minimal_jdk();
    let file = sloppy_file(&mut store);
    let program = Program::new(&store);
    let config = HighlightingConfig::default();

    let mut holder = HighlightHolder::new(file.file_name.clone(), TextSize::of(file.text.as_str()));
    try_highlight_file(&program, &file, &config, &mut holder).unwrap();
    assert!(!holder.is_writable());
    assert_eq!(holder.error_count(), 2);

    let late = Diagnostic::error(codes::BREAK_OUTSIDE, "late", Default::default());
    assert_eq!(holder.add(Some(late)), Err(HighlightError::SinkNotWritable));
    assert_eq!(holder.clear(), Err(HighlightError::SinkNotWritable));
    assert_eq!(holder.len(), 2);

    // A second pass into the same holder appends.
    try_highlight_file(&program, &file, &config, &mut holder).unwrap();
    assert_eq!(holder.error_count(), 4);
}

#[test]
fn suppressed_codes_never_reach_the_caller() {
    let mut store = TypeStore::with_minimal_jdk();
    let file = sloppy_file(&mut store);
    let config = HighlightingConfig {
        suppressed_codes: vec![codes::DUPLICATE_METHOD.to_string()],
        ..HighlightingConfig::default()
    };

    let kept: Vec<&str> = found(&Program::new(&store), &file, &config)
        .into_iter()
        .map(|(_, code, _, _)| code)
        .collect();
    assert_eq!(kept, vec![codes::BREAK_OUTSIDE]);
}

#[test]
fn cancelled_pass_reports_nothing() {
    let mut store = TypeStore::with_minimal_jdk();
    let file = sloppy_file(&mut store);
    let flag = Arc::new(AtomicBool::new(true));
    let program = Program::new(&store).with_cancellation(flag);
    let config = HighlightingConfig::default();

    assert_eq!(highlight_file(&program, &file, &config), vec![]);

    let mut holder = HighlightHolder::new(file.file_name.clone(), TextSize::of(file.text.as_str()));
    assert_eq!(
        try_highlight_file(&program, &file, &config, &mut holder),
        Err(HighlightError::Cancelled)
    );
    assert!(!holder.is_writable());
    assert!(holder.is_empty());
}

#[test]
fn diagnostics_serialize_for_hosts() {
    let mut store = TypeStore::with_minimal_jdk();
    let file = sloppy_file(&mut store);
    let diagnostics = highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());

    let json = serde_json::to_value(&diagnostics[0]).unwrap();
    assert_eq!(json["severity"], "error");
    assert_eq!(json["code"], codes::DUPLICATE_METHOD);
    assert_eq!(json["message"], "'f()' is already defined in 'A'");
    assert_eq!(json["fixes"], serde_json::json!([]));
}

#[test]
fn finished_passes_are_logged() {
    let logging = LoggingConfig {
        level: "nova.highlight=debug".to_string(),
        stderr: false,
        ..LoggingConfig::default()
    };
    let buffer = init_tracing(&logging);

    let mut store = TypeStore::with_minimal_jdk();
    let file = sloppy_file(&mut store);
    highlight_file(&Program::new(&store), &file, &HighlightingConfig::default());

    let lines = buffer.last_lines(usize::MAX);
    assert!(
        lines.iter().any(|line| line.contains("highlighting finished")),
        "{lines:#?}"
    );
}
