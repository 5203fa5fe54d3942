use nova_config::{ConfigValidationError, ConfigWarning, NovaConfig};
use nova_core::JavaLanguageLevel;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

#[test]
fn reports_unknown_keys_with_full_paths() {
    let text = r#"
typo = 1

[highlighting]
report_uncheked = false

[logging]
levle = "debug"
"#;

    let (_config, diagnostics) =
        NovaConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(
        diagnostics.unknown_keys,
        vec!["highlighting.report_uncheked", "logging.levle", "typo"]
    );
}

#[test]
fn unknown_keys_do_not_disturb_known_values() {
    let text = r#"
[highlighting]
language_level = "1.7"
colour = "red"
"#;

    let (config, diagnostics) =
        NovaConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(config.highlighting.language_level, JavaLanguageLevel::Jdk1_7);
    assert_eq!(diagnostics.unknown_keys, vec!["highlighting.colour"]);
    assert!(diagnostics.is_ok());
}

#[test]
fn reports_malformed_and_duplicate_suppressed_codes() {
    let text = r#"
[highlighting]
suppressed_codes = ["DUPLICATE_CLASS", "duplicate class", "DUPLICATE_CLASS"]
"#;

    let (_config, diagnostics) =
        NovaConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(
        diagnostics.errors,
        vec![ConfigValidationError::InvalidValue {
            toml_path: "highlighting.suppressed_codes[1]".to_string(),
            message: "diagnostic codes are upper-case identifiers such as `DUPLICATE_CLASS`"
                .to_string(),
        }]
    );
    assert_eq!(
        diagnostics.warnings,
        vec![ConfigWarning::DuplicateSuppressedCode {
            code: "DUPLICATE_CLASS".to_string()
        }]
    );
}

#[test]
fn reports_invalid_logging_level() {
    let text = r#"
[logging]
level = "nova=notalevel"
buffer_lines = 0
"#;

    let (_config, diagnostics) =
        NovaConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(
        diagnostics.warnings,
        vec![ConfigWarning::LoggingLevelInvalid {
            value: "nova=notalevel".to_string(),
            normalized: "nova=notalevel".to_string(),
        }]
    );
    assert_eq!(
        diagnostics.errors,
        vec![ConfigValidationError::LoggingBufferLinesZero]
    );
}

#[test]
fn unknown_language_level_is_a_parse_error() {
    let err = NovaConfig::load_from_str_with_diagnostics(
        "[highlighting]\nlanguage_level = \"11\"\n",
    )
    .expect_err("11 is not a supported language level");
    assert!(err.to_string().starts_with("failed to parse toml config"));
}

#[test]
fn loads_diagnostics_from_a_file() {
    let file = NamedTempFile::new().expect("temp file");
    std::fs::write(
        file.path(),
        "[highlighting]\nreport_reassigned_parameters = false\nunused = 1\n",
    )
    .expect("write config");

    let (config, diagnostics) =
        NovaConfig::load_from_path_with_diagnostics(file.path()).expect("config should load");
    assert!(!config.highlighting.report_reassigned_parameters);
    assert_eq!(diagnostics.unknown_keys, vec!["highlighting.unused"]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = NovaConfig::load_from_path(dir.path().join("absent.toml"))
        .expect_err("file does not exist");
    assert!(matches!(err, nova_config::ConfigError::Io { .. }));
}
