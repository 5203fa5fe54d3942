use std::collections::HashSet;

use crate::{ConfigDiagnostics, ConfigValidationError, ConfigWarning, LoggingConfig, NovaConfig};

impl NovaConfig {
    pub(crate) fn validate(&self, out: &mut ConfigDiagnostics) {
        validate_highlighting(self, out);
        validate_logging(self, out);
    }
}

fn validate_highlighting(config: &NovaConfig, out: &mut ConfigDiagnostics) {
    let mut seen = HashSet::new();
    for (idx, code) in config.highlighting.suppressed_codes.iter().enumerate() {
        let code = code.trim();
        let well_formed = !code.is_empty()
            && code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
        if !well_formed {
            out.errors.push(ConfigValidationError::InvalidValue {
                toml_path: format!("highlighting.suppressed_codes[{idx}]"),
                message: "diagnostic codes are upper-case identifiers such as `DUPLICATE_CLASS`"
                    .to_owned(),
            });
            continue;
        }
        if !seen.insert(code) {
            out.warnings.push(ConfigWarning::DuplicateSuppressedCode {
                code: code.to_owned(),
            });
        }
    }
}

fn validate_logging(config: &NovaConfig, out: &mut ConfigDiagnostics) {
    let normalized = LoggingConfig::normalize_level_directives(&config.logging.level);
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }
    if config.logging.buffer_lines == 0 {
        out.errors.push(ConfigValidationError::LoggingBufferLinesZero);
    }
}
