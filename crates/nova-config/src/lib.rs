use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once, OnceLock};

use nova_core::JavaLanguageLevel;
use thiserror::Error;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

mod diagnostics;
mod validation;

pub use diagnostics::{ConfigDiagnostics, ConfigValidationError, ConfigWarning};

/// Settings for the semantic highlighting passes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightingConfig {
    /// Language level used for files whose program model does not report one.
    #[serde(default = "HighlightingConfig::default_language_level")]
    pub language_level: JavaLanguageLevel,

    /// Emit unchecked-conversion warnings (unchecked assignment, cast, call and overriding).
    #[serde(default = "default_true")]
    pub report_unchecked: bool,

    /// Mark references to method parameters that are reassigned in the method body.
    #[serde(default = "default_true")]
    pub report_reassigned_parameters: bool,

    /// Diagnostic codes (e.g. `DUPLICATE_CLASS`) dropped by the diagnostic sink.
    #[serde(default)]
    pub suppressed_codes: Vec<String>,
}

impl HighlightingConfig {
    fn default_language_level() -> JavaLanguageLevel {
        JavaLanguageLevel::Jdk1_5
    }

    pub fn is_suppressed(&self, code: &str) -> bool {
        self.suppressed_codes.iter().any(|c| c.trim() == code)
    }
}

impl Default for HighlightingConfig {
    fn default() -> Self {
        Self {
            language_level: Self::default_language_level(),
            report_unchecked: true,
            report_reassigned_parameters: true,
            suppressed_codes: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging level for all Nova crates.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Mirror logs to stderr (in addition to the in-memory buffer).
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// Number of log lines kept in memory.
    #[serde(default = "LoggingConfig::default_buffer_lines")]
    pub buffer_lines: usize,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_buffer_lines() -> usize {
        2_000
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            // Simple levels should be forgiving about casing and synonyms.
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            // Anything else is treated as an `EnvFilter` directive string.
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// Create the effective `EnvFilter`.
    ///
    /// `LoggingConfig.level` may be either a simple level (`info`, `debug`, ...)
    /// or a full `tracing_subscriber::EnvFilter` directive string.
    ///
    /// If `RUST_LOG` is set, it is merged into the resulting filter.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: true,
            buffer_lines: Self::default_buffer_lines(),
        }
    }
}

/// Top-level `nova.toml` contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaConfig {
    #[serde(default)]
    pub highlighting: HighlightingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

fn sanitize_toml_error_message(message: &str) -> String {
    // `toml::de::Error::message()` can include user-provided scalar values, e.g.
    // `invalid type: string "secret", expected a boolean`. Redact quoted substrings so config
    // values never end up in logs.
    static QUOTED_STRING_RE: OnceLock<Option<regex::Regex>> = OnceLock::new();

    // Handle escaped quotes (e.g. `\"`) inside the quoted substring.
    let re = QUOTED_STRING_RE.get_or_init(|| regex::Regex::new(r#""(?:\\.|[^"\\])*""#).ok());
    match re {
        Some(re) => re.replace_all(message, r#""<redacted>""#).into_owned(),
        None => message.to_owned(),
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // `toml::de::Error`'s default `Display` includes a source snippet. Keep just the message.
        ConfigError::Toml(sanitize_toml_error_message(err.message()))
    }
}

impl NovaConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read_config_file(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load a config file from TOML and return diagnostics (unknown keys and semantic
    /// validation failures).
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let text = read_config_file(path.as_ref())?;
        Self::load_from_str_with_diagnostics(&text)
    }

    /// Load a config from a TOML string and return diagnostics.
    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<NovaConfig>(text)?;

        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        config.validate(&mut diagnostics);

        Ok((config, diagnostics))
    }
}

fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub const NOVA_CONFIG_ENV_VAR: &str = "NOVA_CONFIG_PATH";

/// Discover the Nova configuration file for a workspace root.
///
/// Search order:
/// 1) `NOVA_CONFIG_PATH` (absolute or relative to `workspace_root`)
/// 2) `nova.toml` in `workspace_root`
/// 3) `.nova.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(NOVA_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["nova.toml", ".nova.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the Nova configuration for a workspace root with diagnostics.
///
/// If no config is present, returns [`NovaConfig::default`], `None`, and empty diagnostics.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(NovaConfig, Option<PathBuf>, ConfigDiagnostics), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((NovaConfig::default(), None, ConfigDiagnostics::default()));
    };

    let (config, diagnostics) = NovaConfig::load_from_path_with_diagnostics(&path)?;
    for key in &diagnostics.unknown_keys {
        tracing::warn!(
            target: "nova.config",
            key = %key,
            path = %path.display(),
            "unknown configuration key"
        );
    }
    Ok((config, Some(path), diagnostics))
}

/// Bounded ring of recent log lines, kept so hosts can attach them to fault reports.
#[derive(Debug)]
pub struct LogBuffer {
    capacity: usize,
    inner: Mutex<VecDeque<String>>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(8_192))),
        }
    }

    pub fn push_line(&self, line: String) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.len() == self.capacity {
            inner.pop_front();
        }
        inner.push_back(line);
    }

    pub fn last_lines(&self, n: usize) -> Vec<String> {
        match self.inner.lock() {
            Ok(inner) => inner.iter().rev().take(n).cloned().rev().collect(),
            Err(_) => Vec::new(),
        }
    }
}

struct LogBufferMakeWriter {
    buffer: Arc<LogBuffer>,
}

impl<'a> MakeWriter<'a> for LogBufferMakeWriter {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferWriter {
            buffer: self.buffer.clone(),
            bytes: Vec::new(),
        }
    }
}

struct LogBufferWriter {
    buffer: Arc<LogBuffer>,
    bytes: Vec<u8>,
}

impl Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogBufferWriter {
    fn drop(&mut self) {
        if self.bytes.is_empty() {
            return;
        }

        let text = String::from_utf8_lossy(&self.bytes);
        for line in text.split_terminator('\n') {
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                self.buffer.push_line(line.to_owned());
            }
        }
    }
}

static TRACING_INIT: Once = Once::new();
static GLOBAL_LOG_BUFFER: OnceLock<Arc<LogBuffer>> = OnceLock::new();

pub fn global_log_buffer() -> Arc<LogBuffer> {
    GLOBAL_LOG_BUFFER
        .get_or_init(|| Arc::new(LogBuffer::new(LoggingConfig::default_buffer_lines())))
        .clone()
}

/// Initializes structured `tracing` logging.
///
/// This function is safe to call multiple times; only the first call installs a
/// global subscriber. Subsequent calls return the global in-memory log buffer.
pub fn init_tracing(logging: &LoggingConfig) -> Arc<LogBuffer> {
    let buffer = GLOBAL_LOG_BUFFER
        .get_or_init(|| Arc::new(LogBuffer::new(logging.buffer_lines)))
        .clone();

    TRACING_INIT.call_once(|| {
        let filter = logging.env_filter();

        let mut make_writer = BoxMakeWriter::new(LogBufferMakeWriter {
            buffer: buffer.clone(),
        });
        if logging.stderr {
            // `cargo test` output capture only works for the stdlib's `print!/eprint!`
            // macros. Using `TestWriter` in debug builds keeps unit tests quiet.
            if cfg!(debug_assertions) {
                make_writer = BoxMakeWriter::new(
                    make_writer.and(tracing_subscriber::fmt::writer::TestWriter::with_stderr),
                );
            } else {
                make_writer = BoxMakeWriter::new(make_writer.and(std::io::stderr));
            }
        }

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if logging.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!(
                target: "nova.config",
                level = %logging.level,
                json = logging.json,
                "tracing initialized"
            );
        }
    });

    buffer
}

#[cfg(test)]
mod toml_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_yields_defaults() {
        let config: NovaConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(config, NovaConfig::default());
        assert_eq!(config.highlighting.language_level, JavaLanguageLevel::Jdk1_5);
        assert!(config.highlighting.report_unchecked);
        assert!(config.logging.stderr);
    }

    #[test]
    fn highlighting_section_round_trips_through_toml() {
        let text = r#"
[highlighting]
language_level = "1.4"
report_unchecked = false
suppressed_codes = ["DUPLICATE_CLASS", " CYCLIC_INHERITANCE "]
"#;
        let config: NovaConfig = toml::from_str(text).expect("config should parse");
        assert_eq!(config.highlighting.language_level, JavaLanguageLevel::Jdk1_4);
        assert!(!config.highlighting.report_unchecked);
        assert!(config.highlighting.report_reassigned_parameters);
        assert!(config.highlighting.is_suppressed("DUPLICATE_CLASS"));
        assert!(config.highlighting.is_suppressed("CYCLIC_INHERITANCE"));
        assert!(!config.highlighting.is_suppressed("MISSING_RETURN"));

        let rendered = toml::to_string(&config).expect("config should serialize");
        let reparsed: NovaConfig = toml::from_str(&rendered).expect("rendered config should parse");
        assert_eq!(reparsed, config);
    }

    #[test]
    fn toml_errors_do_not_echo_config_values() {
        let err = NovaConfig::load_from_str_with_diagnostics(
            "[highlighting]\nreport_unchecked = \"super-secret\"\n",
        )
        .expect_err("a string is not a boolean");
        let message = err.to_string();
        assert!(!message.contains("super-secret"), "{message}");
    }

    #[test]
    fn level_directives_are_normalized() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "info");
        assert_eq!(
            LoggingConfig::normalize_level_directives("nova.highlight=trace"),
            "nova.highlight=trace"
        );
    }

    #[test]
    fn log_buffer_keeps_the_most_recent_lines() {
        let buffer = LogBuffer::new(2);
        buffer.push_line("a".to_owned());
        buffer.push_line("b".to_owned());
        buffer.push_line("c".to_owned());
        assert_eq!(buffer.last_lines(10), vec!["b".to_owned(), "c".to_owned()]);
        assert_eq!(buffer.last_lines(1), vec!["c".to_owned()]);
    }
}
