// ABOUTME: Output sinks for resolved urls and CLI feedback formatting.
// ABOUTME: Exports KEY=value pairs to $GITHUB_ENV or stdout; feedback supports normal, quiet and JSON modes.

use parking_lot::Mutex;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Environment variable GitHub Actions points at its env file.
pub const GITHUB_ENV_VAR: &str = "GITHUB_ENV";

const HEREDOC_DELIMITER: &str = "ghadelimiter_deployment_gate";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("invalid output key {0:?}")]
    InvalidKey(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}

/// Receives one `KEY=value` pair per exported value.
pub trait OutputSink: Send + Sync {
    fn export(&self, key: &str, value: &str) -> Result<(), OutputError>;
}

fn validate_key(key: &str) -> Result<(), OutputError> {
    if key.is_empty() || key.contains(['=', '\n', '\r']) {
        return Err(OutputError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Appends variables to the GitHub Actions env file.
///
/// Pipelines export concurrently; a mutex keeps entries from interleaving.
#[derive(Debug)]
pub struct GithubEnvSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl GithubEnvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Sink for the file named by `$GITHUB_ENV`, if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(GITHUB_ENV_VAR)
            .filter(|path| !path.is_empty())
            .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Format one env file entry, using the heredoc form for multiline values.
fn env_file_entry(key: &str, value: &str) -> String {
    if !value.contains('\n') {
        return format!("{key}={value}\n");
    }

    let mut delimiter = HEREDOC_DELIMITER.to_string();
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{key}<<{delimiter}\n{value}\n{delimiter}\n")
}

impl OutputSink for GithubEnvSink {
    fn export(&self, key: &str, value: &str) -> Result<(), OutputError> {
        validate_key(key)?;
        let entry = env_file_entry(key, value);
        let io_error = |source| OutputError::Io {
            path: self.path.clone(),
            source,
        };

        let _guard = self.lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;
        file.write_all(entry.as_bytes()).map_err(io_error)?;

        tracing::debug!(key, path = %self.path.display(), "Exported variable");
        Ok(())
    }
}

/// Prints `KEY=value` lines when not running under GitHub Actions.
#[derive(Debug, Default)]
pub struct StdoutSink {
    lock: Mutex<()>,
}

impl OutputSink for StdoutSink {
    fn export(&self, key: &str, value: &str) -> Result<(), OutputError> {
        validate_key(key)?;
        let _guard = self.lock.lock();
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{key}={value}").map_err(OutputError::Stdout)
    }
}

/// Upper snake case for output keys.
///
/// `myApp` → `MY_APP`, `XMLHttp` → `XML_HTTP`, `my-app` and `my app` → `MY_APP`.
pub fn constant_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();

    // lower followed by upper
    let mut split_camel = Vec::with_capacity(chars.len() * 2);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && chars[i - 1].is_ascii_lowercase() && c.is_ascii_uppercase() {
            split_camel.push('_');
        }
        split_camel.push(c);
    }

    // acronym followed by a capitalised word
    let mut split_acronym = Vec::with_capacity(split_camel.len() * 2);
    for (i, &c) in split_camel.iter().enumerate() {
        let starts_word = i > 0
            && split_camel[i - 1].is_ascii_uppercase()
            && c.is_ascii_uppercase()
            && split_camel
                .get(i + 1)
                .is_some_and(|next| next.is_ascii_lowercase());
        if starts_word {
            split_acronym.push('_');
        }
        split_acronym.push(c);
    }

    let mut out = String::with_capacity(split_acronym.len());
    let mut in_separator = false;
    for c in split_acronym {
        if c == '-' || c.is_whitespace() {
            if !in_separator {
                out.push('_');
            }
            in_separator = true;
        } else {
            out.push(c);
            in_separator = false;
        }
    }

    out.to_uppercase()
}

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print a warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_json("warning", message),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => match self.duration() {
                Some(elapsed) => eprintln!("{message} ({elapsed:.1}s)"),
                None => eprintln!("{message}"),
            },
            OutputMode::Quiet => eprintln!("{message}"),
            OutputMode::Json => self.emit_json("success", message),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => self.emit_json("error", message),
        }
    }

    fn emit_json(&self, event: &str, message: &str) {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.duration(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            eprintln!("{json}");
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn constant_case_examples() {
        assert_eq!(constant_case("app1"), "APP1");
        assert_eq!(constant_case("myApp"), "MY_APP");
        assert_eq!(constant_case("XMLHttp"), "XML_HTTP");
        assert_eq!(constant_case("my-app"), "MY_APP");
        assert_eq!(constant_case("my  -  app"), "MY_APP");
        assert_eq!(constant_case("already_snake"), "ALREADY_SNAKE");
    }

    #[test]
    fn single_line_entry() {
        assert_eq!(env_file_entry("URL", "https://x"), "URL=https://x\n");
    }

    #[test]
    fn multiline_entry_uses_heredoc() {
        assert_eq!(
            env_file_entry("K", "a\nb"),
            "K<<ghadelimiter_deployment_gate\na\nb\nghadelimiter_deployment_gate\n"
        );
    }

    #[test]
    fn rejects_keys_that_would_corrupt_env_file() {
        assert!(validate_key("").is_err());
        assert!(validate_key("A=B").is_err());
        assert!(validate_key("A\nB").is_err());
        assert!(validate_key("APP1_URL").is_ok());
    }

    #[test]
    fn env_sink_appends_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env");
        std::fs::write(&path, "EXISTING=1\n").unwrap();

        let sink = GithubEnvSink::new(&path);
        sink.export("APP1_URL", "https://app1.example").unwrap();
        sink.export("APP1_VERCEL_JWT", "tok").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "EXISTING=1\nAPP1_URL=https://app1.example\nAPP1_VERCEL_JWT=tok\n"
        );
    }

    proptest! {
        #[test]
        fn constant_case_is_idempotent(input in "[a-zA-Z0-9 _-]{0,30}") {
            let once = constant_case(&input);
            prop_assert_eq!(constant_case(&once), once.clone());
            prop_assert!(!once.contains('-'));
            prop_assert!(!once.contains(' '));
        }
    }
}
