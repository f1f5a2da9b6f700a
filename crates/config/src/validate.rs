//! Semantic checks on a loaded configuration.

use crate::schema::TougaoConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "publish.channel_id"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Check everything the bot needs before it connects.
pub fn validate(config: &TougaoConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if !config.telegram.has_token() {
        result.push(
            Severity::Error,
            "telegram.token",
            "bot token is empty; set it in the config file or TELEGRAM_TOKEN",
        );
    }
    if config.telegram.poll_timeout_secs == 0 {
        result.push(
            Severity::Error,
            "telegram.poll_timeout_secs",
            "must be at least 1",
        );
    }
    if config.telegram.request_timeout_secs <= u64::from(config.telegram.poll_timeout_secs) {
        result.push(
            Severity::Warning,
            "telegram.request_timeout_secs",
            "should exceed poll_timeout_secs or long polls will be cut off",
        );
    }

    if let Err(message) = check_channel_id(&config.publish.channel_id) {
        result.push(Severity::Error, "publish.channel_id", message);
    }

    for (name, text) in config.templates.entries() {
        if text.trim().is_empty() {
            result.push(
                Severity::Warning,
                format!("templates.{name}"),
                "template is blank",
            );
        }
    }

    result
}

/// A channel id is `@username` (5–32 word characters) or a negative chat id.
fn check_channel_id(channel_id: &str) -> Result<(), String> {
    if let Some(username) = channel_id.strip_prefix('@') {
        let valid_chars = username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid_chars && (5..=32).contains(&username.len()) {
            return Ok(());
        }
        return Err(format!("`{channel_id}` is not a valid channel username"));
    }
    match channel_id.parse::<i64>() {
        Ok(id) if id < 0 => Ok(()),
        Ok(_) => Err(format!(
            "`{channel_id}` looks like a user id; channel ids are negative"
        )),
        Err(_) => Err(format!(
            "`{channel_id}` is neither @username nor a numeric chat id"
        )),
    }
}
