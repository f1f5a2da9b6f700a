use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tougao_submission::Templates,
};

/// Public channel submissions go to unless configured otherwise.
pub const DEFAULT_CHANNEL_ID: &str = "@naclyunpan";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TougaoConfig {
    pub telegram: TelegramConfig,
    pub publish: PublishConfig,
    /// Overrides for user-facing texts.
    pub templates: Templates,
}

/// Bot credentials and long-polling settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Long-polling timeout passed to `getUpdates` (seconds).
    pub poll_timeout_secs: u32,

    /// HTTP client timeout; must exceed the polling timeout.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            poll_timeout_secs: 30,
            request_timeout_secs: 45,
        }
    }
}

impl TelegramConfig {
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }
}

/// Where accepted submissions are published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublishConfig {
    /// `@channelusername` or a numeric chat id such as `-1001234567890`.
    pub channel_id: String,

    /// Line appended below every published caption. Unset uses
    /// `📢 频道：<channel_id>` for `@username` channels; empty disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL_ID.into(),
            footer: None,
        }
    }
}

impl PublishConfig {
    /// The footer to append, if any.
    #[must_use]
    pub fn footer_text(&self) -> Option<String> {
        match &self.footer {
            Some(footer) if footer.trim().is_empty() => None,
            Some(footer) => Some(footer.clone()),
            None if self.channel_id.starts_with('@') => {
                Some(format!("📢 频道：{}", self.channel_id))
            },
            None => None,
        }
    }
}
