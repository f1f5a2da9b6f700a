use std::error::Error as StdError;

use crate::format::FormatError;

/// Crate-wide result type for submission handling.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end the handling of one inbound event early.
///
/// None of these are retried inside the flow; the user re-drives recovery by
/// resubmitting or pressing a button again.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The inbound update lacks a user or chat reference.
    #[error("inbound event is missing {field}")]
    MissingContext { field: &'static str },

    /// The caption failed the template or link-origin check.
    #[error("invalid submission format: {0}")]
    InvalidFormat(#[from] FormatError),

    /// An edit or confirm referenced a user with nothing pending.
    #[error("no pending submission to {action}")]
    NoPendingSubmission { action: &'static str },

    /// The channel publish call did not succeed. The pending entry is kept.
    #[error("publishing to channel failed: {source}")]
    PublishFailure {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A chat transport call (reply, edit, acknowledge) failed.
    #[error("chat transport failed: {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn missing_context(field: &'static str) -> Self {
        Self::MissingContext { field }
    }

    #[must_use]
    pub fn no_pending(action: &'static str) -> Self {
        Self::NoPendingSubmission { action }
    }

    #[must_use]
    pub fn publish(source: anyhow::Error) -> Self {
        Self::PublishFailure {
            source: source.into(),
        }
    }

    #[must_use]
    pub fn transport(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Transport {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Whether the user can recover by acting again (resubmit, press a button).
    ///
    /// Recoverable errors have already been reported back to the user.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_) | Self::NoPendingSubmission { .. } | Self::PublishFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_caused_errors_are_recoverable() {
        assert!(Error::from(FormatError::Template).is_recoverable());
        assert!(Error::no_pending("publish").is_recoverable());
        assert!(Error::publish(anyhow::anyhow!("channel not found")).is_recoverable());
    }

    #[test]
    fn context_and_transport_errors_are_not_recoverable() {
        assert!(!Error::missing_context("chat").is_recoverable());
        assert!(!Error::transport("send reply", anyhow::anyhow!("timeout")).is_recoverable());
    }

    #[test]
    fn display_includes_context() {
        let err = Error::transport("edit prompt", anyhow::anyhow!("message not found"));
        assert_eq!(
            err.to_string(),
            "chat transport failed: edit prompt: message not found"
        );
        assert_eq!(
            Error::no_pending("edit").to_string(),
            "no pending submission to edit"
        );
    }
}
