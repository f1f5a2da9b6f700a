//! Collaborators: the chat the user talks to and the channel we publish to.

use {anyhow::Result, async_trait::async_trait};

use crate::{event::CallbackAction, model::ImageRef};

/// Address of a message the bot sent earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: String,
    pub message_id: String,
}

/// An inline button attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionButton {
    pub label: String,
    pub action: CallbackAction,
}

/// How a button press is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackNotice<'a> {
    /// Only stop the client-side spinner.
    Silent,
    /// Short toast at the top of the chat.
    Toast(&'a str),
    /// Modal alert the user has to dismiss.
    Alert(&'a str),
}

/// Delivers replies and button acknowledgements to the user.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text message, optionally with one button per row.
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        buttons: Option<&[DecisionButton]>,
    ) -> Result<()>;

    /// Replace the text of a previously sent message. Its buttons are dropped.
    async fn edit_message_text(&self, message: &MessageRef, text: &str) -> Result<()>;

    /// Answer a button press. Must be called exactly once per press or the
    /// client keeps spinning until it times out.
    async fn acknowledge_callback(&self, callback_id: &str, notice: CallbackNotice<'_>)
    -> Result<()>;
}

/// Where a published submission ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub channel_id: String,
    pub message_id: Option<String>,
}

/// Publish failures a [`ChannelPublisher`] can name. Attach one as context on
/// the returned error so the user gets a notice that fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PublishRejection {
    /// The channel does not exist or the bot may not post there.
    #[error("publish channel is unavailable")]
    ChannelUnavailable,
}

/// One-shot publish of a validated submission to the public channel.
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Returns `Err` unless the channel accepted the post.
    async fn publish(&self, image: &ImageRef, caption: &str) -> Result<PublishReceipt>;
}
