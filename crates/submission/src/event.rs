//! Inbound events, already stripped of transport envelopes.

use crate::model::{ImageRef, UserId};
use crate::transport::MessageRef;

/// Callback data carried by the edit button.
pub const EDIT_CALLBACK_DATA: &str = "edit_post";
/// Callback data carried by the confirm button.
pub const CONFIRM_CALLBACK_DATA: &str = "confirm_post";

/// The two decision buttons attached to an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackAction {
    Edit,
    Confirm,
}

impl CallbackAction {
    /// Parse callback data. Unknown data yields `None`.
    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            EDIT_CALLBACK_DATA => Some(Self::Edit),
            CONFIRM_CALLBACK_DATA => Some(Self::Confirm),
            _ => None,
        }
    }

    pub fn callback_data(self) -> &'static str {
        match self {
            Self::Edit => EDIT_CALLBACK_DATA,
            Self::Confirm => CONFIRM_CALLBACK_DATA,
        }
    }
}

/// Bot commands understood by the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

impl Command {
    /// Parse `/start`, `/help` and their `@botname` forms.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?.strip_prefix('/')?;
        let name = word.split('@').next().unwrap_or(word);
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// The message a decision button was pressed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub message: MessageRef,
    /// Text currently displayed, when the transport can still see it.
    pub text: Option<String>,
}

/// One inbound update for the submission flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A message that may carry an image and caption.
    Content {
        user_id: UserId,
        chat_id: String,
        image: Option<ImageRef>,
        caption: Option<String>,
    },
    /// A decision button press.
    Callback {
        user_id: UserId,
        callback_id: String,
        action: CallbackAction,
        prompt: Option<PromptMessage>,
    },
    /// A plain text message.
    Text {
        user_id: UserId,
        chat_id: String,
        text: String,
    },
    Command {
        user_id: UserId,
        chat_id: String,
        command: Command,
    },
    /// The user edited an already-sent message in place.
    EditedOriginal { user_id: UserId, chat_id: String },
}

impl InboundEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Content { user_id, .. }
            | Self::Callback { user_id, .. }
            | Self::Text { user_id, .. }
            | Self::Command { user_id, .. }
            | Self::EditedOriginal { user_id, .. } => *user_id,
        }
    }

    /// Short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Content { .. } => "content",
            Self::Callback { .. } => "callback",
            Self::Text { .. } => "text",
            Self::Command { .. } => "command",
            Self::EditedOriginal { .. } => "edited_original",
        }
    }
}
