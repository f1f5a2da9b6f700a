use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::{self, FormatError, SubmissionFields};

/// Stable identifier of the submitting Telegram user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to an uploaded image (a Telegram file id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self(file_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One user's in-flight content item.
///
/// Only constructible from a caption that passes [`format::validate`], so a
/// stored submission always satisfies the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    user_id: UserId,
    image: ImageRef,
    caption: String,
    fields: SubmissionFields,
}

impl Submission {
    pub fn new(
        user_id: UserId,
        image: ImageRef,
        caption: impl Into<String>,
    ) -> Result<Self, FormatError> {
        let caption = caption.into();
        let fields = format::validate(&caption)?;
        Ok(Self {
            user_id,
            image,
            caption,
            fields,
        })
    }

    /// Build from an inbound message. Image and caption presence are checked
    /// before the caption template.
    pub fn from_content(
        user_id: UserId,
        image: Option<ImageRef>,
        caption: Option<String>,
    ) -> Result<Self, FormatError> {
        let fields = format::validate_content(image.as_ref(), caption.as_deref())?;
        let (Some(image), Some(caption)) = (image, caption) else {
            return Err(FormatError::EmptyCaption);
        };
        Ok(Self {
            user_id,
            image,
            caption,
            fields,
        })
    }

    /// Same image, new caption. The new caption is validated first.
    pub fn with_caption(&self, caption: impl Into<String>) -> Result<Self, FormatError> {
        Self::new(self.user_id, self.image.clone(), caption)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    /// The caption exactly as the user sent it.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn fields(&self) -> &SubmissionFields {
        &self.fields
    }
}

/// Where a pending submission sits between intake and publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the user to press edit or confirm.
    AwaitingDecision,
    /// The next plain-text message replaces the caption.
    Editing,
}

/// The registry value for a user: their submission and its phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub submission: Submission,
    pub phase: Phase,
}

impl PendingSubmission {
    pub fn awaiting_decision(submission: Submission) -> Self {
        Self {
            submission,
            phase: Phase::AwaitingDecision,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.phase == Phase::Editing
    }
}

/// Per-user session state as seen from outside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Pending,
    Editing,
}

impl From<Option<&PendingSubmission>> for SessionState {
    fn from(entry: Option<&PendingSubmission>) -> Self {
        match entry.map(|p| p.phase) {
            None => Self::Idle,
            Some(Phase::AwaitingDecision) => Self::Pending,
            Some(Phase::Editing) => Self::Editing,
        }
    }
}
