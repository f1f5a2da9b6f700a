//! Submission lifecycle for the tougao contribution bot.
//!
//! Users send an image with a caption following a fixed five-field template.
//! The caption is validated, kept as the user's single pending submission,
//! optionally revised, and published to the public channel on confirmation.
//!
//! The chat transport and the channel publish call are collaborators behind
//! the [`ChatTransport`] and [`ChannelPublisher`] traits.

pub mod error;
pub mod event;
pub mod flow;
pub mod format;
pub mod locks;
pub mod model;
pub mod store;
pub mod templates;
pub mod transport;

pub use {
    error::{Error, Result},
    event::{CallbackAction, Command, InboundEvent, PromptMessage},
    flow::{Outcome, SubmissionFlow},
    format::{FormatError, SubmissionFields},
    model::{ImageRef, PendingSubmission, Phase, SessionState, Submission, UserId},
    store::{InMemorySubmissionStore, SubmissionStore},
    templates::Templates,
    transport::{
        CallbackNotice, ChannelPublisher, ChatTransport, DecisionButton, MessageRef, PublishReceipt,
        PublishRejection,
    },
};
