//! Telegram front end for the submission bot.
//!
//! Long-polls the Bot API with teloxide, maps updates to
//! [`tougao_submission::InboundEvent`]s, and implements the outbound
//! collaborators the submission flow talks to.

pub mod bot;
pub mod error;
pub mod handlers;
pub mod outbound;

pub use {
    bot::{PollingHandle, build_bot, start_polling},
    error::{Error, Result},
    outbound::{TelegramChannelPublisher, TelegramOutbound},
};
