use {
    anyhow::Result,
    async_trait::async_trait,
    std::{future::Future, time::Duration},
    teloxide::{
        ApiError, RequestError,
        payloads::{AnswerCallbackQuerySetters, SendMessageSetters, SendPhotoSetters},
        prelude::*,
        types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, Recipient},
    },
    tracing::{debug, info, warn},
};

use {
    tougao_config::PublishConfig,
    tougao_submission::{
        CallbackNotice, ChannelPublisher, ChatTransport, DecisionButton, ImageRef, MessageRef,
        PublishReceipt, PublishRejection,
    },
};

const TELEGRAM_RETRY_AFTER_MAX_RETRIES: usize = 4;

/// Photo captions are capped by the Bot API, counted in UTF-16 code units.
const TELEGRAM_MAX_CAPTION_LEN: usize = 1024;

/// Replies and callback answers in the submitter's private chat.
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramOutbound {
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        buttons: Option<&[DecisionButton]>,
    ) -> Result<()> {
        let chat = ChatId(chat_id.parse::<i64>()?);
        let keyboard = buttons.map(decision_keyboard);
        run_telegram_request_with_retry(chat_id, "send message", || {
            let mut req = self.bot.send_message(chat, text);
            if let Some(ref keyboard) = keyboard {
                req = req.reply_markup(keyboard.clone());
            }
            async move { req.await }
        })
        .await?;
        debug!(chat_id, has_buttons = buttons.is_some(), "telegram message sent");
        Ok(())
    }

    async fn edit_message_text(&self, message: &MessageRef, text: &str) -> Result<()> {
        let chat = ChatId(message.chat_id.parse::<i64>()?);
        let message_id = MessageId(message.message_id.parse::<i32>()?);
        let result = run_telegram_request_with_retry(&message.chat_id, "edit message", || {
            let req = self.bot.edit_message_text(chat, message_id, text);
            async move { req.await }
        })
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_message_not_modified_error(&e) => {
                debug!(
                    chat_id = %message.chat_id,
                    message_id = %message.message_id,
                    "telegram message already shows this text"
                );
                Ok(())
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn acknowledge_callback(
        &self,
        callback_id: &str,
        notice: CallbackNotice<'_>,
    ) -> Result<()> {
        run_telegram_request_with_retry(callback_id, "answer callback", || {
            let mut req = self.bot.answer_callback_query(callback_id);
            match notice {
                CallbackNotice::Silent => {},
                CallbackNotice::Toast(text) => req = req.text(text),
                CallbackNotice::Alert(text) => req = req.text(text).show_alert(true),
            }
            async move { req.await }
        })
        .await?;
        Ok(())
    }
}

/// One button per row, in the order given.
fn decision_keyboard(buttons: &[DecisionButton]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(buttons.iter().map(|button| {
        vec![InlineKeyboardButton::callback(
            button.label.clone(),
            button.action.callback_data(),
        )]
    }))
}

/// Posts accepted submissions to the public channel.
pub struct TelegramChannelPublisher {
    bot: Bot,
    channel_id: String,
    recipient: Recipient,
    footer: Option<String>,
}

impl TelegramChannelPublisher {
    pub fn new(bot: Bot, config: &PublishConfig) -> crate::Result<Self> {
        let recipient = parse_recipient(&config.channel_id).ok_or_else(|| {
            crate::Error::message(format!(
                "invalid publish channel `{}`: expected @username or a numeric chat id",
                config.channel_id
            ))
        })?;
        Ok(Self {
            bot,
            channel_id: config.channel_id.clone(),
            recipient,
            footer: config.footer_text(),
        })
    }
}

#[async_trait]
impl ChannelPublisher for TelegramChannelPublisher {
    async fn publish(&self, image: &ImageRef, caption: &str) -> Result<PublishReceipt> {
        let caption = compose_caption(caption, self.footer.as_deref());
        let message = run_telegram_request_with_retry(&self.channel_id, "send photo", || {
            let req = self
                .bot
                .send_photo(self.recipient.clone(), InputFile::file_id(image.as_str()))
                .caption(caption.as_str());
            async move { req.await }
        })
        .await
        .map_err(classify_publish_error)?;

        info!(
            channel_id = %self.channel_id,
            message_id = message.id.0,
            "submission published to channel"
        );
        Ok(PublishReceipt {
            channel_id: self.channel_id.clone(),
            message_id: Some(message.id.0.to_string()),
        })
    }
}

/// `@username` channels or numeric chat ids.
fn parse_recipient(channel_id: &str) -> Option<Recipient> {
    let channel_id = channel_id.trim();
    if channel_id.len() > 1 && channel_id.starts_with('@') {
        return Some(Recipient::ChannelUsername(channel_id.to_string()));
    }
    channel_id
        .parse::<i64>()
        .ok()
        .map(|id| Recipient::Id(ChatId(id)))
}

/// Caption plus footer, dropping the footer when both would not fit.
fn compose_caption(caption: &str, footer: Option<&str>) -> String {
    let Some(footer) = footer else {
        return caption.to_string();
    };
    let composed = format!("{caption}\n\n{footer}");
    if composed.encode_utf16().count() > TELEGRAM_MAX_CAPTION_LEN {
        warn!(
            caption_len = caption.encode_utf16().count(),
            "caption too long for the channel footer, publishing without it"
        );
        return caption.to_string();
    }
    composed
}

async fn run_telegram_request_with_retry<T, F, Fut>(
    to: &str,
    operation: &'static str,
    mut request: F,
) -> std::result::Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RequestError>>,
{
    let mut retries = 0usize;

    loop {
        match request().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let Some(wait) = retry_after_duration(&err) else {
                    return Err(err);
                };

                if retries >= TELEGRAM_RETRY_AFTER_MAX_RETRIES {
                    warn!(
                        target_id = to,
                        operation,
                        retries,
                        max_retries = TELEGRAM_RETRY_AFTER_MAX_RETRIES,
                        retry_after_secs = wait.as_secs(),
                        "telegram rate limit persisted after retries"
                    );
                    return Err(err);
                }

                retries += 1;
                warn!(
                    target_id = to,
                    operation,
                    retries,
                    max_retries = TELEGRAM_RETRY_AFTER_MAX_RETRIES,
                    retry_after_secs = wait.as_secs(),
                    "telegram rate limited, waiting before retry"
                );
                tokio::time::sleep(wait).await;
            },
        }
    }
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}

fn is_message_not_modified_error(error: &RequestError) -> bool {
    matches!(error, RequestError::Api(ApiError::MessageNotModified))
}

/// Tag errors that mean the channel itself is unusable, so the submitter is
/// not told to retry something only an admin can fix.
fn classify_publish_error(error: RequestError) -> anyhow::Error {
    match error {
        RequestError::Api(ApiError::ChatNotFound | ApiError::NotEnoughRightsToPostMessages) => {
            anyhow::Error::new(error).context(PublishRejection::ChannelUnavailable)
        },
        other => other.into(),
    }
}
