use std::{sync::Arc, time::Duration};

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use {
    tougao_config::TelegramConfig,
    tougao_submission::{InboundEvent, SubmissionFlow},
};

use crate::{Result, handlers};

/// Pause after a failed `getUpdates` before polling again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Build a bot whose HTTP client outlasts the long-polling timeout, so the
/// client doesn't abort the request before Telegram responds.
pub fn build_bot(config: &TelegramConfig) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    Ok(Bot::with_client(config.token.expose_secret(), client))
}

/// A running polling loop.
pub struct PollingHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Token that stops the loop when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop polling and wait for the update in flight to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "telegram polling task ended abnormally");
        }
    }

    /// Wait until the loop exits on its own.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "telegram polling task ended abnormally");
        }
    }
}

/// Connect the bot and start processing updates.
///
/// Updates are handled to completion one at a time, in arrival order.
pub async fn start_polling(
    bot: Bot,
    config: &TelegramConfig,
    flow: Arc<SubmissionFlow>,
) -> Result<PollingHandle> {
    // Verify credentials and get bot username.
    let me = bot.get_me().await?;
    let bot_username = me.username.clone();

    // Delete any existing webhook so long polling works.
    bot.delete_webhook().send().await?;

    let commands = vec![
        BotCommand::new("start", "投稿说明"),
        BotCommand::new("help", "投稿格式"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?bot_username, "telegram bot connected (webhook cleared)");

    let cancel = CancellationToken::new();
    let poll_timeout = config.poll_timeout_secs;
    let task = tokio::spawn(poll_loop(bot, poll_timeout, flow, cancel.clone()));

    Ok(PollingHandle { cancel, task })
}

async fn poll_loop(bot: Bot, poll_timeout: u32, flow: Arc<SubmissionFlow>, cancel: CancellationToken) {
    info!(poll_timeout, "starting telegram manual polling loop");
    let mut offset: i32 = 0;

    loop {
        let request = bot
            .get_updates()
            .offset(offset)
            .timeout(poll_timeout)
            .allowed_updates(vec![
                AllowedUpdate::Message,
                AllowedUpdate::EditedMessage,
                AllowedUpdate::CallbackQuery,
            ]);

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = request.send() => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    handle_update(&bot, &flow, update.kind).await;
                }
            },
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                error!("telegram polling stopped: another instance is already running with this token");
                cancel.cancel();
                break;
            },
            Err(e) => {
                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(POLL_ERROR_BACKOFF) => {},
                }
            },
        }
    }

    info!("telegram polling stopped");
}

async fn handle_update(bot: &Bot, flow: &SubmissionFlow, kind: UpdateKind) {
    let mapped = match kind {
        UpdateKind::Message(msg) => {
            debug!(chat_id = msg.chat.id.0, "received telegram message");
            handlers::message_event(&msg)
        },
        UpdateKind::EditedMessage(msg) => {
            debug!(chat_id = msg.chat.id.0, "received telegram edited message");
            handlers::edited_message_event(&msg)
        },
        UpdateKind::CallbackQuery(query) => {
            debug!(callback_data = ?query.data, "received telegram callback query");
            let event = handlers::callback_event(&query);
            if event.is_none() {
                // Stop the client spinner for buttons we never attached.
                if let Err(e) = bot.answer_callback_query(&query.id).await {
                    warn!(error = %e, "failed to answer unknown callback query");
                }
            }
            Ok(event)
        },
        other => {
            debug!("ignoring non-message update: {other:?}");
            return;
        },
    };

    match mapped {
        Ok(Some(event)) => dispatch(flow, event).await,
        Ok(None) => {},
        Err(e) => error!(error = %e, "dropping telegram update"),
    }
}

async fn dispatch(flow: &SubmissionFlow, event: InboundEvent) {
    let user_id = event.user_id();
    let kind = event.kind();
    match flow.handle(event).await {
        Ok(outcome) => debug!(%user_id, kind, ?outcome, "event handled"),
        Err(e) if e.is_recoverable() => debug!(%user_id, kind, error = %e, "event rejected"),
        Err(e) => error!(%user_id, kind, error = %e, "error handling event"),
    }
}
