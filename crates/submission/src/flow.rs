//! The submission state machine.
//!
//! Per user: `Idle` (no registry entry) → `Pending` → `Editing` → `Pending`,
//! ending in a publish that removes the entry. Every event for a user runs
//! under that user's lock, so a button press and a racing resubmission are
//! applied in arrival order.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    event::{CallbackAction, Command, InboundEvent, PromptMessage},
    locks::UserLocks,
    model::{ImageRef, PendingSubmission, Phase, SessionState, Submission, UserId},
    store::SubmissionStore,
    templates::Templates,
    transport::{
        CallbackNotice, ChannelPublisher, ChatTransport, DecisionButton, PublishReceipt,
        PublishRejection,
    },
};

/// What a successfully handled event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Instructions were sent in reply to a command.
    Instructed,
    /// A new submission is pending; `replaced` if it overwrote an older one.
    Accepted { replaced: bool },
    /// The user is now editing and was prompted for the new caption.
    EditRequested,
    /// Edit pressed while the edit prompt was already displayed.
    EditUnchanged,
    /// The pending caption was replaced.
    EditApplied,
    /// Plain text outside of editing; the user was told to press edit first.
    Reminded,
    Published(PublishReceipt),
    /// The user edited a sent message in place and was told to resubmit.
    EditedOriginalIgnored,
}

/// Owns the pending registry and drives every transition.
pub struct SubmissionFlow {
    store: Arc<dyn SubmissionStore>,
    transport: Arc<dyn ChatTransport>,
    publisher: Arc<dyn ChannelPublisher>,
    templates: Templates,
    locks: UserLocks,
}

impl SubmissionFlow {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        transport: Arc<dyn ChatTransport>,
        publisher: Arc<dyn ChannelPublisher>,
        templates: Templates,
    ) -> Self {
        Self {
            store,
            transport,
            publisher,
            templates,
            locks: UserLocks::new(),
        }
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn session_state(&self, user_id: UserId) -> SessionState {
        SessionState::from(self.store.get(user_id).as_ref())
    }

    /// Apply one inbound event.
    ///
    /// Recoverable errors ([`Error::is_recoverable`]) have already been
    /// reported to the user when they are returned.
    pub async fn handle(&self, event: InboundEvent) -> Result<Outcome> {
        let user_id = event.user_id();
        let _guard = self.locks.lock(user_id).await;
        debug!(%user_id, kind = event.kind(), state = ?self.session_state(user_id), "handling event");

        match event {
            InboundEvent::Content {
                chat_id,
                image,
                caption,
                ..
            } => self.intake(user_id, &chat_id, image, caption).await,
            InboundEvent::Callback {
                callback_id,
                action: CallbackAction::Edit,
                prompt,
                ..
            } => self.request_edit(user_id, &callback_id, prompt).await,
            InboundEvent::Callback {
                callback_id,
                action: CallbackAction::Confirm,
                prompt,
                ..
            } => self.confirm(user_id, &callback_id, prompt).await,
            InboundEvent::Text { chat_id, text, .. } => {
                self.apply_text(user_id, &chat_id, text).await
            },
            InboundEvent::Command {
                chat_id,
                command: Command::Start | Command::Help,
                ..
            } => {
                self.reply(&chat_id, &self.templates.instructions, None)
                    .await?;
                Ok(Outcome::Instructed)
            },
            InboundEvent::EditedOriginal { chat_id, .. } => {
                self.reply(&chat_id, &self.templates.edited_original, None)
                    .await?;
                Ok(Outcome::EditedOriginalIgnored)
            },
        }
    }

    async fn intake(
        &self,
        user_id: UserId,
        chat_id: &str,
        image: Option<ImageRef>,
        caption: Option<String>,
    ) -> Result<Outcome> {
        let submission = match Submission::from_content(user_id, image, caption) {
            Ok(submission) => submission,
            Err(err) => {
                debug!(%user_id, error = %err, "submission rejected");
                self.reply(chat_id, &self.templates.rejection_for(err), None)
                    .await?;
                return Err(err.into());
            },
        };

        let name = submission.fields().name.clone();
        let replaced = self
            .store
            .put(user_id, PendingSubmission::awaiting_decision(submission))
            .is_some();
        info!(%user_id, name = %name, replaced, "submission pending");

        self.reply(
            chat_id,
            &self.templates.accepted,
            Some(self.decision_buttons().as_slice()),
        )
        .await?;
        Ok(Outcome::Accepted { replaced })
    }

    async fn request_edit(
        &self,
        user_id: UserId,
        callback_id: &str,
        prompt: Option<PromptMessage>,
    ) -> Result<Outcome> {
        let Some(mut pending) = self.store.get(user_id) else {
            self.acknowledge(
                callback_id,
                CallbackNotice::Alert(&self.templates.nothing_to_edit),
            )
            .await?;
            return Err(Error::no_pending("edit"));
        };

        let already_prompted = prompt
            .as_ref()
            .and_then(|p| p.text.as_deref())
            .is_some_and(|text| text == self.templates.edit_prompt);

        pending.phase = Phase::Editing;
        self.store.put(user_id, pending);

        if already_prompted {
            debug!(%user_id, "edit prompt already displayed");
            self.acknowledge(
                callback_id,
                CallbackNotice::Alert(&self.templates.edit_unchanged),
            )
            .await?;
            return Ok(Outcome::EditUnchanged);
        }

        self.acknowledge(callback_id, CallbackNotice::Silent).await?;
        self.show_on_prompt(user_id, prompt, &self.templates.edit_prompt)
            .await?;
        info!(%user_id, "editing submission");
        Ok(Outcome::EditRequested)
    }

    async fn apply_text(&self, user_id: UserId, chat_id: &str, text: String) -> Result<Outcome> {
        let pending = match self.store.get(user_id) {
            Some(pending) if pending.is_editing() => pending,
            _ => {
                self.reply(chat_id, &self.templates.not_editing, None)
                    .await?;
                return Ok(Outcome::Reminded);
            },
        };

        // Edits go through the same validation as intake; a rejected edit
        // leaves the user in editing with the old caption.
        let updated = match pending.submission.with_caption(text) {
            Ok(updated) => updated,
            Err(err) => {
                debug!(%user_id, error = %err, "edited caption rejected");
                self.reply(chat_id, &self.templates.rejection_for(err), None)
                    .await?;
                return Err(err.into());
            },
        };

        self.store
            .put(user_id, PendingSubmission::awaiting_decision(updated));
        info!(%user_id, "submission caption updated");

        self.reply(
            chat_id,
            &self.templates.edit_applied,
            Some(self.decision_buttons().as_slice()),
        )
        .await?;
        Ok(Outcome::EditApplied)
    }

    async fn confirm(
        &self,
        user_id: UserId,
        callback_id: &str,
        prompt: Option<PromptMessage>,
    ) -> Result<Outcome> {
        let Some(pending) = self.store.get(user_id) else {
            self.acknowledge(
                callback_id,
                CallbackNotice::Alert(&self.templates.nothing_to_publish),
            )
            .await?;
            return Err(Error::no_pending("publish"));
        };

        let submission = &pending.submission;
        let receipt = match self
            .publisher
            .publish(submission.image(), submission.caption())
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(%user_id, error = %e, "publish failed, keeping pending submission");
                let notice = match e.downcast_ref::<PublishRejection>() {
                    Some(PublishRejection::ChannelUnavailable) => {
                        &self.templates.channel_unavailable
                    },
                    None => &self.templates.publish_failed,
                };
                if let Err(ack_err) = self
                    .acknowledge(callback_id, CallbackNotice::Alert(notice))
                    .await
                {
                    warn!(%user_id, error = %ack_err, "failed to report publish failure");
                }
                return Err(Error::publish(e));
            },
        };

        // Removed before anything else can fail so a later confirm cannot
        // publish the same submission twice.
        self.store.remove(user_id);
        info!(
            %user_id,
            channel_id = %receipt.channel_id,
            message_id = ?receipt.message_id,
            "submission published"
        );

        self.acknowledge(
            callback_id,
            CallbackNotice::Toast(&self.templates.publish_success),
        )
        .await?;
        self.show_on_prompt(user_id, prompt, &self.templates.publish_done)
            .await?;
        Ok(Outcome::Published(receipt))
    }

    fn decision_buttons(&self) -> [DecisionButton; 2] {
        [
            DecisionButton {
                label: self.templates.edit_button.clone(),
                action: CallbackAction::Edit,
            },
            DecisionButton {
                label: self.templates.confirm_button.clone(),
                action: CallbackAction::Confirm,
            },
        ]
    }

    /// Rewrite the message the button was pressed on, or send a fresh
    /// message to the user's private chat when it is no longer reachable.
    async fn show_on_prompt(
        &self,
        user_id: UserId,
        prompt: Option<PromptMessage>,
        text: &str,
    ) -> Result<()> {
        match prompt {
            Some(prompt) => self
                .transport
                .edit_message_text(&prompt.message, text)
                .await
                .map_err(|e| Error::transport("edit prompt message", e)),
            None => self.reply(&user_id.to_string(), text, None).await,
        }
    }

    async fn reply(
        &self,
        chat_id: &str,
        text: &str,
        buttons: Option<&[DecisionButton]>,
    ) -> Result<()> {
        self.transport
            .send_text(chat_id, text, buttons)
            .await
            .map_err(|e| Error::transport("send reply", e))
    }

    async fn acknowledge(&self, callback_id: &str, notice: CallbackNotice<'_>) -> Result<()> {
        self.transport
            .acknowledge_callback(callback_id, notice)
            .await
            .map_err(|e| Error::transport("acknowledge callback", e))
    }
}
