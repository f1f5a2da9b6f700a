//! Map teloxide updates onto submission-flow events.
//!
//! Everything here is pure: no Bot API calls, so the mapping can be tested on
//! deserialized updates.

use {
    teloxide::types::{CallbackQuery, MaybeInaccessibleMessage, MediaKind, Message, MessageKind},
    tracing::debug,
};

use tougao_submission::{
    CallbackAction, Command, Error as SubmissionError, ImageRef, InboundEvent, MessageRef,
    PromptMessage, UserId,
};

use crate::Result;

/// What a message carries, before it is routed.
enum Body<'a> {
    Text(&'a str),
    Media {
        image: Option<ImageRef>,
        caption: Option<&'a str>,
    },
}

/// Map a new message. `Ok(None)` means the update is not for the bot.
pub fn message_event(msg: &Message) -> Result<Option<InboundEvent>> {
    if !msg.chat.is_private() {
        debug!(chat_id = msg.chat.id.0, "ignoring message outside a private chat");
        return Ok(None);
    }
    let user_id = sender(msg)?;
    let chat_id = msg.chat.id.0.to_string();

    let event = match message_body(msg) {
        None => return Ok(None),
        Some(Body::Text(text)) => match Command::parse(text) {
            Some(command) => InboundEvent::Command {
                user_id,
                chat_id,
                command,
            },
            None => InboundEvent::Text {
                user_id,
                chat_id,
                text: text.to_string(),
            },
        },
        Some(Body::Media { image, caption }) => InboundEvent::Content {
            user_id,
            chat_id,
            image,
            caption: caption.map(str::to_string),
        },
    };
    Ok(Some(event))
}

/// Map an `edited_message` update: edits are never applied, only warned about.
pub fn edited_message_event(msg: &Message) -> Result<Option<InboundEvent>> {
    if !msg.chat.is_private() {
        return Ok(None);
    }
    Ok(Some(InboundEvent::EditedOriginal {
        user_id: sender(msg)?,
        chat_id: msg.chat.id.0.to_string(),
    }))
}

/// Map a button press. `None` for data the bot never attached.
pub fn callback_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let action = query
        .data
        .as_deref()
        .and_then(CallbackAction::from_callback_data)?;

    Some(InboundEvent::Callback {
        user_id: UserId(query.from.id.0),
        callback_id: query.id.clone(),
        action,
        prompt: query.message.as_ref().map(prompt_message),
    })
}

fn sender(msg: &Message) -> Result<UserId> {
    msg.from
        .as_ref()
        .map(|user| UserId(user.id.0))
        .ok_or_else(|| SubmissionError::missing_context("from").into())
}

fn message_body(msg: &Message) -> Option<Body<'_>> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };
    let caption = match &common.media_kind {
        MediaKind::Text(t) => return Some(Body::Text(&t.text)),
        MediaKind::Photo(p) => {
            // Sizes are ordered smallest first.
            let image = p.photo.last().map(|ps| ImageRef::new(ps.file.id.clone()));
            return Some(Body::Media {
                image,
                caption: p.caption.as_deref(),
            });
        },
        MediaKind::Document(d) => d.caption.as_deref(),
        MediaKind::Video(v) => v.caption.as_deref(),
        MediaKind::Animation(a) => a.caption.as_deref(),
        MediaKind::Audio(a) => a.caption.as_deref(),
        MediaKind::Voice(v) => v.caption.as_deref(),
        // Stickers, locations, contacts and the like cannot carry a caption.
        _ => return None,
    };
    Some(Body::Media {
        image: None,
        caption,
    })
}

fn prompt_message(message: &MaybeInaccessibleMessage) -> PromptMessage {
    PromptMessage {
        message: MessageRef {
            chat_id: message.chat().id.0.to_string(),
            message_id: message.id().0.to_string(),
        },
        text: message
            .regular_message()
            .and_then(Message::text)
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use {
        rstest::rstest,
        serde_json::{Value, json},
    };

    use super::*;

    fn private_message(extra: Value) -> Message {
        let mut value = json!({
            "message_id": 7,
            "date": 1,
            "chat": { "id": 42, "type": "private", "first_name": "Alice" },
            "from": {
                "id": 1001,
                "is_bot": false,
                "first_name": "Alice",
                "username": "alice"
            }
        });
        if let (Some(base), Value::Object(extra)) = (value.as_object_mut(), extra) {
            base.extend(extra);
        }
        serde_json::from_value(value).expect("deserialize message")
    }

    fn photo_sizes() -> Value {
        json!([
            { "file_id": "small-id", "file_unique_id": "s", "width": 90, "height": 90 },
            { "file_id": "large-id", "file_unique_id": "l", "width": 1280, "height": 1280 }
        ])
    }

    #[test]
    fn photo_with_caption_is_content_with_largest_size() {
        let msg = private_message(json!({
            "photo": photo_sizes(),
            "caption": "名称：x"
        }));
        let event = message_event(&msg).unwrap().unwrap();
        assert_eq!(event, InboundEvent::Content {
            user_id: UserId(1001),
            chat_id: "42".into(),
            image: Some(ImageRef::new("large-id")),
            caption: Some("名称：x".into()),
        });
    }

    #[test]
    fn photo_without_caption_keeps_image() {
        let msg = private_message(json!({ "photo": photo_sizes() }));
        let Some(InboundEvent::Content { image, caption, .. }) = message_event(&msg).unwrap()
        else {
            panic!("expected content event");
        };
        assert_eq!(image, Some(ImageRef::new("large-id")));
        assert_eq!(caption, None);
    }

    #[test]
    fn document_is_content_without_image() {
        let msg = private_message(json!({
            "document": { "file_id": "doc-id", "file_unique_id": "d" },
            "caption": "名称：x"
        }));
        let Some(InboundEvent::Content { image, caption, .. }) = message_event(&msg).unwrap()
        else {
            panic!("expected content event");
        };
        assert_eq!(image, None);
        assert_eq!(caption.as_deref(), Some("名称：x"));
    }

    #[rstest]
    #[case::location(json!({ "location": { "latitude": 31.2, "longitude": 121.5 } }))]
    #[case::contact(json!({
        "contact": { "phone_number": "+8612345678901", "first_name": "Bob" }
    }))]
    #[case::dice(json!({ "dice": { "emoji": "🎲", "value": 3 } }))]
    fn captionless_kinds_are_ignored(#[case] extra: Value) {
        let msg = private_message(extra);
        assert!(message_event(&msg).unwrap().is_none());
    }

    #[rstest]
    #[case("/start", Some(Command::Start))]
    #[case("/help@tougao_bot", Some(Command::Help))]
    #[case("名称：新的文案", None)]
    fn text_is_command_or_plain_text(#[case] text: &str, #[case] command: Option<Command>) {
        let msg = private_message(json!({ "text": text }));
        let event = message_event(&msg).unwrap().unwrap();
        match command {
            Some(command) => assert_eq!(event, InboundEvent::Command {
                user_id: UserId(1001),
                chat_id: "42".into(),
                command,
            }),
            None => assert_eq!(event, InboundEvent::Text {
                user_id: UserId(1001),
                chat_id: "42".into(),
                text: text.into(),
            }),
        }
    }

    #[test]
    fn group_messages_are_ignored() {
        let msg: Message = serde_json::from_value(json!({
            "message_id": 1,
            "date": 1,
            "chat": { "id": -100, "type": "group", "title": "chat" },
            "from": { "id": 1001, "is_bot": false, "first_name": "Alice" },
            "text": "hello"
        }))
        .expect("deserialize group message");
        assert!(message_event(&msg).unwrap().is_none());
        assert!(edited_message_event(&msg).unwrap().is_none());
    }

    #[test]
    fn message_without_sender_is_missing_context() {
        let msg: Message = serde_json::from_value(json!({
            "message_id": 1,
            "date": 1,
            "chat": { "id": 42, "type": "private", "first_name": "Alice" },
            "text": "hello"
        }))
        .expect("deserialize anonymous message");
        let err = message_event(&msg).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Submission(SubmissionError::MissingContext { field: "from" })
        ));
    }

    #[test]
    fn edited_message_maps_to_warning_event() {
        let msg = private_message(json!({ "text": "名称：改过的", "edit_date": 2 }));
        assert_eq!(
            edited_message_event(&msg).unwrap(),
            Some(InboundEvent::EditedOriginal {
                user_id: UserId(1001),
                chat_id: "42".into(),
            })
        );
    }

    fn callback_query(data: &str) -> CallbackQuery {
        serde_json::from_value(json!({
            "id": "cb-1",
            "from": { "id": 1001, "is_bot": false, "first_name": "Alice" },
            "chat_instance": "instance",
            "data": data,
            "message": {
                "message_id": 9,
                "date": 1,
                "chat": { "id": 42, "type": "private", "first_name": "Alice" },
                "from": { "id": 5, "is_bot": true, "first_name": "tougao" },
                "text": "感谢您的投稿！"
            }
        }))
        .expect("deserialize callback query")
    }

    #[rstest]
    #[case("edit_post", CallbackAction::Edit)]
    #[case("confirm_post", CallbackAction::Confirm)]
    fn callback_maps_action_and_prompt(#[case] data: &str, #[case] action: CallbackAction) {
        let event = callback_event(&callback_query(data)).unwrap();
        assert_eq!(event, InboundEvent::Callback {
            user_id: UserId(1001),
            callback_id: "cb-1".into(),
            action,
            prompt: Some(PromptMessage {
                message: MessageRef {
                    chat_id: "42".into(),
                    message_id: "9".into(),
                },
                text: Some("感谢您的投稿！".into()),
            }),
        });
    }

    #[test]
    fn unknown_callback_data_is_not_an_event() {
        assert!(callback_event(&callback_query("sessions_switch:1")).is_none());
    }
}
