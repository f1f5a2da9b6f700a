use serde::{Deserialize, Serialize};

use crate::format::FormatError;

/// User-facing texts. Every field can be overridden from config; unset
/// fields fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    /// Reply to `/start` and appended to every format rejection.
    pub instructions: String,
    /// Headline of a format rejection.
    pub rejection: String,
    /// Reply when only the link fails the Quark origin check.
    pub link_rejection: String,
    /// Reply when the caption would not fit under the published photo.
    pub too_long: String,
    /// Reply after a submission is accepted, shown with the decision buttons.
    pub accepted: String,
    pub edit_button: String,
    pub confirm_button: String,
    /// Replaces the decision message when the user presses edit.
    pub edit_prompt: String,
    /// Alert when the edit prompt is already on screen.
    pub edit_unchanged: String,
    pub edit_applied: String,
    /// Plain text arrived but the user never pressed edit.
    pub not_editing: String,
    pub nothing_to_edit: String,
    /// Callback toast after a successful publish.
    pub publish_success: String,
    /// Final text of the decision message after a successful publish.
    pub publish_done: String,
    pub nothing_to_publish: String,
    pub publish_failed: String,
    /// Alert when the publish channel is missing or the bot cannot post there.
    pub channel_unavailable: String,
    /// Reply when the user edits an already-sent message in place.
    pub edited_original: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            instructions: "请按照以下格式投稿：\n\n图片\n\n名称：\n\n描述：\n\n链接：（夸克网盘）\n\n📁 大小：\n🏷 标签："
                .into(),
            rejection: "投稿格式不正确，请按照模板重新投稿。".into(),
            link_rejection: "链接必须是夸克网盘的链接，请重新投稿。".into(),
            too_long: "投稿内容过长，图片说明最多 1024 个字符，请精简后重新投稿。".into(),
            accepted: "感谢您的投稿！您可以选择编辑或确认发布到频道：".into(),
            edit_button: "编辑".into(),
            confirm_button: "确认发布".into(),
            edit_prompt: "请发送新的投稿内容，格式与之前相同。".into(),
            edit_unchanged: "消息内容未改变。".into(),
            edit_applied: "您的投稿内容已更新！".into(),
            not_editing: "请先使用编辑按钮来编辑您的投稿内容。".into(),
            nothing_to_edit: "没有找到可编辑的投稿内容。".into(),
            publish_success: "内容已成功发布到频道！".into(),
            publish_done: "您的投稿已成功发布到频道。感谢您的支持！".into(),
            nothing_to_publish: "找不到您的投稿内容，无法发送到频道。".into(),
            publish_failed: "发布失败，请稍后再次点击确认发布。".into(),
            channel_unavailable: "发布失败：找不到频道或机器人无权发布，请联系管理员。".into(),
            edited_original: "切勿在原文案上编辑，请重新发布。".into(),
        }
    }
}

impl Templates {
    /// Reply text for a rejected submission.
    pub fn rejection_for(&self, error: FormatError) -> String {
        match error {
            FormatError::LinkOrigin => self.link_rejection.clone(),
            FormatError::TooLong => self.too_long.clone(),
            FormatError::MissingImage | FormatError::EmptyCaption | FormatError::Template => {
                format!("{}\n\n{}", self.rejection, self.instructions)
            },
        }
    }

    /// Names and values of every template, for config validation.
    pub fn entries(&self) -> [(&'static str, &str); 18] {
        [
            ("instructions", self.instructions.as_str()),
            ("rejection", self.rejection.as_str()),
            ("link_rejection", self.link_rejection.as_str()),
            ("too_long", self.too_long.as_str()),
            ("accepted", self.accepted.as_str()),
            ("edit_button", self.edit_button.as_str()),
            ("confirm_button", self.confirm_button.as_str()),
            ("edit_prompt", self.edit_prompt.as_str()),
            ("edit_unchanged", self.edit_unchanged.as_str()),
            ("edit_applied", self.edit_applied.as_str()),
            ("not_editing", self.not_editing.as_str()),
            ("nothing_to_edit", self.nothing_to_edit.as_str()),
            ("publish_success", self.publish_success.as_str()),
            ("publish_done", self.publish_done.as_str()),
            ("nothing_to_publish", self.nothing_to_publish.as_str()),
            ("publish_failed", self.publish_failed.as_str()),
            ("channel_unavailable", self.channel_unavailable.as_str()),
            ("edited_original", self.edited_original.as_str()),
        ]
    }
}
