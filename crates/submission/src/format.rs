//! Caption format validation.
//!
//! A submission caption must match this template end to end:
//!
//! ```text
//! 名称：<name>
//!
//! 描述：<description>
//!
//! 链接：https://pan.quark.cn/s/<share id>
//!
//! 📁 大小：<size>
//! 🏷 标签：<tags>
//! ```
//!
//! Field values are single lines. Whitespace directly after a label is
//! allowed and stripped, as is an emoji variation selector after the folder
//! and label emoji (some clients insert one). The link line may carry a note
//! after the URL, such as an extraction code, as long as it has no `/`.

use std::sync::LazyLock;

use {
    regex::Regex,
    serde::{Deserialize, Serialize},
};

use crate::model::ImageRef;

/// Only share links on this origin are accepted.
pub const QUARK_SHARE_PREFIX: &str = "https://pan.quark.cn/s/";

/// Telegram's photo caption limit, in UTF-16 code units.
pub const MAX_CAPTION_UTF16_LEN: usize = 1024;

static TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\A名称：\s*(?P<name>.*)\n\n",
        r"描述：\s*(?P<description>.*)\n\n",
        r"链接：\s*(?P<link>.*)\n\n",
        r"📁\x{FE0F}? 大小：\s*(?P<size>.*)\n",
        r"🏷\x{FE0F}? 标签：\s*(?P<tags>.*)\z",
    ))
    .unwrap_or_else(|e| unreachable!("caption template regex: {e}"))
});

static QUARK_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?P<url>https://pan\.quark\.cn/s/[^/\s]+)(?:\s+[^/]*)?\z")
        .unwrap_or_else(|e| unreachable!("quark link regex: {e}"))
});

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The message carries no photo.
    #[error("no image attached")]
    MissingImage,
    /// The message has no caption, or only whitespace.
    #[error("caption is empty")]
    EmptyCaption,
    /// The caption does not follow the five-field template.
    #[error("caption does not match the submission template")]
    Template,
    /// The template matched but the link is not a Quark share link.
    #[error("link must be a single {QUARK_SHARE_PREFIX}<id> share link")]
    LinkOrigin,
    /// The caption would not fit under the published photo.
    #[error("caption exceeds {MAX_CAPTION_UTF16_LEN} UTF-16 code units")]
    TooLong,
}

/// Structured data extracted from a valid caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFields {
    pub name: String,
    pub description: String,
    pub link: String,
    pub size: String,
    pub tags: String,
}

/// Validate an inbound message: an image must be attached and the caption
/// must be non-empty before the template is checked.
pub fn validate_content(
    image: Option<&ImageRef>,
    caption: Option<&str>,
) -> Result<SubmissionFields, FormatError> {
    if image.is_none() {
        return Err(FormatError::MissingImage);
    }
    match caption {
        Some(caption) => validate(caption),
        None => Err(FormatError::EmptyCaption),
    }
}

/// Validate a caption against the template and extract its fields.
pub fn validate(caption: &str) -> Result<SubmissionFields, FormatError> {
    if caption.trim().is_empty() {
        return Err(FormatError::EmptyCaption);
    }

    let caps = TEMPLATE.captures(caption).ok_or(FormatError::Template)?;
    let field = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };

    let link = QUARK_LINK
        .captures(&field("link"))
        .and_then(|link| link.name("url"))
        .map(|url| url.as_str().to_string())
        .ok_or(FormatError::LinkOrigin)?;

    if caption.encode_utf16().count() > MAX_CAPTION_UTF16_LEN {
        return Err(FormatError::TooLong);
    }

    Ok(SubmissionFields {
        name: field("name"),
        description: field("description"),
        link,
        size: field("size"),
        tags: field("tags"),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn caption_with_link(link: &str) -> String {
        format!("名称：A\n\n描述：B\n\n链接：{link}\n\n📁 大小：1G\n🏷 标签：x")
    }

    #[test]
    fn accepts_canonical_caption() {
        let fields = validate(&caption_with_link("https://pan.quark.cn/s/abc123")).unwrap();
        assert_eq!(fields, SubmissionFields {
            name: "A".into(),
            description: "B".into(),
            link: "https://pan.quark.cn/s/abc123".into(),
            size: "1G".into(),
            tags: "x".into(),
        });
    }

    #[test]
    fn strips_whitespace_after_labels() {
        let caption = "名称： 电影合集\n\n描述：  高清\n\n链接： https://pan.quark.cn/s/9f8e7d\n\n📁 大小： 12G\n🏷 标签： #电影 #合集";
        let fields = validate(caption).unwrap();
        assert_eq!(fields.name, "电影合集");
        assert_eq!(fields.description, "高清");
        assert_eq!(fields.link, "https://pan.quark.cn/s/9f8e7d");
        assert_eq!(fields.size, "12G");
        assert_eq!(fields.tags, "#电影 #合集");
    }

    #[test]
    fn accepts_emoji_variation_selector() {
        let caption = "名称：A\n\n描述：B\n\n链接：https://pan.quark.cn/s/abc\n\n📁\u{FE0F} 大小：1G\n🏷\u{FE0F} 标签：x";
        assert!(validate(caption).is_ok());
    }

    #[test]
    fn accepts_empty_field_values() {
        let caption = "名称：\n\n描述：\n\n链接：https://pan.quark.cn/s/abc\n\n📁 大小：\n🏷 标签：";
        let fields = validate(caption).unwrap();
        assert_eq!(fields.name, "");
        assert_eq!(fields.tags, "");
    }

    #[rstest]
    #[case::extra_segment("https://pan.quark.cn/s/abc/def")]
    #[case::other_host("https://pan.baidu.com/s/abc123")]
    #[case::plain_http("http://pan.quark.cn/s/abc123")]
    #[case::bare_path("/s/abc123")]
    #[case::missing_id("https://pan.quark.cn/s/")]
    #[case::lookalike_host("https://pan.quark.cn.evil.com/s/abc")]
    #[case::slash_in_note("https://pan.quark.cn/s/abc 备用 https://pan.quark.cn/s/def")]
    fn rejects_non_quark_links(#[case] link: &str) {
        assert_eq!(
            validate(&caption_with_link(link)),
            Err(FormatError::LinkOrigin)
        );
    }

    #[rstest]
    #[case("https://pan.quark.cn/s/abc123 提取码：x7Yz")]
    #[case("https://pan.quark.cn/s/abc123  提取码 1234")]
    fn link_note_is_kept_out_of_the_link_field(#[case] link: &str) {
        let caption = caption_with_link(link);
        let fields = validate(&caption).unwrap();
        assert_eq!(fields.link, "https://pan.quark.cn/s/abc123");
    }

    #[test]
    fn caption_length_counts_utf16_units() {
        // Each emoji below is two UTF-16 units.
        let base = caption_with_link("https://pan.quark.cn/s/abc");
        let room = MAX_CAPTION_UTF16_LEN - base.encode_utf16().count();

        let fits = base.replacen("描述：B", &format!("描述：B{}", "字".repeat(room)), 1);
        assert_eq!(fits.encode_utf16().count(), MAX_CAPTION_UTF16_LEN);
        assert!(validate(&fits).is_ok());

        let over = base.replacen("描述：B", &format!("描述：B{}", "😀".repeat(room / 2 + 1)), 1);
        assert!(over.chars().count() <= MAX_CAPTION_UTF16_LEN);
        assert_eq!(validate(&over), Err(FormatError::TooLong));
    }

    #[rstest]
    #[case::leading_text("投稿\n名称：A\n\n描述：B\n\n链接：https://pan.quark.cn/s/abc\n\n📁 大小：1G\n🏷 标签：x")]
    #[case::trailing_text("名称：A\n\n描述：B\n\n链接：https://pan.quark.cn/s/abc\n\n📁 大小：1G\n🏷 标签：x\n谢谢")]
    #[case::single_newline("名称：A\n描述：B\n\n链接：https://pan.quark.cn/s/abc\n\n📁 大小：1G\n🏷 标签：x")]
    #[case::missing_tags("名称：A\n\n描述：B\n\n链接：https://pan.quark.cn/s/abc\n\n📁 大小：1G")]
    #[case::reordered("描述：B\n\n名称：A\n\n链接：https://pan.quark.cn/s/abc\n\n📁 大小：1G\n🏷 标签：x")]
    #[case::ascii_colon("名称:A\n\n描述:B\n\n链接:https://pan.quark.cn/s/abc\n\n📁 大小:1G\n🏷 标签:x")]
    #[case::multiline_description("名称：A\n\n描述：B\n更多\n\n链接：https://pan.quark.cn/s/abc\n\n📁 大小：1G\n🏷 标签：x")]
    fn rejects_template_mismatch(#[case] caption: &str) {
        assert_eq!(validate(caption), Err(FormatError::Template));
    }

    #[rstest]
    #[case("")]
    #[case("   \n ")]
    fn rejects_blank_caption(#[case] caption: &str) {
        assert_eq!(validate(caption), Err(FormatError::EmptyCaption));
    }

    #[test]
    fn missing_image_is_checked_before_caption() {
        let caption = caption_with_link("https://pan.quark.cn/s/abc");
        assert_eq!(
            validate_content(None, Some(&caption)),
            Err(FormatError::MissingImage)
        );
        assert_eq!(validate_content(None, None), Err(FormatError::MissingImage));
    }

    #[test]
    fn missing_caption_with_image() {
        let image = ImageRef::new("AgACAgUAAxkBAAIB");
        assert_eq!(
            validate_content(Some(&image), None),
            Err(FormatError::EmptyCaption)
        );
    }

    #[test]
    fn content_with_image_and_valid_caption() {
        let image = ImageRef::new("AgACAgUAAxkBAAIB");
        let caption = caption_with_link("https://pan.quark.cn/s/abc123");
        let fields = validate_content(Some(&image), Some(&caption)).unwrap();
        assert_eq!(fields.link, "https://pan.quark.cn/s/abc123");
    }
}
