//! Type-specific post payloads and the closed set of post variants.
//!
//! # Design
//! A post's JSON object holds the common fields and the variant fields side
//! by side; which variant fields exist is decided by the `type` tag. The
//! common part decodes into `PostCommon` and the variant part into one of the
//! payload structs below, both read from the same object.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::nullable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotePost {
    #[serde(deserialize_with = "nullable")]
    pub source: String,
    #[serde(deserialize_with = "nullable")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatLine {
    #[serde(deserialize_with = "nullable")]
    pub label: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub phrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPost {
    #[serde(alias = "dialog", deserialize_with = "nullable")]
    pub dialogue: Vec<ChatLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPost {
    #[serde(deserialize_with = "nullable")]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPost {
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub excerpt: String,
    #[serde(deserialize_with = "nullable")]
    pub link_author: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPost {
    #[serde(deserialize_with = "nullable")]
    pub answer: String,
    #[serde(deserialize_with = "nullable")]
    pub asking_name: String,
    #[serde(deserialize_with = "nullable")]
    pub asking_url: String,
    #[serde(deserialize_with = "nullable")]
    pub publisher: String,
    #[serde(deserialize_with = "nullable")]
    pub question: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPost {
    #[serde(deserialize_with = "nullable")]
    pub album_art: String,
    #[serde(deserialize_with = "nullable")]
    pub artist: String,
    #[serde(deserialize_with = "nullable")]
    pub audio_source_url: String,
    #[serde(deserialize_with = "nullable")]
    pub audio_type: String,
    #[serde(deserialize_with = "nullable")]
    pub audio_url: String,
    #[serde(deserialize_with = "nullable")]
    pub embed: String,
    #[serde(deserialize_with = "nullable")]
    pub player: String,
    #[serde(deserialize_with = "nullable")]
    pub plays: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPlayer {
    /// Embed markup; the API sends `false` when embedding is unavailable.
    #[serde(deserialize_with = "string_or_bool")]
    pub embed_code: String,
    /// Pixel width, or a string such as `"auto"`.
    pub width: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSource {
    #[serde(deserialize_with = "nullable")]
    pub height: u32,
    #[serde(deserialize_with = "nullable")]
    pub width: u32,
    #[serde(deserialize_with = "nullable")]
    pub video_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPost {
    #[serde(deserialize_with = "nullable")]
    pub html5_capable: bool,
    #[serde(deserialize_with = "nullable")]
    pub permalink_url: String,
    #[serde(deserialize_with = "nullable")]
    pub player: Vec<VideoPlayer>,
    #[serde(deserialize_with = "nullable")]
    pub thumbnail_height: u32,
    #[serde(deserialize_with = "nullable")]
    pub thumbnail_url: String,
    #[serde(deserialize_with = "nullable")]
    pub thumbnail_width: u32,
    #[serde(deserialize_with = "nullable")]
    pub video: HashMap<String, VideoSource>,
    #[serde(deserialize_with = "nullable")]
    pub video_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSize {
    #[serde(deserialize_with = "nullable")]
    pub height: u32,
    #[serde(deserialize_with = "nullable")]
    pub width: u32,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Photo {
    #[serde(deserialize_with = "nullable")]
    pub alt_sizes: Vec<PhotoSize>,
    #[serde(deserialize_with = "nullable")]
    pub caption: String,
    #[serde(deserialize_with = "nullable")]
    pub original_size: PhotoSize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoPost {
    #[serde(deserialize_with = "nullable")]
    pub image_permalink: String,
    #[serde(deserialize_with = "nullable")]
    pub photos: Vec<Photo>,
}

/// Accept either a JSON string or a boolean, rendering booleans as text.
fn string_or_bool<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Flag(bool),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Flag(flag) => flag.to_string(),
        Raw::Null(()) => String::new(),
    })
}

/// The shape a post decodes into, selected by its wire `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostVariant {
    Quote,
    Chat,
    Photo,
    Text,
    Link,
    Answer,
    Audio,
    Video,
    /// Unrecognized tag: only the common fields are decoded.
    Unknown,
}

impl PostVariant {
    pub const KNOWN: [PostVariant; 8] = [
        PostVariant::Quote,
        PostVariant::Chat,
        PostVariant::Photo,
        PostVariant::Text,
        PostVariant::Link,
        PostVariant::Answer,
        PostVariant::Audio,
        PostVariant::Video,
    ];

    /// Like `from_str`, but an unrecognized tag degrades to `Unknown`.
    pub fn from_tag_lossy(tag: &str) -> Self {
        tag.parse().unwrap_or(PostVariant::Unknown)
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            PostVariant::Quote => Some("quote"),
            PostVariant::Chat => Some("chat"),
            PostVariant::Photo => Some("photo"),
            PostVariant::Text => Some("text"),
            PostVariant::Link => Some("link"),
            PostVariant::Answer => Some("answer"),
            PostVariant::Audio => Some("audio"),
            PostVariant::Video => Some("video"),
            PostVariant::Unknown => None,
        }
    }

    /// An empty payload of this shape, filled in later by `decode`.
    pub fn empty(&self) -> PostContent {
        match self {
            PostVariant::Quote => PostContent::Quote(QuotePost::default()),
            PostVariant::Chat => PostContent::Chat(ChatPost::default()),
            PostVariant::Photo => PostContent::Photo(PhotoPost::default()),
            PostVariant::Text => PostContent::Text(TextPost::default()),
            PostVariant::Link => PostContent::Link(LinkPost::default()),
            PostVariant::Answer => PostContent::Answer(AnswerPost::default()),
            PostVariant::Audio => PostContent::Audio(AudioPost::default()),
            PostVariant::Video => PostContent::Video(VideoPost::default()),
            PostVariant::Unknown => PostContent::Unknown,
        }
    }

    /// Decode this shape's payload from a post's JSON object.
    pub fn decode(&self, raw: &Value) -> Result<PostContent, serde_json::Error> {
        Ok(match self {
            PostVariant::Quote => PostContent::Quote(QuotePost::deserialize(raw)?),
            PostVariant::Chat => PostContent::Chat(ChatPost::deserialize(raw)?),
            PostVariant::Photo => PostContent::Photo(PhotoPost::deserialize(raw)?),
            PostVariant::Text => PostContent::Text(TextPost::deserialize(raw)?),
            PostVariant::Link => PostContent::Link(LinkPost::deserialize(raw)?),
            PostVariant::Answer => PostContent::Answer(AnswerPost::deserialize(raw)?),
            PostVariant::Audio => PostContent::Audio(AudioPost::deserialize(raw)?),
            PostVariant::Video => PostContent::Video(VideoPost::deserialize(raw)?),
            PostVariant::Unknown => PostContent::Unknown,
        })
    }
}

impl FromStr for PostVariant {
    type Err = ApiError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        PostVariant::KNOWN
            .into_iter()
            .find(|variant| variant.tag() == Some(tag))
            .ok_or_else(|| ApiError::UnknownPostType(tag.to_string()))
    }
}

impl fmt::Display for PostVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("unknown"))
    }
}

/// Variant-specific payload of a full post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PostContent {
    Quote(QuotePost),
    Chat(ChatPost),
    Photo(PhotoPost),
    Text(TextPost),
    Link(LinkPost),
    Answer(AnswerPost),
    Audio(AudioPost),
    Video(VideoPost),
    Unknown,
}

impl PostContent {
    pub fn variant(&self) -> PostVariant {
        match self {
            PostContent::Quote(_) => PostVariant::Quote,
            PostContent::Chat(_) => PostVariant::Chat,
            PostContent::Photo(_) => PostVariant::Photo,
            PostContent::Text(_) => PostVariant::Text,
            PostContent::Link(_) => PostVariant::Link,
            PostContent::Answer(_) => PostVariant::Answer,
            PostContent::Audio(_) => PostVariant::Audio,
            PostContent::Video(_) => PostVariant::Video,
            PostContent::Unknown => PostVariant::Unknown,
        }
    }
}
