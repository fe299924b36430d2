//! Post identity, post handles and the polymorphic full post.
//!
//! # Design
//! List endpoints first decode every post as a `MiniPost` stub. The concrete
//! shape of a post is only known once its `type` tag has been read, so full
//! decoding is a second pass over the same JSON: `hydrate` turns each stub
//! into an empty `Post` of the right variant bound to the transport, then
//! `Post::fill` decodes the common fields and the variant payload from the
//! post's JSON object.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::actions;
use crate::error::{ApiError, Result};
use crate::http::Transport;
use crate::params::Params;
use crate::types::{nullable, Blog};
use crate::variant::{PostContent, PostVariant};

/// Minimal post identity returned by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniPost {
    #[serde(deserialize_with = "nullable")]
    pub id: u64,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(deserialize_with = "nullable")]
    pub blog_name: String,
    #[serde(deserialize_with = "nullable")]
    pub reblog_key: String,
}

/// A post identity bound to a transport; the unit that can act on a post.
#[derive(Debug, Clone)]
pub struct PostRef<'t> {
    post: MiniPost,
    transport: &'t dyn Transport,
}

impl<'t> PostRef<'t> {
    pub fn new(transport: &'t dyn Transport, post: MiniPost) -> Self {
        Self { post, transport }
    }

    /// A reference knowing only the post id.
    pub fn by_id(transport: &'t dyn Transport, id: u64) -> Self {
        Self::new(
            transport,
            MiniPost {
                id,
                ..MiniPost::default()
            },
        )
    }

    pub fn mini(&self) -> &MiniPost {
        &self.post
    }

    pub fn set_transport(&mut self, transport: &'t dyn Transport) {
        self.transport = transport;
    }

    pub(crate) fn set_blog_name(&mut self, name: &str) {
        self.post.blog_name = name.to_string();
    }

    pub fn edit(&self, params: Params) -> Result<()> {
        actions::edit_post(self.transport, &self.post.blog_name, self.post.id, params)
    }

    pub fn delete(&self) -> Result<()> {
        actions::delete_post(self.transport, &self.post.blog_name, self.post.id)
    }

    pub fn like(&self) -> Result<()> {
        actions::like_post(self.transport, self.post.id, &self.post.reblog_key)
    }

    pub fn unlike(&self) -> Result<()> {
        actions::unlike_post(self.transport, self.post.id, &self.post.reblog_key)
    }

    /// Reblog this post onto the blog `name`.
    pub fn reblog_on_blog(&self, name: &str, params: Params) -> Result<PostRef<'t>> {
        actions::reblog_post(
            self.transport,
            name,
            self.post.id,
            &self.post.reblog_key,
            params,
        )
    }
}

impl Deref for PostRef<'_> {
    type Target = MiniPost;

    fn deref(&self) -> &MiniPost {
        &self.post
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReblogInfo {
    #[serde(deserialize_with = "nullable")]
    pub comment: String,
    #[serde(deserialize_with = "nullable")]
    pub tree_html: String,
}

/// Id of a trail post; the API sends it as a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrailPostId {
    Number(u64),
    Text(String),
}

impl TrailPostId {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            TrailPostId::Number(id) => Some(*id),
            TrailPostId::Text(id) => id.parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailPost {
    pub id: Option<TrailPostId>,
}

/// One hop of the reblog trail leading back to the root post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReblogTrailItem {
    #[serde(deserialize_with = "nullable")]
    pub blog: Blog,
    #[serde(deserialize_with = "nullable")]
    pub content: String,
    #[serde(deserialize_with = "nullable")]
    pub content_raw: String,
    #[serde(deserialize_with = "nullable")]
    pub is_current_item: bool,
    #[serde(deserialize_with = "nullable")]
    pub post: TrailPost,
}

/// Fields shared by every post type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostCommon {
    #[serde(flatten)]
    pub mini: MiniPost,
    #[serde(deserialize_with = "nullable")]
    pub body: String,
    #[serde(deserialize_with = "nullable")]
    pub can_like: bool,
    #[serde(deserialize_with = "nullable")]
    pub can_reblog: bool,
    #[serde(deserialize_with = "nullable")]
    pub can_reply: bool,
    #[serde(deserialize_with = "nullable")]
    pub can_send_in_message: bool,
    #[serde(deserialize_with = "nullable")]
    pub caption: String,
    #[serde(deserialize_with = "nullable")]
    pub date: String,
    #[serde(deserialize_with = "nullable")]
    pub display_avatar: bool,
    #[serde(deserialize_with = "nullable")]
    pub followed: bool,
    #[serde(deserialize_with = "nullable")]
    pub format: String,
    #[serde(deserialize_with = "nullable")]
    pub highlighted: Vec<Value>,
    #[serde(deserialize_with = "nullable")]
    pub liked: bool,
    #[serde(deserialize_with = "nullable")]
    pub note_count: u64,
    #[serde(deserialize_with = "nullable")]
    pub permalink_url: String,
    #[serde(deserialize_with = "nullable")]
    pub post_url: String,
    #[serde(deserialize_with = "nullable")]
    pub reblog: ReblogInfo,
    #[serde(deserialize_with = "nullable")]
    pub recommended_color: String,
    #[serde(deserialize_with = "nullable")]
    pub recommended_source: bool,
    #[serde(deserialize_with = "nullable")]
    pub short_url: String,
    #[serde(deserialize_with = "nullable")]
    pub slug: String,
    #[serde(deserialize_with = "nullable")]
    pub source_title: String,
    #[serde(deserialize_with = "nullable")]
    pub source_url: String,
    #[serde(deserialize_with = "nullable")]
    pub state: String,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
    #[serde(deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub timestamp: u64,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub featured_timestamp: u64,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub track_name: String,
    #[serde(deserialize_with = "nullable")]
    pub trail: Vec<ReblogTrailItem>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl PostCommon {
    /// Field names reachable through `property`.
    pub const PROPERTY_NAMES: &'static [&'static str] = &[
        "id",
        "type",
        "blog_name",
        "reblog_key",
        "body",
        "can_like",
        "can_reblog",
        "can_reply",
        "can_send_in_message",
        "caption",
        "date",
        "display_avatar",
        "followed",
        "format",
        "highlighted",
        "liked",
        "note_count",
        "permalink_url",
        "post_url",
        "reblog",
        "recommended_color",
        "recommended_source",
        "short_url",
        "slug",
        "source_title",
        "source_url",
        "state",
        "summary",
        "tags",
        "timestamp",
        "featured_timestamp",
        "track_name",
        "trail",
    ];

    /// Look up a common field by its wire name.
    ///
    /// Only the fields shared by every post type are reachable; variant
    /// fields are read through `Post::content`.
    pub fn property(&self, name: &str) -> Result<Value> {
        let value = match name {
            "id" => json!(self.mini.id),
            "type" => json!(self.mini.kind),
            "blog_name" => json!(self.mini.blog_name),
            "reblog_key" => json!(self.mini.reblog_key),
            "body" => json!(self.body),
            "can_like" => json!(self.can_like),
            "can_reblog" => json!(self.can_reblog),
            "can_reply" => json!(self.can_reply),
            "can_send_in_message" => json!(self.can_send_in_message),
            "caption" => json!(self.caption),
            "date" => json!(self.date),
            "display_avatar" => json!(self.display_avatar),
            "followed" => json!(self.followed),
            "format" => json!(self.format),
            "highlighted" => json!(self.highlighted),
            "liked" => json!(self.liked),
            "note_count" => json!(self.note_count),
            "permalink_url" => json!(self.permalink_url),
            "post_url" => json!(self.post_url),
            "reblog" => json!(self.reblog),
            "recommended_color" => json!(self.recommended_color),
            "recommended_source" => json!(self.recommended_source),
            "short_url" => json!(self.short_url),
            "slug" => json!(self.slug),
            "source_title" => json!(self.source_title),
            "source_url" => json!(self.source_url),
            "state" => json!(self.state),
            "summary" => json!(self.summary),
            "tags" => json!(self.tags),
            "timestamp" => json!(self.timestamp),
            "featured_timestamp" => json!(self.featured_timestamp),
            "track_name" => json!(self.track_name),
            "trail" => json!(self.trail),
            _ => return Err(ApiError::PropertyNotFound(name.to_string())),
        };
        Ok(value)
    }

    /// Timestamp used as the `before` cursor: the featured time when set.
    pub fn cursor_timestamp(&self) -> u64 {
        if self.featured_timestamp > 0 {
            self.featured_timestamp
        } else {
            self.timestamp
        }
    }
}

impl fmt::Display for PostCommon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?)
    }
}

/// A fully decoded post: common fields plus its variant payload.
#[derive(Debug, Clone)]
pub struct Post<'t> {
    pub common: PostCommon,
    pub content: PostContent,
    transport: &'t dyn Transport,
}

impl<'t> Post<'t> {
    /// An empty post shaped by the stub's type tag, carrying its identity.
    pub fn shell(transport: &'t dyn Transport, mini: &MiniPost) -> Self {
        Self {
            common: PostCommon {
                mini: mini.clone(),
                ..PostCommon::default()
            },
            content: PostVariant::from_tag_lossy(&mini.kind).empty(),
            transport,
        }
    }

    /// Decode the common fields and the already selected variant payload.
    pub fn fill(&mut self, raw: &Value) -> Result<()> {
        let common = PostCommon::deserialize(raw)?;
        let content = self.content.variant().decode(raw)?;
        self.common = common;
        self.content = content;
        Ok(())
    }

    pub fn variant(&self) -> PostVariant {
        self.content.variant()
    }

    pub fn property(&self, name: &str) -> Result<Value> {
        self.common.property(name)
    }

    /// A handle for acting on this post.
    pub fn to_ref(&self) -> PostRef<'t> {
        PostRef::new(self.transport, self.common.mini.clone())
    }
}

impl Deref for Post<'_> {
    type Target = PostCommon;

    fn deref(&self) -> &PostCommon {
        &self.common
    }
}

/// One empty post per stub, each of the variant named by its type tag.
///
/// Unrecognized tags degrade to `PostVariant::Unknown` instead of failing the
/// batch.
pub fn hydrate<'t>(minis: &[MiniPost], transport: &'t dyn Transport) -> Vec<Post<'t>> {
    minis.iter().map(|mini| Post::shell(transport, mini)).collect()
}

/// Hydrate `minis` and fill each from the matching raw JSON object.
pub(crate) fn decode_posts<'t>(
    minis: &[MiniPost],
    raw: &[Value],
    transport: &'t dyn Transport,
) -> Result<Vec<Post<'t>>> {
    let mut posts = hydrate(minis, transport);
    posts.truncate(raw.len());
    for (post, value) in posts.iter_mut().zip(raw) {
        post.fill(value)?;
    }
    Ok(posts)
}

/// Stub pass over a list of raw post objects.
pub(crate) fn minis_from_raw(raw: &[Value]) -> Result<Vec<MiniPost>> {
    raw.iter()
        .map(|value| MiniPost::deserialize(value).map_err(ApiError::from))
        .collect()
}
