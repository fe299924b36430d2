//! Entity DTOs returned by the blog, user and follower endpoints.
//!
//! # Design
//! Every DTO uses container-level `#[serde(default)]`: the API omits fields
//! freely and a body without a `response` member must still decode. Fields
//! also go through `nullable`, so an explicit `null` decodes as the default
//! rather than failing the whole payload. These
//! structs carry no transport handle; `Blog::to_ref` produces the actionable
//! `BlogRef` when further calls are needed.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::blog::BlogRef;
use crate::http::Transport;

/// Full blog metadata from `/blog/{name}/info` and reblog trails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blog {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub posts: i64,
    #[serde(deserialize_with = "nullable")]
    pub ask: bool,
    #[serde(deserialize_with = "nullable")]
    pub ask_anon: bool,
    #[serde(rename = "ask_page_title", deserialize_with = "nullable")]
    pub ask_anon_page_title: String,
    #[serde(deserialize_with = "nullable")]
    pub can_send_fan_mail: bool,
    #[serde(deserialize_with = "nullable")]
    pub can_submit: bool,
    #[serde(deserialize_with = "nullable")]
    pub can_subscribe: bool,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub followed: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_blocked_from_primary: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_nsfw: bool,
    #[serde(deserialize_with = "nullable")]
    pub share_likes: bool,
    #[serde(deserialize_with = "nullable")]
    pub submission_page_title: String,
    #[serde(deserialize_with = "nullable")]
    pub subscribed: bool,
    #[serde(deserialize_with = "nullable")]
    pub total_posts: i64,
    #[serde(deserialize_with = "nullable")]
    pub updated: i64,
}

impl Blog {
    pub fn to_ref<'t>(&self, transport: &'t dyn Transport) -> BlogRef<'t> {
        BlogRef::new(transport, &self.name)
    }
}

impl fmt::Display for Blog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?)
    }
}

/// Subset of blog information listed in the current user's info.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortBlog {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(rename = "primary", deserialize_with = "nullable")]
    pub is_primary: bool,
    #[serde(rename = "followers", deserialize_with = "nullable")]
    pub follower_count: u32,
    #[serde(rename = "tweet", deserialize_with = "nullable")]
    pub post_to_twitter: String,
    #[serde(rename = "facebook", deserialize_with = "nullable")]
    pub post_to_facebook: String,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub visibility: String,
}

impl ShortBlog {
    pub fn to_ref<'t>(&self, transport: &'t dyn Transport) -> BlogRef<'t> {
        BlogRef::new(transport, &self.name)
    }
}

/// The authenticated user, from `/user/info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "nullable")]
    pub following: i64,
    #[serde(deserialize_with = "nullable")]
    pub default_post_format: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub likes: i64,
    #[serde(deserialize_with = "nullable")]
    pub blogs: Vec<ShortBlog>,
}

/// One entry of a blog's follower list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Follower {
    #[serde(deserialize_with = "nullable")]
    pub following: bool,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub updated: i64,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
}

/// Decode `null` as the type's default instead of failing.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
