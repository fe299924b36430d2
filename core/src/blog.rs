//! Blog lookups and the `BlogRef` handle.

use serde::Deserialize;
use tracing::debug;

use crate::actions;
use crate::error::{ApiError, Result};
use crate::follow::{self, FollowerList, FollowingList};
use crate::http::Transport;
use crate::params::Params;
use crate::post::PostRef;
use crate::posts::{self, Posts};
use crate::types::{nullable, Blog};

/// Domain appended to blog names that are not already fully qualified.
pub const BLOG_DOMAIN: &str = "tumblr.com";

/// `david` becomes `david.tumblr.com`; names containing a dot are kept.
pub fn normalize_blog_name(name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("{name}.{BLOG_DOMAIN}")
    }
}

/// `/blog/{normalized name}/{suffix}`.
pub(crate) fn blog_path(name: &str, suffix: &str) -> String {
    format!("/blog/{}/{suffix}", normalize_blog_name(name))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BlogInfo {
    #[serde(deserialize_with = "nullable")]
    blog: Blog,
}

/// Retrieve a blog's metadata.
pub fn get_blog_info(transport: &dyn Transport, name: &str) -> Result<Blog> {
    let response = transport.get(&blog_path(name, "info"))?;
    let info: BlogInfo = response.decode()?;
    debug!(blog = %info.blog.name, "fetched blog info");
    Ok(info.blog)
}

/// Retrieve the URL of a blog's avatar.
///
/// The API answers with a redirect; the `Location` header wins, then a
/// `location` member in the response body.
pub fn get_avatar(transport: &dyn Transport, name: &str) -> Result<String> {
    let mut response = transport.get(&blog_path(name, "avatar"))?;
    if let Some(location) = response.header("Location").filter(|l| !l.is_empty()) {
        return Ok(location.to_string());
    }
    response.populate_from_body()?;
    response
        .result
        .as_ref()
        .and_then(|result| result.get("location"))
        .and_then(|location| location.as_str())
        .map(str::to_string)
        .ok_or(ApiError::AvatarUnavailable)
}

/// A blog name bound to a transport; entry point for blog-scoped operations.
#[derive(Debug, Clone)]
pub struct BlogRef<'t> {
    pub name: String,
    transport: &'t dyn Transport,
}

impl<'t> BlogRef<'t> {
    pub fn new(transport: &'t dyn Transport, name: &str) -> Self {
        Self {
            name: name.to_string(),
            transport,
        }
    }

    pub fn info(&self) -> Result<Blog> {
        get_blog_info(self.transport, &self.name)
    }

    pub fn avatar(&self) -> Result<String> {
        get_avatar(self.transport, &self.name)
    }

    pub fn followers(&self, params: Params) -> Result<FollowerList<'t>> {
        follow::get_followers(self.transport, &self.name, params)
    }

    /// Blogs this blog follows.
    pub fn following(&self, params: Params) -> Result<FollowingList<'t>> {
        follow::get_blog_following(self.transport, &self.name, params)
    }

    pub fn posts(&self, params: Params) -> Result<Posts<'t>> {
        posts::get_posts(self.transport, &self.name, params)
    }

    pub fn queue(&self, params: Params) -> Result<Posts<'t>> {
        posts::get_queue(self.transport, &self.name, params)
    }

    pub fn drafts(&self, params: Params) -> Result<Posts<'t>> {
        posts::get_drafts(self.transport, &self.name, params)
    }

    pub fn submissions(&self, params: Params) -> Result<Posts<'t>> {
        posts::get_submissions(self.transport, &self.name, params)
    }

    pub fn create_post(&self, params: Params) -> Result<PostRef<'t>> {
        actions::create_post(self.transport, &self.name, params)
    }

    /// Reblog `post` onto this blog.
    pub fn reblog_post(&self, post: &PostRef<'_>, params: Params) -> Result<PostRef<'t>> {
        actions::reblog_post(self.transport, &self.name, post.id, &post.reblog_key, params)
    }

    pub fn follow(&self) -> Result<()> {
        actions::follow(self.transport, &self.name)
    }

    pub fn unfollow(&self) -> Result<()> {
        actions::unfollow(self.transport, &self.name)
    }
}
