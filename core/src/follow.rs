//! Following and follower lists, paged by offset against a reported total.

use serde::Deserialize;
use tracing::debug;

use crate::blog::blog_path;
use crate::error::Result;
use crate::http::Transport;
use crate::pagination::OffsetWindow;
use crate::params::Params;
use crate::types::{nullable, Blog, Follower};

/// Where a following list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowingSource {
    /// Blogs the authenticated user follows.
    User,
    /// Blogs the named blog follows.
    Blog(String),
}

impl FollowingSource {
    fn path(&self) -> String {
        match self {
            FollowingSource::User => "/user/following".to_string(),
            FollowingSource::Blog(name) => blog_path(name, "following"),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FollowingPage {
    #[serde(deserialize_with = "nullable")]
    total_blogs: u64,
    #[serde(deserialize_with = "nullable")]
    blogs: Vec<Blog>,
}

/// One page of followed blogs.
#[derive(Debug)]
pub struct FollowingList<'t> {
    pub total: u64,
    pub blogs: Vec<Blog>,
    source: FollowingSource,
    params: Params,
    window: OffsetWindow,
    transport: &'t dyn Transport,
}

fn fetch_following<'t>(
    transport: &'t dyn Transport,
    source: FollowingSource,
    params: Params,
) -> Result<FollowingList<'t>> {
    let path = source.path();
    let response = transport.get_with_params(&path, &params)?;
    let page: FollowingPage = response.decode()?;
    let window = OffsetWindow::from_params(&params, page.total_blogs);
    debug!(
        path = %path,
        count = page.blogs.len(),
        total = page.total_blogs,
        offset = window.offset,
        "fetched following"
    );
    Ok(FollowingList {
        total: page.total_blogs,
        blogs: page.blogs,
        source,
        params,
        window,
        transport,
    })
}

/// Blogs the authenticated user follows. `params` may carry `offset` and
/// `limit`.
pub fn get_following<'t>(transport: &'t dyn Transport, params: Params) -> Result<FollowingList<'t>> {
    fetch_following(transport, FollowingSource::User, params)
}

/// Blogs followed by the blog `name`.
pub fn get_blog_following<'t>(
    transport: &'t dyn Transport,
    name: &str,
    params: Params,
) -> Result<FollowingList<'t>> {
    fetch_following(transport, FollowingSource::Blog(name.to_string()), params)
}

impl<'t> FollowingList<'t> {
    pub fn offset(&self) -> u64 {
        self.window.offset
    }

    pub fn limit(&self) -> u64 {
        self.window.limit
    }

    pub fn source(&self) -> &FollowingSource {
        &self.source
    }

    pub fn next(&self) -> Result<FollowingList<'t>> {
        let cursor = self.window.next(self.blogs.len())?;
        let params = OffsetWindow::apply(&self.params, cursor);
        fetch_following(self.transport, self.source.clone(), params)
    }

    pub fn prev(&self) -> Result<FollowingList<'t>> {
        let cursor = self.window.prev(self.blogs.len())?;
        let params = OffsetWindow::apply(&self.params, cursor);
        fetch_following(self.transport, self.source.clone(), params)
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FollowerPage {
    #[serde(deserialize_with = "nullable")]
    total_users: u64,
    #[serde(deserialize_with = "nullable")]
    users: Vec<Follower>,
}

/// One page of a blog's followers.
#[derive(Debug)]
pub struct FollowerList<'t> {
    pub total: u64,
    pub followers: Vec<Follower>,
    name: String,
    params: Params,
    window: OffsetWindow,
    transport: &'t dyn Transport,
}

/// Followers of the blog `name`. `params` may carry `offset` and `limit`.
pub fn get_followers<'t>(
    transport: &'t dyn Transport,
    name: &str,
    params: Params,
) -> Result<FollowerList<'t>> {
    let path = blog_path(name, "followers");
    let response = transport.get_with_params(&path, &params)?;
    let page: FollowerPage = response.decode()?;
    let window = OffsetWindow::from_params(&params, page.total_users);
    debug!(
        path = %path,
        count = page.users.len(),
        total = page.total_users,
        offset = window.offset,
        "fetched followers"
    );
    Ok(FollowerList {
        total: page.total_users,
        followers: page.users,
        name: name.to_string(),
        params,
        window,
        transport,
    })
}

impl<'t> FollowerList<'t> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> u64 {
        self.window.offset
    }

    pub fn limit(&self) -> u64 {
        self.window.limit
    }

    pub fn next(&self) -> Result<FollowerList<'t>> {
        let cursor = self.window.next(self.followers.len())?;
        get_followers(self.transport, &self.name, OffsetWindow::apply(&self.params, cursor))
    }

    pub fn prev(&self) -> Result<FollowerList<'t>> {
        let cursor = self.window.prev(self.followers.len())?;
        get_followers(self.transport, &self.name, OffsetWindow::apply(&self.params, cursor))
    }
}
