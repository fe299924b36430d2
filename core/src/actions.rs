//! Write operations: publishing, editing, reblogging, deleting, liking and
//! following.
//!
//! Every operation validates its required arguments before calling the
//! transport and returns transport or decode failures unchanged.

use serde::Deserialize;
use tracing::debug;

use crate::blog::{blog_path, normalize_blog_name};
use crate::error::{ApiError, Result};
use crate::http::Transport;
use crate::params::{with_post_id, Params};
use crate::post::PostRef;
use crate::types::nullable;

#[derive(Deserialize, Default)]
#[serde(default)]
struct CreatedPost {
    #[serde(deserialize_with = "nullable")]
    id: u64,
}

/// POST to a blog path and turn the returned id into a `PostRef`.
fn do_post<'t>(
    transport: &'t dyn Transport,
    suffix: &str,
    blog_name: &str,
    params: Params,
) -> Result<PostRef<'t>> {
    if blog_name.is_empty() {
        return Err(ApiError::MissingBlogName);
    }
    let path = blog_path(blog_name, suffix);
    let response = transport.post_with_params(&path, &params)?;
    let created: CreatedPost = response.decode()?;
    debug!(path = %path, id = created.id, "post written");

    let mut post_ref = PostRef::by_id(transport, created.id);
    post_ref.set_blog_name(blog_name);
    Ok(post_ref)
}

/// Create a post on the blog `name`.
pub fn create_post<'t>(
    transport: &'t dyn Transport,
    name: &str,
    params: Params,
) -> Result<PostRef<'t>> {
    do_post(transport, "post", name, params)
}

pub fn edit_post(
    transport: &dyn Transport,
    blog_name: &str,
    post_id: u64,
    params: Params,
) -> Result<()> {
    if blog_name.is_empty() {
        return Err(ApiError::MissingBlogName);
    }
    let params = with_post_id(params, post_id);
    transport.post_with_params(&blog_path(blog_name, "post/edit"), &params)?;
    Ok(())
}

/// Reblog post `post_id` (identified together with `reblog_key`) onto
/// `blog_name`.
pub fn reblog_post<'t>(
    transport: &'t dyn Transport,
    blog_name: &str,
    post_id: u64,
    reblog_key: &str,
    params: Params,
) -> Result<PostRef<'t>> {
    if reblog_key.is_empty() {
        return Err(ApiError::MissingReblogKey);
    }
    let mut params = with_post_id(params, post_id);
    params.set("reblog_key", reblog_key);
    do_post(transport, "post/reblog", blog_name, params)
}

pub fn delete_post(transport: &dyn Transport, blog_name: &str, post_id: u64) -> Result<()> {
    if blog_name.is_empty() {
        return Err(ApiError::MissingBlogName);
    }
    let params = with_post_id(Params::new(), post_id);
    transport.post_with_params(&blog_path(blog_name, "post/delete"), &params)?;
    Ok(())
}

fn do_like(transport: &dyn Transport, path: &str, post_id: u64, reblog_key: &str) -> Result<()> {
    let mut params = with_post_id(Params::new(), post_id);
    params.set("reblog_key", reblog_key);
    transport.post_with_params(path, &params)?;
    Ok(())
}

/// Like a post on behalf of the authenticated user.
pub fn like_post(transport: &dyn Transport, post_id: u64, reblog_key: &str) -> Result<()> {
    do_like(transport, "/user/like", post_id, reblog_key)
}

pub fn unlike_post(transport: &dyn Transport, post_id: u64, reblog_key: &str) -> Result<()> {
    do_like(transport, "/user/unlike", post_id, reblog_key)
}

fn do_follow(transport: &dyn Transport, path: &str, blog_name: &str) -> Result<()> {
    let params = Params::new().with("url", normalize_blog_name(blog_name));
    transport.post_with_params(path, &params)?;
    Ok(())
}

/// Follow a blog as the authenticated user.
pub fn follow(transport: &dyn Transport, blog_name: &str) -> Result<()> {
    do_follow(transport, "/user/follow", blog_name)
}

pub fn unfollow(transport: &dyn Transport, blog_name: &str) -> Result<()> {
    do_follow(transport, "/user/unfollow", blog_name)
}
