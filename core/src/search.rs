//! Tag search.

use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::http::Transport;
use crate::params::Params;
use crate::post::{decode_posts, minis_from_raw, Post};

/// One page of posts carrying a tag.
#[derive(Debug)]
pub struct SearchResults<'t> {
    pub posts: Vec<Post<'t>>,
    params: Params,
    transport: &'t dyn Transport,
}

/// Search public posts tagged `tag`.
///
/// `params` may carry `before` (a timestamp), `limit` and `filter`.
pub fn tagged_search<'t>(
    transport: &'t dyn Transport,
    tag: &str,
    mut params: Params,
) -> Result<SearchResults<'t>> {
    params.set("tag", tag);
    search(transport, params)
}

fn search<'t>(transport: &'t dyn Transport, params: Params) -> Result<SearchResults<'t>> {
    let response = transport.get_with_params("/tagged", &params)?;
    // The payload is the array itself.
    let raw: Vec<Value> = response.decode()?;
    let minis = minis_from_raw(&raw)?;
    let posts = decode_posts(&minis, &raw, transport)?;
    debug!(tag = params.get("tag").unwrap_or_default(), count = posts.len(), "fetched tagged posts");
    Ok(SearchResults {
        posts,
        params,
        transport,
    })
}

impl<'t> SearchResults<'t> {
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn tag(&self) -> Option<&str> {
        self.params.get("tag")
    }

    /// Posts older than the last one on this page.
    pub fn next(&self) -> Result<SearchResults<'t>> {
        let last = self.posts.last().ok_or(ApiError::NoNextPage)?;
        let mut params = self.params.clone();
        params.set_uint("before", last.cursor_timestamp());
        search(self.transport, params)
    }
}
