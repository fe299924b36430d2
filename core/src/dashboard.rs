//! The authenticated user's dashboard.
//!
//! # Design
//! A dashboard page is tagged with the cursor mode named by its request
//! params (`offset`, `since_id` or `before_id`). Paging by another mode is
//! rejected; an untagged page (no cursor param) may start any mode and the
//! next page is tagged with it.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::http::Transport;
use crate::pagination::PaginationMode;
use crate::params::Params;
use crate::post::{decode_posts, minis_from_raw, Post};
use crate::types::nullable;

#[derive(Deserialize, Default)]
#[serde(default)]
struct DashboardPage {
    #[serde(deserialize_with = "nullable")]
    posts: Vec<Value>,
}

/// One page of the dashboard, with fully decoded posts.
#[derive(Debug)]
pub struct Dashboard<'t> {
    pub posts: Vec<Post<'t>>,
    params: Params,
    mode: Option<PaginationMode>,
    transport: &'t dyn Transport,
}

/// Fetch a dashboard page.
///
/// At most one of `offset`, `since_id` and `before_id` may be set; otherwise
/// fails with `MixedPaginationParams` without calling the transport.
pub fn get_dashboard<'t>(transport: &'t dyn Transport, params: Params) -> Result<Dashboard<'t>> {
    let mode = PaginationMode::detect(&params)?;
    let response = transport.get_with_params("/user/dashboard", &params)?;
    let page: DashboardPage = response.decode()?;
    let minis = minis_from_raw(&page.posts)?;
    let posts = decode_posts(&minis, &page.posts, transport)?;
    debug!(count = posts.len(), mode = ?mode, "fetched dashboard page");
    Ok(Dashboard {
        posts,
        params,
        mode,
        transport,
    })
}

impl<'t> Dashboard<'t> {
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Cursor mode this page was fetched with, if any.
    pub fn mode(&self) -> Option<PaginationMode> {
        self.mode
    }

    /// Next page using this page's mode (offset when untagged).
    pub fn next(&self) -> Result<Dashboard<'t>> {
        match self.mode.unwrap_or(PaginationMode::Offset) {
            PaginationMode::Offset => self.next_by_offset(),
            PaginationMode::SinceId => self.next_by_since_id(),
            PaginationMode::BeforeId => self.next_by_before_id(),
        }
    }

    /// Next page starting after the last post's id.
    pub fn next_by_since_id(&self) -> Result<Dashboard<'t>> {
        self.next_by_last_id(PaginationMode::SinceId)
    }

    /// Next page of posts older than the last post's id.
    pub fn next_by_before_id(&self) -> Result<Dashboard<'t>> {
        self.next_by_last_id(PaginationMode::BeforeId)
    }

    /// Next page by advancing `offset` by the size of this page.
    pub fn next_by_offset(&self) -> Result<Dashboard<'t>> {
        PaginationMode::check(self.mode, PaginationMode::Offset)?;
        if self.posts.is_empty() {
            return Err(ApiError::NoNextPage);
        }
        let offset = self
            .params
            .get_parsed::<u64>("offset")
            .unwrap_or(0)
            .checked_add(self.posts.len() as u64)
            .ok_or(ApiError::NoNextPage)?;
        let mut params = self.params.clone();
        params.set_uint("offset", offset);
        get_dashboard(self.transport, params)
    }

    fn next_by_last_id(&self, mode: PaginationMode) -> Result<Dashboard<'t>> {
        PaginationMode::check(self.mode, mode)?;
        let last = self.posts.last().ok_or(ApiError::NoNextPage)?;
        let mut params = self.params.clone();
        params.set_uint(mode.param(), last.mini.id);
        get_dashboard(self.transport, params)
    }
}
