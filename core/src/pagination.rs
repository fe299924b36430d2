//! Cursor modes and offset arithmetic shared by the paged containers.
//!
//! # Design
//! Three cursor strategies exist and a page only ever follows the one it was
//! fetched with. `PaginationMode` names them; `OffsetWindow` holds the
//! offset/limit/total state used by the follower and following lists.

use std::fmt;

use crate::error::{ApiError, Result};
use crate::params::Params;

/// How a page locates the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationMode {
    /// `offset` advanced by the page size.
    Offset,
    /// `since_id` set to the last item's id.
    SinceId,
    /// `before_id` set to the last item's id.
    BeforeId,
}

impl PaginationMode {
    pub const ALL: [PaginationMode; 3] = [
        PaginationMode::Offset,
        PaginationMode::SinceId,
        PaginationMode::BeforeId,
    ];

    /// Request parameter carrying this mode's cursor.
    pub fn param(&self) -> &'static str {
        match self {
            PaginationMode::Offset => "offset",
            PaginationMode::SinceId => "since_id",
            PaginationMode::BeforeId => "before_id",
        }
    }

    /// The mode named by `params`, if any.
    ///
    /// Fails with `MixedPaginationParams` when more than one cursor parameter
    /// is present.
    pub fn detect(params: &Params) -> Result<Option<PaginationMode>> {
        let mut present = PaginationMode::ALL
            .into_iter()
            .filter(|mode| params.is_set(mode.param()));
        let mode = present.next();
        if present.next().is_some() {
            return Err(ApiError::MixedPaginationParams);
        }
        Ok(mode)
    }

    /// Reject paging by `requested` when the page is tagged with another mode.
    pub fn check(current: Option<PaginationMode>, requested: PaginationMode) -> Result<()> {
        match current {
            Some(current) if current != requested => Err(ApiError::PaginationModeMismatch {
                current,
                requested,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PaginationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

/// Offset pagination bounded by a server-reported total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffsetWindow {
    pub offset: u64,
    /// Requested page size; 0 when the request did not set one.
    pub limit: u64,
    pub total: u64,
}

impl OffsetWindow {
    /// Window described by the `offset` and `limit` request params.
    pub fn from_params(params: &Params, total: u64) -> Self {
        Self {
            offset: params.get_parsed("offset").unwrap_or(0),
            limit: params.get_parsed("limit").unwrap_or(0),
            total,
        }
    }

    /// The explicit limit, or the number of items actually on the page.
    pub fn effective_limit(&self, observed: usize) -> u64 {
        if self.limit > 0 {
            self.limit
        } else {
            observed as u64
        }
    }

    /// `(offset, limit)` of the following page.
    pub fn next(&self, observed: usize) -> Result<(u64, u64)> {
        if observed == 0 {
            return Err(ApiError::NoNextPage);
        }
        let limit = self.effective_limit(observed);
        let offset = self.offset.checked_add(limit).ok_or(ApiError::NoNextPage)?;
        if offset >= self.total {
            return Err(ApiError::NoNextPage);
        }
        Ok((offset, limit))
    }

    /// `(offset, limit)` of the preceding page, clamped at 0.
    pub fn prev(&self, observed: usize) -> Result<(u64, u64)> {
        if self.offset == 0 {
            return Err(ApiError::NoPrevPage);
        }
        let limit = self.effective_limit(observed);
        Ok((self.offset.saturating_sub(limit), limit))
    }

    /// Copy of `params` moved to `(offset, limit)`.
    pub fn apply(params: &Params, (offset, limit): (u64, u64)) -> Params {
        let mut params = params.clone();
        params.set_uint("limit", limit).set_uint("offset", offset);
        params
    }
}
