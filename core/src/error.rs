//! Error types for the Tumblr API client.
//!
//! # Design
//! A single closed `ApiError` enum covers every failure the library can
//! report. Navigation signals (`NoNextPage`, `NoPrevPage`) are ordinary
//! variants so callers branch on them with `matches!` instead of comparing
//! against shared sentinel values. `ErrorKind` groups the variants into the
//! categories callers usually care about.

use thiserror::Error;

use crate::pagination::PaginationMode;

/// Failure reported by a `Transport` implementation.
///
/// The library never inspects these; they reach the caller inside
/// `ApiError::Transport` exactly as the transport produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be completed (connection, TLS, signing, ...).
    #[error("request failed: {0}")]
    Request(String),
}

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// `populate_from_body` was called on an envelope with no body.
    #[error("unable to populate from empty body")]
    EmptyBody,

    #[error("no blog name provided")]
    MissingBlogName,

    #[error("no reblog key provided")]
    MissingReblogKey,

    /// More than one of `offset`, `since_id` and `before_id` was supplied.
    #[error("only one of offset, since_id and before_id may be specified")]
    MixedPaginationParams,

    /// A page fetched under one pagination mode was asked to page by another.
    #[error("cannot paginate by {requested} a page fetched by {current}")]
    PaginationModeMismatch {
        current: PaginationMode,
        requested: PaginationMode,
    },

    #[error("no next page")]
    NoNextPage,

    #[error("no prev page")]
    NoPrevPage,

    #[error("property {0} does not exist")]
    PropertyNotFound(String),

    #[error("unknown post type {0:?}")]
    UnknownPostType(String),

    /// An earlier attempt to decode the full posts of this page failed.
    #[error("full post decoding failed earlier: {0}")]
    HydrationFailed(String),

    #[error("unable to detect avatar location")]
    AvatarUnavailable,
}

/// Coarse category of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    Validation,
    Navigation,
    PropertyNotFound,
    UnknownVariant,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Decode(_)
            | ApiError::EmptyBody
            | ApiError::HydrationFailed(_)
            | ApiError::AvatarUnavailable => ErrorKind::Decode,
            ApiError::MissingBlogName
            | ApiError::MissingReblogKey
            | ApiError::MixedPaginationParams
            | ApiError::PaginationModeMismatch { .. } => ErrorKind::Validation,
            ApiError::NoNextPage | ApiError::NoPrevPage => ErrorKind::Navigation,
            ApiError::PropertyNotFound(_) => ErrorKind::PropertyNotFound,
            ApiError::UnknownPostType(_) => ErrorKind::UnknownVariant,
        }
    }

    /// True for the "ran out of pages" signals rather than real failures.
    pub fn is_end_of_results(&self) -> bool {
        self.kind() == ErrorKind::Navigation
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_errors_are_end_of_results() {
        assert!(ApiError::NoNextPage.is_end_of_results());
        assert!(ApiError::NoPrevPage.is_end_of_results());
        assert!(!ApiError::MissingBlogName.is_end_of_results());
    }

    #[test]
    fn kinds_follow_taxonomy() {
        let transport: ApiError = TransportError::Request("boom".to_string()).into();
        assert_eq!(transport.kind(), ErrorKind::Transport);
        assert_eq!(ApiError::MixedPaginationParams.kind(), ErrorKind::Validation);
        assert_eq!(
            ApiError::PropertyNotFound("x".to_string()).kind(),
            ErrorKind::PropertyNotFound
        );
        assert_eq!(
            ApiError::UnknownPostType("gif".to_string()).kind(),
            ErrorKind::UnknownVariant
        );
    }

    #[test]
    fn transport_error_display_is_unchanged() {
        let err: ApiError = TransportError::Status {
            status: 401,
            body: "unauthorized".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP 401: unauthorized");
    }

    #[test]
    fn mode_mismatch_names_both_modes() {
        let err = ApiError::PaginationModeMismatch {
            current: PaginationMode::Offset,
            requested: PaginationMode::SinceId,
        };
        assert_eq!(
            err.to_string(),
            "cannot paginate by since_id a page fetched by offset"
        );
    }
}
