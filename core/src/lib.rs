//! Synchronous client core for the Tumblr v2 API.
//!
//! # Overview
//! Describes every API call as an `HttpRequest` and hands it to a
//! caller-supplied `Transport`, which performs the round-trip (and OAuth
//! signing). Responses come back as raw bytes plus headers and are decoded
//! here into typed entities, polymorphic posts and paged containers.
//!
//! # Design
//! - `Client` is a thin façade; every operation is also a free function
//!   taking `&dyn Transport`.
//! - Pages and handles borrow the transport (`'t`) and fetch further pages
//!   themselves. Paging always clones the stored `Params`; a page's own
//!   request params never change.
//! - Posts decode in two passes: a `MiniPost` stub selects the variant, then
//!   the same JSON object fills the common fields and the variant payload.
//!   `Posts` and `Likes` defer the second pass until `all()` and memoize it.
//! - Dashboard pages are tagged with one cursor mode; follower and following
//!   lists page by offset bounded by the reported total; tag search pages by
//!   the last post's timestamp.
//! - DTOs are defined independently from the mock-server crate; the
//!   integration tests catch schema drift.

pub mod actions;
pub mod blog;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod follow;
pub mod http;
pub mod pagination;
pub mod params;
pub mod post;
pub mod posts;
pub mod response;
pub mod search;
pub mod types;
pub mod user;
pub mod variant;

#[cfg(test)]
mod testing;

pub use blog::{normalize_blog_name, BlogRef, BLOG_DOMAIN};
pub use client::Client;
pub use dashboard::Dashboard;
pub use error::{ApiError, ErrorKind, Result, TransportError};
pub use follow::{FollowerList, FollowingList, FollowingSource};
pub use http::{HttpMethod, HttpRequest, Transport};
pub use pagination::{OffsetWindow, PaginationMode};
pub use params::Params;
pub use post::{hydrate, MiniPost, Post, PostCommon, PostRef};
pub use posts::{HydrationPolicy, Likes, Posts};
pub use response::Response;
pub use search::SearchResults;
pub use types::{Blog, Follower, ShortBlog, User};
pub use variant::{PostContent, PostVariant};
