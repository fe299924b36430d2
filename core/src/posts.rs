//! Blog post lists and liked posts, with lazily decoded full posts.
//!
//! # Design
//! A list page decodes its posts as `MiniPost` stubs up front and keeps the
//! raw response. The first call to `all()` decodes the full, variant-typed
//! posts from those same bytes and caches the result in a `OnceCell`; every
//! later call reuses it. A failed decode is cached too, and `HydrationPolicy`
//! decides what later calls see.

use std::cell::OnceCell;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::blog::blog_path;
use crate::error::{ApiError, Result};
use crate::http::Transport;
use crate::params::Params;
use crate::post::{decode_posts, hydrate, MiniPost, Post};
use crate::response::Response;
use crate::types::nullable;

/// What `all()` reports after the first full decode of a page failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HydrationPolicy {
    /// Later calls return an empty list and no error.
    #[default]
    Mask,
    /// Later calls return `ApiError::HydrationFailed` with the first error.
    Surface,
}

#[derive(Debug)]
enum Hydration<'t> {
    Loaded(Vec<Post<'t>>),
    Failed(String),
}

/// The raw page plus the memoized full posts decoded from it.
#[derive(Debug)]
struct FullPosts<'t> {
    transport: &'t dyn Transport,
    response: Response,
    /// Member of `response` holding the post array.
    field: &'static str,
    policy: HydrationPolicy,
    state: OnceCell<Hydration<'t>>,
}

impl<'t> FullPosts<'t> {
    fn new(transport: &'t dyn Transport, response: Response, field: &'static str) -> Self {
        Self {
            transport,
            response,
            field,
            policy: HydrationPolicy::default(),
            state: OnceCell::new(),
        }
    }

    fn all(&self, minis: &[MiniPost]) -> Result<&[Post<'t>]> {
        if let Some(state) = self.state.get() {
            return self.cached(state);
        }
        match self.decode(minis) {
            Ok(posts) => {
                debug!(count = posts.len(), field = self.field, "decoded full posts");
                let state = self.state.get_or_init(|| Hydration::Loaded(posts));
                self.cached(state)
            }
            Err(err) => {
                let _ = self.state.set(Hydration::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    fn cached<'a>(&self, state: &'a Hydration<'t>) -> Result<&'a [Post<'t>]> {
        match (state, self.policy) {
            (Hydration::Loaded(posts), _) => Ok(posts),
            (Hydration::Failed(_), HydrationPolicy::Mask) => Ok(&[]),
            (Hydration::Failed(message), HydrationPolicy::Surface) => {
                Err(ApiError::HydrationFailed(message.clone()))
            }
        }
    }

    fn decode(&self, minis: &[MiniPost]) -> Result<Vec<Post<'t>>> {
        let payload: Map<String, Value> = self.response.decode()?;
        match payload.get(self.field).and_then(Value::as_array) {
            Some(raw) => decode_posts(minis, raw, self.transport),
            None => Ok(hydrate(minis, self.transport)),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PostsPage {
    #[serde(deserialize_with = "nullable")]
    posts: Vec<MiniPost>,
    #[serde(deserialize_with = "nullable")]
    total_posts: u64,
}

/// One page of a blog's posts (published, queued, drafts or submissions).
#[derive(Debug)]
pub struct Posts<'t> {
    pub posts: Vec<MiniPost>,
    pub total_posts: u64,
    full: FullPosts<'t>,
}

impl<'t> Posts<'t> {
    pub fn with_hydration_policy(mut self, policy: HydrationPolicy) -> Self {
        self.full.policy = policy;
        self
    }

    /// Full posts of this page, decoded on first use.
    pub fn all(&self) -> Result<&[Post<'t>]> {
        self.full.all(&self.posts)
    }

    /// Full post at `index`; `None` when out of range or decoding failed.
    pub fn get(&self, index: usize) -> Option<&Post<'t>> {
        self.all().ok()?.get(index)
    }

    pub fn response(&self) -> &Response {
        &self.full.response
    }
}

fn query_posts<'t>(
    transport: &'t dyn Transport,
    suffix: &str,
    name: &str,
    params: Params,
) -> Result<Posts<'t>> {
    let path = blog_path(name, suffix);
    let response = transport.get_with_params(&path, &params)?;
    let page: PostsPage = response.decode()?;
    debug!(path = %path, count = page.posts.len(), total = page.total_posts, "fetched posts");
    Ok(Posts {
        posts: page.posts,
        total_posts: page.total_posts,
        full: FullPosts::new(transport, response, "posts"),
    })
}

/// A blog's published posts. Filters such as `type`, `tag` or `id` go in
/// `params`.
pub fn get_posts<'t>(transport: &'t dyn Transport, name: &str, params: Params) -> Result<Posts<'t>> {
    query_posts(transport, "posts", name, params)
}

pub fn get_queue<'t>(transport: &'t dyn Transport, name: &str, params: Params) -> Result<Posts<'t>> {
    query_posts(transport, "posts/queue", name, params)
}

pub fn get_drafts<'t>(transport: &'t dyn Transport, name: &str, params: Params) -> Result<Posts<'t>> {
    query_posts(transport, "posts/draft", name, params)
}

pub fn get_submissions<'t>(
    transport: &'t dyn Transport,
    name: &str,
    params: Params,
) -> Result<Posts<'t>> {
    query_posts(transport, "posts/submission", name, params)
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LikesPage {
    #[serde(deserialize_with = "nullable")]
    liked_posts: Vec<MiniPost>,
    #[serde(deserialize_with = "nullable")]
    liked_count: u64,
}

/// One page of the posts the authenticated user has liked.
#[derive(Debug)]
pub struct Likes<'t> {
    pub posts: Vec<MiniPost>,
    pub total_likes: u64,
    full: FullPosts<'t>,
}

impl<'t> Likes<'t> {
    pub fn with_hydration_policy(mut self, policy: HydrationPolicy) -> Self {
        self.full.policy = policy;
        self
    }

    pub fn all(&self) -> Result<&[Post<'t>]> {
        self.full.all(&self.posts)
    }

    /// Same as `all`.
    pub fn full(&self) -> Result<&[Post<'t>]> {
        self.all()
    }

    pub fn get(&self, index: usize) -> Option<&Post<'t>> {
        self.all().ok()?.get(index)
    }

    pub fn response(&self) -> &Response {
        &self.full.response
    }
}

/// Liked posts of the authenticated user. `params` may carry `limit`,
/// `offset`, `before` or `after` (timestamps).
pub fn get_likes<'t>(transport: &'t dyn Transport, params: Params) -> Result<Likes<'t>> {
    let response = transport.get_with_params("/user/likes", &params)?;
    let page: LikesPage = response.decode()?;
    debug!(count = page.liked_posts.len(), total = page.liked_count, "fetched likes");
    Ok(Likes {
        posts: page.liked_posts,
        total_likes: page.liked_count,
        full: FullPosts::new(transport, response, "liked_posts"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpMethod;
    use crate::testing::RecordingTransport;
    use crate::variant::{PostContent, PostVariant};

    const POSTS_BODY: &str = r#"{
        "meta": {"status": 200, "msg": "OK"},
        "response": {
            "total_posts": 3,
            "posts": [
                {"id": 1, "type": "text", "blog_name": "david", "reblog_key": "a", "title": "Hello", "body": "<p>hi</p>"},
                {"id": 2, "type": "quote", "blog_name": "david", "reblog_key": "b", "text": "To be", "source": "Hamlet"},
                {"id": 3, "type": "blink", "blog_name": "david", "reblog_key": "c", "timestamp": 42}
            ]
        }
    }"#;

    #[test]
    fn query_posts_returns_client_error() {
        let transport = RecordingTransport::failing(TransportError::Request("Client error".to_string()));
        assert!(matches!(
            get_posts(&transport, "david", Params::new()),
            Err(ApiError::Transport(_))
        ));
    }

    #[test]
    fn query_posts_returns_json_error() {
        let transport = RecordingTransport::ok("{");
        assert!(matches!(
            get_posts(&transport, "david", Params::new()),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn query_posts_keeps_response() {
        let transport = RecordingTransport::ok("{}");
        let params = Params::new().with("type", "photo");
        let posts = get_posts(&transport, "david", params.clone()).unwrap();
        assert_eq!(posts.response().body(), b"{}");
        assert!(posts.posts.is_empty());

        let call = transport.last_call().unwrap();
        assert_eq!(call.method, HttpMethod::Get);
        assert_eq!(call.path, "/blog/david.tumblr.com/posts");
        assert_eq!(call.params, params);
    }

    #[test]
    fn list_endpoints() {
        let transport = RecordingTransport::ok("{}");
        get_queue(&transport, "david", Params::new()).unwrap();
        get_drafts(&transport, "david", Params::new()).unwrap();
        get_submissions(&transport, "david", Params::new()).unwrap();
        let paths: Vec<String> = transport.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            [
                "/blog/david.tumblr.com/posts/queue",
                "/blog/david.tumblr.com/posts/draft",
                "/blog/david.tumblr.com/posts/submission",
            ]
        );
    }

    #[test]
    fn stubs_are_decoded_eagerly() {
        let transport = RecordingTransport::ok(POSTS_BODY);
        let posts = get_posts(&transport, "david", Params::new()).unwrap();
        assert_eq!(posts.total_posts, 3);
        let ids: Vec<u64> = posts.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(posts.posts[1].kind, "quote");
    }

    #[test]
    fn all_decodes_variants_and_degrades_unknown() {
        let transport = RecordingTransport::ok(POSTS_BODY);
        let posts = get_posts(&transport, "david", Params::new()).unwrap();
        let full = posts.all().unwrap();

        assert_eq!(full.len(), 3);
        assert_eq!(full[0].variant(), PostVariant::Text);
        assert_eq!(full[0].body, "<p>hi</p>");
        let PostContent::Quote(quote) = &full[1].content else {
            panic!("expected quote");
        };
        assert_eq!(quote.source, "Hamlet");
        assert_eq!(full[2].content, PostContent::Unknown);
        assert_eq!(full[2].timestamp, 42);
        assert_eq!(full[2].mini.reblog_key, "c");
    }

    #[test]
    fn all_is_memoized() {
        let transport = RecordingTransport::ok(POSTS_BODY);
        let mut posts = get_posts(&transport, "david", Params::new()).unwrap();
        let first = posts.all().unwrap().as_ptr();

        // A changed body would fail to decode; the cached result must win.
        posts.full.response.set_body("{");
        let second = posts.all().unwrap();
        assert!(std::ptr::eq(first, second.as_ptr()));
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn get_by_index() {
        let transport = RecordingTransport::ok(POSTS_BODY);
        let posts = get_posts(&transport, "david", Params::new()).unwrap();
        assert_eq!(posts.get(1).unwrap().mini.id, 2);
        assert!(posts.get(3).is_none());
    }

    #[test]
    fn hydration_failure_is_masked_after_first_call() {
        let transport = RecordingTransport::ok(POSTS_BODY);
        let mut posts = get_posts(&transport, "david", Params::new()).unwrap();
        posts.full.response.set_body("{");

        assert!(matches!(posts.all(), Err(ApiError::Decode(_))));
        assert!(posts.all().unwrap().is_empty());
        assert!(posts.get(0).is_none());
    }

    #[test]
    fn hydration_failure_can_be_surfaced() {
        let transport = RecordingTransport::ok(POSTS_BODY);
        let mut posts = get_posts(&transport, "david", Params::new())
            .unwrap()
            .with_hydration_policy(HydrationPolicy::Surface);
        posts.full.response.set_body("{");

        assert!(matches!(posts.all(), Err(ApiError::Decode(_))));
        assert!(matches!(posts.all(), Err(ApiError::HydrationFailed(_))));
        assert!(matches!(posts.all(), Err(ApiError::HydrationFailed(_))));
    }

    #[test]
    fn mistyped_variant_field_fails_hydration() {
        let body = r#"{"response": {"posts": [{"id": 1, "type": "audio", "plays": "lots"}]}}"#;
        let transport = RecordingTransport::ok(body);
        let posts = get_posts(&transport, "david", Params::new()).unwrap();
        assert!(matches!(posts.all(), Err(ApiError::Decode(_))));
        assert!(posts.all().unwrap().is_empty());
    }

    #[test]
    fn get_likes_client_error() {
        let transport = RecordingTransport::failing(TransportError::Request("Client error".to_string()));
        assert!(matches!(get_likes(&transport, Params::new()), Err(ApiError::Transport(_))));
    }

    #[test]
    fn get_likes_json_error() {
        let transport = RecordingTransport::ok("{");
        assert!(matches!(get_likes(&transport, Params::new()), Err(ApiError::Decode(_))));
    }

    #[test]
    fn get_likes_success() {
        let transport = RecordingTransport::ok("{}");
        let likes = get_likes(&transport, Params::new()).unwrap();
        assert!(likes.full.state.get().is_none());
        assert!(likes.full().unwrap().is_empty());

        let call = transport.last_call().unwrap();
        assert_eq!(call.method, HttpMethod::Get);
        assert_eq!(call.path, "/user/likes");
        assert!(call.params.is_empty());
    }

    #[test]
    fn likes_full_decodes_liked_posts() {
        let body = r#"{"response": {"liked_count": 10, "liked_posts": [
            {"id": 8, "type": "link", "blog_name": "other", "url": "https://example.com", "title": "Ex"}
        ]}}"#;
        let transport = RecordingTransport::ok(body);
        let likes = get_likes(&transport, Params::new().with("limit", "1")).unwrap();
        assert_eq!(likes.total_likes, 10);
        assert_eq!(likes.posts[0].blog_name, "other");

        let full = likes.all().unwrap();
        let PostContent::Link(link) = &full[0].content else {
            panic!("expected link");
        };
        assert_eq!(link.url, "https://example.com");
        assert_eq!(likes.get(0).unwrap().to_ref().id, 8);
    }

    #[test]
    fn likes_full_json_error() {
        let transport = RecordingTransport::ok("{}");
        let mut likes = get_likes(&transport, Params::new()).unwrap();
        likes.full.response.set_body("{");
        assert!(likes.full().is_err());
    }
}
