//! Single entry point bundling a transport with every API operation.
//!
//! # Design
//! `Client` holds only a borrowed transport and carries no state between
//! calls. Each method forwards to the matching free function, so the free
//! functions stay usable on their own and the façade adds nothing but
//! convenience. Returned pages and handles borrow the same transport and can
//! page or act without going back through the client.

use crate::actions;
use crate::blog::{self, BlogRef};
use crate::dashboard::{self, Dashboard};
use crate::error::Result;
use crate::follow::{self, FollowerList, FollowingList};
use crate::http::Transport;
use crate::params::Params;
use crate::post::PostRef;
use crate::posts::{self, Likes, Posts};
use crate::search::{self, SearchResults};
use crate::types::{Blog, User};
use crate::user;

/// Synchronous client over a caller-supplied `Transport`.
#[derive(Debug, Clone, Copy)]
pub struct Client<'t> {
    transport: &'t dyn Transport,
}

impl<'t> Client<'t> {
    pub fn new(transport: &'t dyn Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &'t dyn Transport {
        self.transport
    }

    pub fn user_info(&self) -> Result<User> {
        user::get_user_info(self.transport)
    }

    pub fn dashboard(&self, params: Params) -> Result<Dashboard<'t>> {
        dashboard::get_dashboard(self.transport, params)
    }

    pub fn likes(&self, params: Params) -> Result<Likes<'t>> {
        posts::get_likes(self.transport, params)
    }

    pub fn following(&self, params: Params) -> Result<FollowingList<'t>> {
        follow::get_following(self.transport, params)
    }

    pub fn followers(&self, name: &str, params: Params) -> Result<FollowerList<'t>> {
        follow::get_followers(self.transport, name, params)
    }

    /// Handle for blog-scoped calls on `name`.
    pub fn blog(&self, name: &str) -> BlogRef<'t> {
        BlogRef::new(self.transport, name)
    }

    pub fn blog_info(&self, name: &str) -> Result<Blog> {
        blog::get_blog_info(self.transport, name)
    }

    pub fn avatar(&self, name: &str) -> Result<String> {
        blog::get_avatar(self.transport, name)
    }

    pub fn posts(&self, name: &str, params: Params) -> Result<Posts<'t>> {
        posts::get_posts(self.transport, name, params)
    }

    pub fn queue(&self, name: &str, params: Params) -> Result<Posts<'t>> {
        posts::get_queue(self.transport, name, params)
    }

    pub fn drafts(&self, name: &str, params: Params) -> Result<Posts<'t>> {
        posts::get_drafts(self.transport, name, params)
    }

    pub fn submissions(&self, name: &str, params: Params) -> Result<Posts<'t>> {
        posts::get_submissions(self.transport, name, params)
    }

    pub fn create_post(&self, name: &str, params: Params) -> Result<PostRef<'t>> {
        actions::create_post(self.transport, name, params)
    }

    pub fn edit_post(&self, name: &str, post_id: u64, params: Params) -> Result<()> {
        actions::edit_post(self.transport, name, post_id, params)
    }

    pub fn reblog_post(
        &self,
        name: &str,
        post_id: u64,
        reblog_key: &str,
        params: Params,
    ) -> Result<PostRef<'t>> {
        actions::reblog_post(self.transport, name, post_id, reblog_key, params)
    }

    pub fn delete_post(&self, name: &str, post_id: u64) -> Result<()> {
        actions::delete_post(self.transport, name, post_id)
    }

    /// Handle for a post known only by id.
    pub fn post_ref(&self, post_id: u64) -> PostRef<'t> {
        PostRef::by_id(self.transport, post_id)
    }

    pub fn like(&self, post_id: u64, reblog_key: &str) -> Result<()> {
        actions::like_post(self.transport, post_id, reblog_key)
    }

    pub fn unlike(&self, post_id: u64, reblog_key: &str) -> Result<()> {
        actions::unlike_post(self.transport, post_id, reblog_key)
    }

    pub fn follow(&self, name: &str) -> Result<()> {
        actions::follow(self.transport, name)
    }

    pub fn unfollow(&self, name: &str) -> Result<()> {
        actions::unfollow(self.transport, name)
    }

    pub fn tagged(&self, tag: &str, params: Params) -> Result<SearchResults<'t>> {
        search::tagged_search(self.transport, tag, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::HttpMethod;
    use crate::testing::RecordingTransport;

    #[test]
    fn read_calls_hit_expected_paths() {
        let transport = RecordingTransport::ok("{}");
        let client = Client::new(&transport);

        client.user_info().unwrap();
        client.likes(Params::new()).unwrap();
        client.following(Params::new()).unwrap();
        client.followers("david", Params::new()).unwrap();
        client.blog_info("david").unwrap();
        client.posts("david", Params::new()).unwrap();
        client.queue("david", Params::new()).unwrap();
        client.drafts("david", Params::new()).unwrap();
        client.submissions("david", Params::new()).unwrap();

        let paths: Vec<String> = transport.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            [
                "/user/info",
                "/user/likes",
                "/user/following",
                "/blog/david.tumblr.com/followers",
                "/blog/david.tumblr.com/info",
                "/blog/david.tumblr.com/posts",
                "/blog/david.tumblr.com/posts/queue",
                "/blog/david.tumblr.com/posts/draft",
                "/blog/david.tumblr.com/posts/submission",
            ]
        );
        assert!(transport.calls().iter().all(|c| c.method == HttpMethod::Get));
    }

    #[test]
    fn avatar_without_location() {
        let transport = RecordingTransport::ok("{}");
        let client = Client::new(&transport);
        assert!(matches!(client.avatar("david"), Err(ApiError::AvatarUnavailable)));
        assert_eq!(transport.last_call().unwrap().path, "/blog/david.tumblr.com/avatar");
    }

    #[test]
    fn write_calls_post_form_params() {
        let transport = RecordingTransport::ok(r#"{"response":{"id":99}}"#);
        let client = Client::new(&transport);

        let created = client.create_post("david", Params::new().with("type", "text")).unwrap();
        assert_eq!(created.id, 99);
        assert_eq!(created.blog_name, "david");

        client.edit_post("david", 99, Params::new().with("body", "new")).unwrap();
        client.delete_post("david", 99).unwrap();
        client.like(99, "key").unwrap();
        client.unlike(99, "key").unwrap();
        client.follow("staff").unwrap();
        client.unfollow("staff.example.org").unwrap();

        let calls = transport.calls();
        assert!(calls.iter().all(|c| c.method == HttpMethod::Post));
        assert_eq!(calls[1].path, "/blog/david.tumblr.com/post/edit");
        assert_eq!(calls[1].params.get("id"), Some("99"));
        assert_eq!(calls[2].path, "/blog/david.tumblr.com/post/delete");
        assert_eq!(calls[3].path, "/user/like");
        assert_eq!(calls[3].params.get("reblog_key"), Some("key"));
        assert_eq!(calls[4].path, "/user/unlike");
        assert_eq!(calls[5].params.get("url"), Some("staff.tumblr.com"));
        assert_eq!(calls[6].path, "/user/unfollow");
        assert_eq!(calls[6].params.get("url"), Some("staff.example.org"));
    }

    #[test]
    fn validation_happens_before_the_transport() {
        let transport = RecordingTransport::ok("{}");
        let client = Client::new(&transport);

        assert!(matches!(
            client.create_post("", Params::new()),
            Err(ApiError::MissingBlogName)
        ));
        assert!(matches!(
            client.reblog_post("david", 1, "", Params::new()),
            Err(ApiError::MissingReblogKey)
        ));
        assert!(matches!(client.delete_post("", 1), Err(ApiError::MissingBlogName)));
        assert!(matches!(
            client.dashboard(Params::new().with("offset", "0").with("since_id", "1")),
            Err(ApiError::MixedPaginationParams)
        ));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn handles_share_the_transport() {
        let transport = RecordingTransport::ok(r#"{"response":{"id":7}}"#);
        let client = Client::new(&transport);

        let post = client.post_ref(5);
        assert_eq!(post.id, 5);
        let blog = client.blog("david");
        let reblogged = blog.reblog_post(&post, Params::new()).unwrap_err();
        assert!(matches!(reblogged, ApiError::MissingReblogKey));

        transport.respond_with(r#"{"response":[]}"#);
        let results = client.tagged("cats", Params::new()).unwrap();
        assert!(results.posts.is_empty());
        assert_eq!(transport.last_call().unwrap().path, "/tagged");
    }
}
