//! In-memory stand-in for the Tumblr v2 API.
//!
//! Every reply uses the `{meta, response}` envelope. Reads take their
//! arguments from the query string, writes from a urlencoded form. State is
//! seeded with two blogs, nine posts of every type, five followed blogs and
//! four followers.

use std::{collections::HashMap, str::FromStr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const BLOG_DOMAIN: &str = "tumblr.com";

/// Form and query fields that are not stored as post content.
const RESERVED_FIELDS: &[&str] = &["id", "type", "state", "tags", "reblog_key", "comment"];

#[derive(Clone, Debug, Serialize)]
pub struct StoredPost {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub blog_name: String,
    pub reblog_key: String,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub featured_timestamp: u64,
    pub state: String,
    pub tags: Vec<String>,
    pub note_count: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl StoredPost {
    /// Search ordering key: the featured time when set.
    fn cursor(&self) -> u64 {
        if self.featured_timestamp > 0 {
            self.featured_timestamp
        } else {
            self.timestamp
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoredBlog {
    pub name: String,
    pub title: String,
    pub description: String,
    pub followers: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub blogs: Vec<StoredBlog>,
    pub posts: Vec<StoredPost>,
    /// Blogs the authenticated user follows, by short name.
    pub following: Vec<String>,
    pub likes: Vec<u64>,
    next_id: u64,
    clock: u64,
}

pub type Db = Arc<RwLock<MockState>>;

/// `david.tumblr.com` becomes `david`; other hostnames are kept.
pub fn short_name(name: &str) -> &str {
    name.strip_suffix(BLOG_DOMAIN)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(name)
}

fn blog_url(name: &str) -> String {
    format!("https://{name}.{BLOG_DOMAIN}/")
}

impl MockState {
    pub fn seeded() -> Self {
        let mut state = MockState {
            next_id: 1,
            clock: 1_500_000_000,
            ..MockState::default()
        };
        state.blogs = vec![
            StoredBlog {
                name: "david".to_string(),
                title: "David's Log".to_string(),
                description: "notes".to_string(),
                followers: ["alice", "bob", "carol", "dan"].map(String::from).to_vec(),
            },
            StoredBlog {
                name: "staff".to_string(),
                title: "Staff".to_string(),
                description: "news from the team".to_string(),
                followers: Vec::new(),
            },
        ];
        state.following = ["staff", "engineering", "photography", "cats", "news"]
            .map(String::from)
            .to_vec();

        let seeds: [(&str, &str, &[&str], Value); 9] = [
            ("david", "text", &["cats"], json!({"title": "Hello", "body": "<p>first</p>"})),
            (
                "staff",
                "photo",
                &["cats"],
                json!({"caption": "a cat", "photos": [{"caption": "", "original_size": {"width": 500, "height": 400, "url": "https://media.example/cat.jpg"}, "alt_sizes": []}]}),
            ),
            ("david", "quote", &[], json!({"text": "Be brief.", "source": "someone"})),
            (
                "staff",
                "link",
                &["cats"],
                json!({"title": "Cats", "url": "https://cats.example/", "description": "more cats"}),
            ),
            (
                "david",
                "chat",
                &[],
                json!({"title": "talk", "dialogue": [{"label": "a:", "name": "a", "phrase": "hi"}, {"label": "b:", "name": "b", "phrase": "hello"}]}),
            ),
            ("staff", "audio", &[], json!({"artist": "Band", "plays": 12, "caption": null})),
            (
                "david",
                "video",
                &["cats"],
                json!({"caption": "clip", "player": [{"width": 250, "embed_code": false}], "video_type": "tumblr"}),
            ),
            ("staff", "answer", &[], json!({"question": "why?", "answer": "because", "asking_name": "alice"})),
            ("david", "gif", &[], json!({"frames": 12})),
        ];
        for (blog, kind, tags, fields) in seeds {
            let fields = match fields {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let post = state.new_post(blog, kind, "published", tags.iter().map(|t| t.to_string()).collect(), fields);
            state.posts.push(post);
        }
        // Featured later than it was posted.
        if let Some(post) = state.posts.iter_mut().find(|p| p.id == 4) {
            post.featured_timestamp = 1_600_000_000;
        }
        state.likes = vec![2, 5];
        state
    }

    fn new_post(
        &mut self,
        blog: &str,
        kind: &str,
        post_state: &str,
        tags: Vec<String>,
        fields: Map<String, Value>,
    ) -> StoredPost {
        let id = self.next_id;
        self.next_id += 1;
        self.clock += 100;
        StoredPost {
            id,
            kind: kind.to_string(),
            blog_name: blog.to_string(),
            reblog_key: Uuid::new_v4().simple().to_string()[..8].to_string(),
            timestamp: self.clock,
            featured_timestamp: 0,
            state: post_state.to_string(),
            tags,
            note_count: 0,
            fields,
        }
    }

    fn blog(&self, name: &str) -> Option<&StoredBlog> {
        let name = short_name(name);
        self.blogs.iter().find(|b| b.name == name)
    }

    fn post(&self, id: u64) -> Option<&StoredPost> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Published posts, newest first.
    fn timeline(&self) -> impl Iterator<Item = &StoredPost> {
        self.posts.iter().rev().filter(|p| p.state == "published")
    }

    fn blog_json(&self, blog: &StoredBlog) -> Value {
        let posts = self.posts.iter().filter(|p| p.blog_name == blog.name).count();
        json!({
            "name": blog.name,
            "title": blog.title,
            "description": blog.description,
            "url": blog_url(&blog.name),
            "posts": posts,
            "total_posts": posts,
            "updated": self.clock,
            "ask": false,
            "ask_page_title": null,
            "share_likes": true,
        })
    }
}

/// A reply in the API's envelope.
#[derive(Debug)]
pub struct Envelope {
    status: StatusCode,
    response: Value,
}

impl Envelope {
    fn ok(response: Value) -> Self {
        Self { status: StatusCode::OK, response }
    }

    fn created(response: Value) -> Self {
        Self { status: StatusCode::CREATED, response }
    }

    fn error(status: StatusCode) -> Self {
        Self { status, response: json!([]) }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let msg = self.status.canonical_reason().unwrap_or_default();
        let mut body = json!({
            "meta": {"status": self.status.as_u16(), "msg": msg},
            "response": self.response,
        });
        if !self.status.is_success() {
            body["errors"] = json!([{"title": msg, "code": self.status.as_u16()}]);
        }
        (self.status, Json(body)).into_response()
    }
}

type Reply = Result<Envelope, Envelope>;
type Fields = HashMap<String, String>;

fn param<T: FromStr>(fields: &Fields, key: &str) -> Option<T> {
    fields.get(key).and_then(|v| v.parse().ok())
}

fn required<T: FromStr>(fields: &Fields, key: &str) -> Result<T, Envelope> {
    param(fields, key).ok_or(Envelope::error(StatusCode::BAD_REQUEST))
}

/// `(offset, limit)` from the query, limit defaulting to 20.
fn window(query: &Fields) -> (usize, usize) {
    (param(query, "offset").unwrap_or(0), param(query, "limit").unwrap_or(20))
}

fn page<T>(items: impl Iterator<Item = T>, query: &Fields) -> Vec<T> {
    let (offset, limit) = window(query);
    items.skip(offset).take(limit).collect()
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Content fields carried by a write form. `quote` is stored as `text`.
fn content_fields(form: &Fields) -> Map<String, Value> {
    form.iter()
        .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| {
            let key = if key == "quote" { "text" } else { key.as_str() };
            (key.to_string(), Value::String(value.clone()))
        })
        .collect()
}

pub fn app() -> Router {
    app_with_state(MockState::seeded())
}

pub fn app_with_state(state: MockState) -> Router {
    let db: Db = Arc::new(RwLock::new(state));
    Router::new()
        .route("/user/info", get(user_info))
        .route("/user/dashboard", get(dashboard))
        .route("/user/likes", get(likes))
        .route("/user/following", get(user_following))
        .route("/user/follow", post(follow))
        .route("/user/unfollow", post(unfollow))
        .route("/user/like", post(like))
        .route("/user/unlike", post(unlike))
        .route("/blog/{name}/info", get(blog_info))
        .route("/blog/{name}/avatar", get(avatar))
        .route("/blog/{name}/posts", get(published_posts))
        .route("/blog/{name}/posts/queue", get(queued_posts))
        .route("/blog/{name}/posts/draft", get(draft_posts))
        .route("/blog/{name}/posts/submission", get(submitted_posts))
        .route("/blog/{name}/followers", get(followers))
        .route("/blog/{name}/following", get(blog_following))
        .route("/blog/{name}/post", post(create_post))
        .route("/blog/{name}/post/edit", post(edit_post))
        .route("/blog/{name}/post/delete", post(delete_post))
        .route("/blog/{name}/post/reblog", post(reblog_post))
        .route("/tagged", get(tagged))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn user_info(State(db): State<Db>) -> Reply {
    let state = db.read().await;
    let blogs: Vec<Value> = state
        .blogs
        .iter()
        .filter(|b| b.name == "david")
        .map(|b| {
            json!({
                "name": b.name,
                "title": b.title,
                "url": blog_url(&b.name),
                "primary": true,
                "followers": b.followers.len(),
                "tweet": null,
                "type": "public",
            })
        })
        .collect();
    Ok(Envelope::ok(json!({"user": {
        "name": "david",
        "following": state.following.len(),
        "likes": state.likes.len(),
        "default_post_format": "html",
        "blogs": blogs,
    }})))
}

async fn dashboard(State(db): State<Db>, Query(query): Query<Fields>) -> Reply {
    let state = db.read().await;
    let since: Option<u64> = param(&query, "since_id");
    let before: Option<u64> = param(&query, "before_id");
    let posts = page(
        state
            .timeline()
            .filter(|p| since.map_or(true, |since| p.id > since))
            .filter(|p| before.map_or(true, |before| p.id < before))
            .cloned(),
        &query,
    );
    debug!(count = posts.len(), "dashboard");
    Ok(Envelope::ok(json!({"posts": posts})))
}

async fn likes(State(db): State<Db>, Query(query): Query<Fields>) -> Reply {
    let state = db.read().await;
    let liked = state.timeline().filter(|p| state.likes.contains(&p.id)).cloned();
    Ok(Envelope::ok(json!({
        "liked_posts": page(liked, &query),
        "liked_count": state.likes.len(),
    })))
}

fn following_page(names: &[String], query: &Fields) -> Envelope {
    let blogs: Vec<Value> = page(names.iter(), query)
        .into_iter()
        .map(|name| json!({"name": name, "url": blog_url(name), "title": name, "updated": 0}))
        .collect();
    Envelope::ok(json!({"total_blogs": names.len(), "blogs": blogs}))
}

async fn user_following(State(db): State<Db>, Query(query): Query<Fields>) -> Reply {
    let state = db.read().await;
    Ok(following_page(&state.following, &query))
}

async fn blog_following(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(query): Query<Fields>,
) -> Reply {
    let state = db.read().await;
    let blog = state.blog(&name).ok_or(Envelope::error(StatusCode::NOT_FOUND))?;
    // Only the authenticated user's blog shares its follow list.
    let names = if blog.name == "david" {
        state.following.clone()
    } else {
        Vec::new()
    };
    Ok(following_page(&names, &query))
}

async fn follow(State(db): State<Db>, Form(form): Form<Fields>) -> Reply {
    let url: String = required(&form, "url")?;
    let name = short_name(&url).to_string();
    let mut state = db.write().await;
    if !state.following.contains(&name) {
        state.following.push(name);
    }
    Ok(Envelope::ok(json!({})))
}

async fn unfollow(State(db): State<Db>, Form(form): Form<Fields>) -> Reply {
    let url: String = required(&form, "url")?;
    let name = short_name(&url);
    db.write().await.following.retain(|f| f != name);
    Ok(Envelope::ok(json!({})))
}

/// Check `id` and `reblog_key` against a stored post.
fn keyed_post(state: &MockState, form: &Fields) -> Result<u64, Envelope> {
    let id: u64 = required(form, "id")?;
    let key: String = required(form, "reblog_key")?;
    let post = state.post(id).ok_or(Envelope::error(StatusCode::NOT_FOUND))?;
    if post.reblog_key != key {
        return Err(Envelope::error(StatusCode::BAD_REQUEST));
    }
    Ok(id)
}

async fn like(State(db): State<Db>, Form(form): Form<Fields>) -> Reply {
    let mut state = db.write().await;
    let id = keyed_post(&state, &form)?;
    if !state.likes.contains(&id) {
        state.likes.push(id);
    }
    Ok(Envelope::ok(json!({})))
}

async fn unlike(State(db): State<Db>, Form(form): Form<Fields>) -> Reply {
    let mut state = db.write().await;
    let id = keyed_post(&state, &form)?;
    state.likes.retain(|liked| *liked != id);
    Ok(Envelope::ok(json!({})))
}

async fn blog_info(State(db): State<Db>, Path(name): Path<String>) -> Reply {
    let state = db.read().await;
    let blog = state.blog(&name).ok_or(Envelope::error(StatusCode::NOT_FOUND))?;
    Ok(Envelope::ok(json!({"blog": state.blog_json(blog)})))
}

/// Answers with the avatar location in the body rather than a redirect.
async fn avatar(State(db): State<Db>, Path(name): Path<String>) -> Reply {
    let state = db.read().await;
    let blog = state.blog(&name).ok_or(Envelope::error(StatusCode::NOT_FOUND))?;
    Ok(Envelope::ok(json!({
        "location": format!("https://media.example/avatar/{}_64.png", blog.name),
    })))
}

async fn blog_posts(db: Db, name: String, query: Fields, post_state: &str) -> Reply {
    let state = db.read().await;
    let blog = state.blog(&name).ok_or(Envelope::error(StatusCode::NOT_FOUND))?;
    let kind = query.get("type");
    let tag = query.get("tag");
    let id: Option<u64> = param(&query, "id");
    let matching: Vec<StoredPost> = state
        .posts
        .iter()
        .rev()
        .filter(|p| p.blog_name == blog.name && p.state == post_state)
        .filter(|p| kind.map_or(true, |kind| &p.kind == kind))
        .filter(|p| tag.map_or(true, |tag| p.tags.contains(tag)))
        .filter(|p| id.map_or(true, |id| p.id == id))
        .cloned()
        .collect();
    let total = matching.len();
    Ok(Envelope::ok(json!({
        "blog": state.blog_json(blog),
        "posts": page(matching.into_iter(), &query),
        "total_posts": total,
    })))
}

async fn published_posts(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(query): Query<Fields>,
) -> Reply {
    blog_posts(db, name, query, "published").await
}

async fn queued_posts(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(query): Query<Fields>,
) -> Reply {
    blog_posts(db, name, query, "queued").await
}

async fn draft_posts(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(query): Query<Fields>,
) -> Reply {
    blog_posts(db, name, query, "draft").await
}

async fn submitted_posts(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(query): Query<Fields>,
) -> Reply {
    blog_posts(db, name, query, "submission").await
}

async fn followers(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(query): Query<Fields>,
) -> Reply {
    let state = db.read().await;
    let blog = state.blog(&name).ok_or(Envelope::error(StatusCode::NOT_FOUND))?;
    let users: Vec<Value> = page(blog.followers.iter(), &query)
        .into_iter()
        .map(|user| json!({"name": user, "url": blog_url(user), "following": false, "updated": 0}))
        .collect();
    Ok(Envelope::ok(json!({"total_users": blog.followers.len(), "users": users})))
}

async fn create_post(
    State(db): State<Db>,
    Path(name): Path<String>,
    Form(form): Form<Fields>,
) -> Reply {
    let mut state = db.write().await;
    let blog = state
        .blog(&name)
        .ok_or(Envelope::error(StatusCode::NOT_FOUND))?
        .name
        .clone();
    let kind = form.get("type").map_or("text", String::as_str);
    let post_state = form.get("state").map_or("published", String::as_str);
    let tags = form.get("tags").map(|t| split_tags(t)).unwrap_or_default();
    let post = state.new_post(&blog, kind, post_state, tags, content_fields(&form));
    let id = post.id;
    state.posts.push(post);
    debug!(id, blog = %blog, "created post");
    Ok(Envelope::created(json!({"id": id})))
}

async fn edit_post(
    State(db): State<Db>,
    Path(name): Path<String>,
    Form(form): Form<Fields>,
) -> Reply {
    let id: u64 = required(&form, "id")?;
    let mut state = db.write().await;
    let blog = short_name(&name).to_string();
    let post = state
        .posts
        .iter_mut()
        .find(|p| p.id == id && p.blog_name == blog)
        .ok_or(Envelope::error(StatusCode::NOT_FOUND))?;
    if let Some(tags) = form.get("tags") {
        post.tags = split_tags(tags);
    }
    if let Some(post_state) = form.get("state") {
        post.state = post_state.clone();
    }
    post.fields.extend(content_fields(&form));
    Ok(Envelope::ok(json!({"id": id})))
}

async fn delete_post(
    State(db): State<Db>,
    Path(name): Path<String>,
    Form(form): Form<Fields>,
) -> Reply {
    let id: u64 = required(&form, "id")?;
    let mut state = db.write().await;
    let blog = short_name(&name).to_string();
    let before = state.posts.len();
    state.posts.retain(|p| !(p.id == id && p.blog_name == blog));
    if state.posts.len() == before {
        return Err(Envelope::error(StatusCode::NOT_FOUND));
    }
    state.likes.retain(|liked| *liked != id);
    Ok(Envelope::ok(json!({"id": id})))
}

async fn reblog_post(
    State(db): State<Db>,
    Path(name): Path<String>,
    Form(form): Form<Fields>,
) -> Reply {
    let mut state = db.write().await;
    let blog = state
        .blog(&name)
        .ok_or(Envelope::error(StatusCode::NOT_FOUND))?
        .name
        .clone();
    let id = keyed_post(&state, &form)?;
    let original = state.post(id).cloned().ok_or(Envelope::error(StatusCode::NOT_FOUND))?;

    let mut fields = original.fields.clone();
    fields.insert(
        "reblog".to_string(),
        json!({"comment": form.get("comment").cloned().unwrap_or_default(), "tree_html": ""}),
    );
    fields.insert(
        "trail".to_string(),
        json!([{"blog": {"name": original.blog_name}, "post": {"id": original.id.to_string()}, "is_current_item": false}]),
    );
    let reblog = state.new_post(&blog, &original.kind, "published", original.tags.clone(), fields);
    let new_id = reblog.id;
    state.posts.push(reblog);
    if let Some(source) = state.posts.iter_mut().find(|p| p.id == id) {
        source.note_count += 1;
    }
    Ok(Envelope::created(json!({"id": new_id})))
}

async fn tagged(State(db): State<Db>, Query(query): Query<Fields>) -> Reply {
    let tag: String = required(&query, "tag")?;
    let before: Option<u64> = param(&query, "before");
    let limit: usize = param(&query, "limit").unwrap_or(20);
    let state = db.read().await;
    let mut posts: Vec<StoredPost> = state
        .timeline()
        .filter(|p| p.tags.contains(&tag))
        .filter(|p| before.map_or(true, |before| p.cursor() < before))
        .cloned()
        .collect();
    posts.sort_by_key(|p| std::cmp::Reverse(p.cursor()));
    posts.truncate(limit);
    Ok(Envelope::ok(json!(posts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_default_domain() {
        assert_eq!(short_name("david.tumblr.com"), "david");
        assert_eq!(short_name("david"), "david");
        assert_eq!(short_name("blog.example.org"), "blog.example.org");
    }

    #[test]
    fn seeded_state_covers_every_post_type() {
        let state = MockState::seeded();
        let kinds: Vec<&str> = state.posts.iter().map(|p| p.kind.as_str()).collect();
        assert_eq!(
            kinds,
            ["text", "photo", "quote", "link", "chat", "audio", "video", "answer", "gif"]
        );
        assert_eq!(state.following.len(), 5);
        assert!(state.posts.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn stored_post_serializes_flat() {
        let state = MockState::seeded();
        let json = serde_json::to_value(state.post(3).unwrap()).unwrap();
        assert_eq!(json["type"], "quote");
        assert_eq!(json["text"], "Be brief.");
        assert_eq!(json["blog_name"], "david");
        assert!(json.get("featured_timestamp").is_none());
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn content_fields_skip_reserved_and_rename_quote() {
        let form: Fields = [("type", "quote"), ("quote", "hi"), ("source", "me"), ("tags", "a,b")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let fields = content_fields(&form);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["text"], "hi");
        assert_eq!(fields["source"], "me");
    }

    #[test]
    fn split_tags_trims_and_drops_empty() {
        assert_eq!(split_tags(" a, b,,c "), ["a", "b", "c"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn window_defaults() {
        assert_eq!(window(&Fields::new()), (0, 20));
    }
}
