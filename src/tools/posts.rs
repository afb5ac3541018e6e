//! Social-media timeline tool: fetch the latest posts of a user.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::Tool;

/// A post as handed to the model. Threads are collapsed into one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: String,
    pub created_on: DateTime<Utc>,
    pub text: String,
    pub url: String,
    pub author_name: String,
    pub author_url: String,
}

#[derive(Debug, Deserialize)]
struct TimelinePage {
    #[serde(default)]
    entries: Vec<TimelineEntry>,
    cursor_top: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimelineEntry {
    Thread { tweets: Vec<RawPost> },
    Single(RawPost),
}

#[derive(Debug, Clone, Deserialize)]
struct RawPost {
    id: String,
    created_on: DateTime<Utc>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    url: String,
    author: RawAuthor,
}

#[derive(Debug, Clone, Deserialize)]
struct RawAuthor {
    name: String,
    #[serde(default)]
    profile_url: String,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Self {
            id: raw.id,
            created_on: raw.created_on,
            text: raw.text,
            url: raw.url,
            author_name: raw.author.name,
            author_url: raw.author.profile_url,
        }
    }
}

/// Turn timeline entries into posts, dropping entries without text.
///
/// A thread keeps the joined text of all its tweets and the metadata of the
/// newest one.
fn collapse_entries(entries: Vec<TimelineEntry>) -> Vec<Post> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            TimelineEntry::Thread { tweets } => collapse_thread(tweets),
            TimelineEntry::Single(post) if !post.text.is_empty() => Some(post.into()),
            TimelineEntry::Single(_) => None,
        })
        .collect()
}

fn collapse_thread(tweets: Vec<RawPost>) -> Option<Post> {
    let mut combined = String::new();
    for tweet in tweets.iter().filter(|t| !t.text.is_empty()) {
        combined.push_str(&tweet.text);
        combined.push('\n');
    }
    let combined = combined.trim();

    let latest = tweets.iter().fold(None::<&RawPost>, |latest, tweet| match latest {
        Some(l) if tweet.created_on <= l.created_on => Some(l),
        _ => Some(tweet),
    })?;

    if combined.is_empty() {
        return None;
    }

    let mut post = Post::from(latest.clone());
    post.text = combined.to_string();
    Some(post)
}

/// Fetches a user's newest posts from a JSON timeline API.
///
/// The API is queried at `GET {base_url}/users/{user_id}/posts`. The tool keeps
/// a per-user pagination cursor so repeated calls only return posts newer than
/// the previous fetch. Fetches for the same user are serialized on that cursor.
pub struct UserPostsTool {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    cursors: Mutex<HashMap<String, Arc<Mutex<Option<String>>>>>,
}

impl UserPostsTool {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; PostAnalyst/1.0)")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            cursors: Mutex::new(HashMap::new()),
        })
    }

    async fn cursor_slot(&self, user_id: &str) -> Arc<Mutex<Option<String>>> {
        self.cursors
            .lock()
            .await
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Current pagination cursor for `user_id`, if any fetch succeeded yet.
    pub async fn cursor(&self, user_id: &str) -> Option<String> {
        self.cursor_slot(user_id).await.lock().await.clone()
    }

    /// Fetch posts newer than the stored cursor and advance it.
    pub async fn fetch(&self, user_id: &str) -> anyhow::Result<Vec<Post>> {
        let slot = self.cursor_slot(user_id).await;
        // Held until the cursor is advanced.
        let mut cursor = slot.lock().await;
        let url = format!(
            "{}/users/{}/posts",
            self.base_url,
            urlencoding::encode(user_id)
        );

        let mut request = self.client.get(&url);
        if let Some(cursor) = cursor.as_ref() {
            request = request.query(&[("cursor", cursor)]);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Timeline request for '{}' failed: HTTP {}",
                user_id,
                status
            ));
        }

        let page: TimelinePage = response.json().await?;
        let posts = collapse_entries(page.entries);

        if let Some(top) = page.cursor_top {
            *cursor = Some(top);
        }

        tracing::debug!(user_id, posts = posts.len(), "Fetched timeline page");
        Ok(posts)
    }
}

#[async_trait]
impl Tool for UserPostsTool {
    fn name(&self) -> &str {
        "get_user_posts"
    }

    fn description(&self) -> &str {
        "Fetch the latest posts of a social-media user. Returns a JSON array of posts with id, timestamp, text, url and author."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {
                    "type": "string",
                    "description": "The user's handle, without the leading @"
                }
            },
            "required": ["user_id"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<Value> {
        let user_id = args["user_id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'user_id' argument"))?;

        let posts = self.fetch(user_id.trim_start_matches('@')).await?;
        Ok(serde_json::to_value(posts)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn raw(id: &str, ts: &str, text: &str) -> RawPost {
        RawPost {
            id: id.to_string(),
            created_on: ts.parse().unwrap(),
            text: text.to_string(),
            url: format!("https://x.com/p/{}", id),
            author: RawAuthor {
                name: "Trader".to_string(),
                profile_url: "https://x.com/trader".to_string(),
            },
        }
    }

    #[test]
    fn thread_collapses_to_newest_tweet() {
        let posts = collapse_entries(vec![TimelineEntry::Thread {
            tweets: vec![
                raw("1", "2025-01-01T10:00:00Z", "first"),
                raw("3", "2025-01-01T12:00:00Z", "third"),
                raw("2", "2025-01-01T11:00:00Z", ""),
            ],
        }]);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "3");
        assert_eq!(posts[0].text, "first\nthird");
        assert_eq!(posts[0].url, "https://x.com/p/3");
    }

    #[test]
    fn entries_without_text_are_dropped() {
        let posts = collapse_entries(vec![
            TimelineEntry::Single(raw("1", "2025-01-01T10:00:00Z", "")),
            TimelineEntry::Thread {
                tweets: vec![raw("2", "2025-01-01T10:00:00Z", "")],
            },
            TimelineEntry::Thread { tweets: vec![] },
            TimelineEntry::Single(raw("4", "2025-01-01T10:00:00Z", "kept")),
        ]);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "4");
        assert_eq!(posts[0].author_name, "Trader");
    }

    #[test]
    fn page_parses_threads_and_singles() {
        let page: TimelinePage = serde_json::from_str(
            r#"{
                "entries": [
                    {"id": "9", "created_on": "2025-02-01T00:00:00Z", "text": "solo",
                     "author": {"name": "A"}},
                    {"tweets": [
                        {"id": "10", "created_on": "2025-02-02T00:00:00Z", "text": "t1",
                         "author": {"name": "A"}}
                    ]}
                ],
                "cursor_top": "abc"
            }"#,
        )
        .unwrap();

        assert_eq!(page.cursor_top.as_deref(), Some("abc"));
        assert!(matches!(page.entries[0], TimelineEntry::Single(_)));
        assert!(matches!(page.entries[1], TimelineEntry::Thread { .. }));
    }

    /// Serve `bodies` to consecutive connections, returning the request lines seen.
    async fn serve(bodies: Vec<(u16, &'static str)>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in bodies {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let request = String::from_utf8_lossy(&buf);
                seen.push(request.lines().next().unwrap_or_default().to_string());

                let response = format!(
                    "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            seen
        });

        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn cursor_advances_per_user() {
        let (base, server) = serve(vec![
            (
                200,
                r#"{"entries":[{"id":"1","created_on":"2025-01-01T00:00:00Z","text":"hi","author":{"name":"A"}}],"cursor_top":"c1"}"#,
            ),
            (200, r#"{"entries":[],"cursor_top":"c2"}"#),
        ])
        .await;
        let tool =
            UserPostsTool::new(&base, Some("tok".to_string()), Duration::from_secs(5)).unwrap();

        let first = tool.execute(json!({"user_id": "@trader"})).await.unwrap();
        assert_eq!(first[0]["text"], "hi");
        assert_eq!(tool.cursor("trader").await.as_deref(), Some("c1"));

        let second = tool.execute(json!({"user_id": "trader"})).await.unwrap();
        assert_eq!(second, json!([]));
        assert_eq!(tool.cursor("trader").await.as_deref(), Some("c2"));

        let seen = server.await.unwrap();
        assert_eq!(seen[0], "GET /users/trader/posts HTTP/1.1");
        assert_eq!(seen[1], "GET /users/trader/posts?cursor=c1 HTTP/1.1");
    }

    #[tokio::test]
    async fn http_error_is_reported_and_cursor_kept() {
        let (base, server) = serve(vec![(503, r#"{"error":"down"}"#)]).await;
        let tool = UserPostsTool::new(&base, None, Duration::from_secs(5)).unwrap();

        let err = tool.execute(json!({"user_id": "trader"})).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(tool.cursor("trader").await.is_none());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_fetches_for_one_user_share_the_cursor() {
        let (base, server) = serve(vec![
            (
                200,
                r#"{"entries":[{"id":"1","created_on":"2025-01-01T00:00:00Z","text":"hi","author":{"name":"A"}}],"cursor_top":"c1"}"#,
            ),
            (200, r#"{"entries":[],"cursor_top":"c2"}"#),
        ])
        .await;
        let tool = UserPostsTool::new(&base, None, Duration::from_secs(5)).unwrap();

        let (first, second) = tokio::join!(
            tool.execute(json!({"user_id": "trader"})),
            tool.execute(json!({"user_id": "trader"}))
        );
        let first = first.unwrap();
        let second = second.unwrap();

        // Exactly one of the two calls saw the post; the other ran after the cursor moved.
        let seen_posts = first.as_array().unwrap().len() + second.as_array().unwrap().len();
        assert_eq!(seen_posts, 1);
        assert_eq!(tool.cursor("trader").await.as_deref(), Some("c2"));

        let seen = server.await.unwrap();
        assert_eq!(seen[0], "GET /users/trader/posts HTTP/1.1");
        assert_eq!(seen[1], "GET /users/trader/posts?cursor=c1 HTTP/1.1");
    }

    #[tokio::test]
    async fn configured_timeout_bounds_the_request() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        // Accept but never answer.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });
        let tool = UserPostsTool::new(&base, None, Duration::from_millis(200)).unwrap();

        let err = tokio::time::timeout(Duration::from_secs(5), tool.fetch("trader"))
            .await
            .expect("request outlived the client timeout")
            .unwrap_err();
        let http = err.downcast_ref::<reqwest::Error>().expect("reqwest error");
        assert!(http.is_timeout());
        assert!(tool.cursor("trader").await.is_none());
        server.abort();
    }

    #[tokio::test]
    async fn missing_user_id_is_an_error() {
        let tool = UserPostsTool::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(err.to_string().contains("user_id"));
    }
}
