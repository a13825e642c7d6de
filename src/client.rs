use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use crate::error::{GlassFeedError, Result};
use crate::models::{Comment, FeedOption, Listing, Post, RawComment, RawPost, Thing};
use crate::util;

/// Attempts per request, including the first.
const RETRY_ATTEMPTS: u32 = 3;
/// Linear backoff base: attempt `n` is followed by a sleep of `n * base`.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Per-attempt request deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest upstream body snippet carried in an error.
const ERROR_BODY_SNIPPET_CHARS: usize = 400;

// ---------------------------------------------------------------------------
// Content source seam
// ---------------------------------------------------------------------------

/// What the view controller needs from a content backend.
pub trait ContentSource {
    /// Top posts for a feed, sentinel help entry first, at most `limit + 1`
    /// entries.
    fn top_posts(&self, feed: &FeedOption, limit: usize) -> Result<Vec<Post>>;

    /// Flattened comment thread for a permalink, at most `limit` entries.
    /// An empty permalink yields an empty list without a request.
    fn comments(&self, permalink: &str, limit: usize) -> Result<Vec<Comment>>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Fetches listing and comment JSON through a request-forwarding proxy
/// endpoint, passing the upstream path as a query parameter.
///
/// ```no_run
/// use glassfeed_client::{ContentSource, RedditClient, FEED_OPTIONS};
///
/// let client = RedditClient::new("http://127.0.0.1:5173/__reddit_proxy").unwrap();
/// let posts = client.top_posts(&FEED_OPTIONS[0], 20).unwrap();
/// println!("{} posts (first is the help entry)", posts.len());
/// ```
pub struct RedditClient {
    http: Client,
    proxy_url: String,
    retry_base_delay: Duration,
}

impl RedditClient {
    /// Create a client talking to the given proxy endpoint.
    pub fn new(proxy_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    /// Override the backoff base delay. The schedule stays linear.
    pub fn with_retry_delay(mut self, base: Duration) -> Self {
        self.retry_base_delay = base;
        self
    }

    /// GET an upstream path through the proxy, retrying transport failures
    /// and 5xx/429 responses; any other error status fails immediately.
    fn fetch_json(&self, path: &str) -> Result<serde_json::Value> {
        let mut attempt = 1u32;
        loop {
            let sent = self
                .http
                .get(&self.proxy_url)
                .query(&[("path", path)])
                .send();

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    if attempt >= RETRY_ATTEMPTS {
                        return Err(e.into());
                    }
                    thread::sleep(self.retry_base_delay * attempt);
                    attempt += 1;
                    continue;
                }
            };

            let status = response.status().as_u16();
            if (200..300).contains(&status) {
                return Ok(response.json()?);
            }

            let retryable = status >= 500 || status == 429;
            if retryable && attempt < RETRY_ATTEMPTS {
                thread::sleep(self.retry_base_delay * attempt);
                attempt += 1;
                continue;
            }

            let body = response.text().unwrap_or_default();
            return Err(GlassFeedError::Http {
                status,
                body: util::truncate_chars(&body, ERROR_BODY_SNIPPET_CHARS).to_string(),
            });
        }
    }
}

impl ContentSource for RedditClient {
    fn top_posts(&self, feed: &FeedOption, limit: usize) -> Result<Vec<Post>> {
        let base = if feed.path.is_empty() {
            "/top.json".to_string()
        } else {
            format!("/{}/top.json", feed.path)
        };
        let json = self.fetch_json(&format!("{base}?limit={limit}&t=day&raw_json=1"))?;
        let listing: Listing = serde_json::from_value(json).map_err(decode_error)?;
        Ok(build_posts(listing, limit, util::now_seconds()))
    }

    fn comments(&self, permalink: &str, limit: usize) -> Result<Vec<Comment>> {
        if permalink.is_empty() {
            return Ok(Vec::new());
        }
        let json = self.fetch_json(&format!("{permalink}.json?limit={limit}&raw_json=1"))?;
        // The response is a pair of listings: post body first, then the
        // comment tree.
        let listings: Vec<Listing> = serde_json::from_value(json).map_err(decode_error)?;
        let children = listings
            .into_iter()
            .nth(1)
            .map(|listing| listing.data.children)
            .unwrap_or_default();
        Ok(flatten_comments(children, limit))
    }
}

fn decode_error(e: serde_json::Error) -> GlassFeedError {
    GlassFeedError::Decode {
        message: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Listing parsing
// ---------------------------------------------------------------------------

/// The synthetic first entry carrying usage instructions.
pub fn help_post(now_seconds: u64) -> Post {
    Post {
        id: "help".to_string(),
        title: "Controls: swipe to browse, tap to open comments, double tap to go back."
            .to_string(),
        ups: 0,
        permalink: String::new(),
        subreddit: "glassfeed".to_string(),
        author: "system".to_string(),
        created_utc_seconds: now_seconds,
        num_comments: 0,
    }
}

/// Convert a posts listing, help entry first, truncated to `limit + 1`.
/// Nodes without an id or title are dropped.
pub(crate) fn build_posts(listing: Listing, limit: usize, now_seconds: u64) -> Vec<Post> {
    let mut posts = vec![help_post(now_seconds)];

    for child in listing.data.children {
        let raw: RawPost = match serde_json::from_value(child.data) {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        let (Some(id), Some(title)) = (raw.id, raw.title) else {
            continue;
        };
        if id.is_empty() || title.is_empty() {
            continue;
        }

        posts.push(Post {
            id,
            title,
            ups: raw.ups,
            permalink: raw.permalink,
            subreddit: raw.subreddit_name_prefixed,
            author: raw.author,
            created_utc_seconds: raw.created_utc as u64,
            num_comments: raw.num_comments,
        });
    }

    posts.truncate(limit.saturating_add(1));
    posts
}

/// Depth-first flatten of a comment tree, capped at `limit` entries. Nodes
/// that are not comments (`t1`) or lack a body are skipped; recursion stops
/// as soon as the cap is reached.
pub(crate) fn flatten_comments(children: Vec<Thing>, limit: usize) -> Vec<Comment> {
    let mut out = Vec::new();
    for child in children {
        extract_comment(child, limit, &mut out);
    }
    out
}

fn extract_comment(child: Thing, limit: usize, out: &mut Vec<Comment>) {
    if out.len() >= limit {
        return;
    }
    if child.kind != "t1" {
        return;
    }

    let raw: RawComment = match serde_json::from_value(child.data) {
        Ok(raw) => raw,
        Err(_) => return,
    };
    let Some(body) = raw.body.filter(|body| !body.is_empty()) else {
        return;
    };

    out.push(Comment {
        body,
        author: raw.author,
        created_utc_seconds: raw.created_utc as u64,
        ups: raw.ups,
        depth: raw.depth,
    });

    // Replies hold a nested listing on branches and `""` on leaves.
    if let Ok(replies) = serde_json::from_value::<Listing>(raw.replies) {
        for reply in replies.data.children {
            extract_comment(reply, limit, out);
        }
    }
}
