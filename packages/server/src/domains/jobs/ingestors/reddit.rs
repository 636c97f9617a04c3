use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domains::jobs::upsert::{JobSourceInput, JobUpsertInput};
use crate::domains::notifications::NotificationPayload;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const POSTS_PER_SUBREDDIT: usize = 10;

/// Fetches new posts from the public Reddit JSON listings, no
/// authentication required.
pub struct RedditFeed {
    client: Client,
}

/// One post from a subreddit's /new listing, already flattened from the
/// listing envelope. `url` is the listing's own url field: the post
/// page for self posts, the external target for link posts. It is the
/// dedup key, so two link posts sharing a target collapse to one job.
#[derive(Debug, Clone, Serialize)]
pub struct RedditPost {
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub body: Option<String>,
    pub body_html: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: ListingPost,
}

#[derive(Debug, Deserialize)]
struct ListingPost {
    title: String,
    author: String,
    subreddit: String,
    url: String,
    created_utc: f64,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    selftext_html: Option<String>,
    #[serde(default)]
    ups: i64,
    #[serde(default)]
    downs: i64,
}

impl Default for RedditFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl RedditFeed {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Fetch the newest posts across all given subreddits. A subreddit
    /// that fails is logged and skipped; the others still contribute.
    pub async fn fetch_posts(&self, subreddits: &[String]) -> Vec<RedditPost> {
        let mut posts = Vec::new();
        for subreddit in subreddits {
            match self.fetch_subreddit(subreddit).await {
                Ok(mut fetched) => {
                    info!("Fetched {} posts from r/{}", fetched.len(), subreddit);
                    posts.append(&mut fetched);
                }
                Err(e) => {
                    error!("Failed to fetch r/{}: {:?}", subreddit, e);
                }
            }
        }
        posts
    }

    async fn fetch_subreddit(&self, subreddit: &str) -> Result<Vec<RedditPost>> {
        let url = format!(
            "https://www.reddit.com/r/{}/new.json?limit={}",
            subreddit, POSTS_PER_SUBREDDIT
        );
        let listing: Listing = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| post_from_listing(child.data))
            .collect())
    }
}

fn post_from_listing(post: ListingPost) -> RedditPost {
    let posted_at = DateTime::from_timestamp(post.created_utc as i64, 0);
    RedditPost {
        title: post.title,
        author: post.author,
        subreddit: post.subreddit,
        url: post.url,
        posted_at,
        body: post.selftext.filter(|s| !s.is_empty()),
        body_html: post.selftext_html.filter(|s| !s.is_empty()),
        upvotes: post.ups,
        downvotes: post.downs,
    }
}

/// Map a Reddit post onto the canonical job shape. The listing url is
/// both the dedup URL and the external id, and the subreddit doubles
/// as a tag.
pub fn post_to_upsert_input(post: &RedditPost) -> JobUpsertInput {
    let mut metadata = std::collections::BTreeMap::new();
    metadata.insert("subreddit".to_string(), post.subreddit.clone());
    if let Some(body_html) = &post.body_html {
        metadata.insert("bodyHtml".to_string(), body_html.clone());
    }
    metadata.insert("upvotes".to_string(), post.upvotes.to_string());
    metadata.insert("downvotes".to_string(), post.downvotes.to_string());

    JobUpsertInput {
        title: post.title.clone(),
        company: None,
        author: Some(post.author.clone()),
        location: None,
        url: post.url.clone(),
        posted_at: post.posted_at,
        description: post.body.clone(),
        is_remote: None,
        tags: vec![post.subreddit.clone()],
        metadata,
        source: JobSourceInput {
            name: "reddit".to_string(),
            external_id: Some(post.url.clone()),
            raw_url: Some(post.url.clone()),
            data: serde_json::to_value(post).ok(),
        },
    }
}

pub fn notification_payload(post: &RedditPost) -> NotificationPayload {
    NotificationPayload::new(
        format!("{} ({})", post.title, post.subreddit),
        format!("Posted by /u/{}", post.author),
        post.url.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {
                    "kind": "t3",
                    "data": {
                        "title": "[Hiring] Rust backend engineer",
                        "author": "hiring_manager",
                        "subreddit": "forhire",
                        "url": "https://www.reddit.com/r/forhire/comments/abc123/hiring_rust/",
                        "permalink": "/r/forhire/comments/abc123/hiring_rust/",
                        "created_utc": 1700000000.0,
                        "selftext": "We need help with a backend.",
                        "selftext_html": "<p>We need help with a backend.</p>",
                        "ups": 12,
                        "downs": 1
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "title": "Link post to an external ad",
                        "author": "someone",
                        "subreddit": "forhire",
                        "url": "https://jobs.example.com/rust-engineer",
                        "permalink": "/r/forhire/comments/def456/link_only/",
                        "created_utc": 1700000100.0,
                        "selftext": "",
                        "ups": 0,
                        "downs": 0
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn parses_listing_into_posts() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let posts: Vec<RedditPost> = listing
            .data
            .children
            .into_iter()
            .map(|c| post_from_listing(c.data))
            .collect();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "[Hiring] Rust backend engineer");
        assert_eq!(
            posts[0].url,
            "https://www.reddit.com/r/forhire/comments/abc123/hiring_rust/"
        );
        assert_eq!(posts[0].upvotes, 12);
        assert!(posts[0].posted_at.is_some());

        // Empty selftext becomes no body, not an empty string.
        assert_eq!(posts[1].body, None);
        assert_eq!(posts[1].body_html, None);
    }

    #[test]
    fn link_posts_keep_the_target_url_not_the_permalink() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let post = post_from_listing(listing.data.children.into_iter().nth(1).unwrap().data);

        // The listing's url field is the dedup key. For a link post that
        // is the external target, so two posts sharing a target collapse
        // to one job and stored rows keep matching across passes.
        assert_eq!(post.url, "https://jobs.example.com/rust-engineer");

        let input = post_to_upsert_input(&post);
        assert_eq!(input.url, "https://jobs.example.com/rust-engineer");
        assert_eq!(
            input.source.external_id.as_deref(),
            Some("https://jobs.example.com/rust-engineer")
        );
    }

    #[test]
    fn maps_post_to_upsert_input() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let post = post_from_listing(listing.data.children.into_iter().next().unwrap().data);
        let input = post_to_upsert_input(&post);

        assert_eq!(input.url, post.url);
        assert_eq!(input.author.as_deref(), Some("hiring_manager"));
        assert_eq!(input.company, None);
        assert_eq!(input.tags, vec!["forhire".to_string()]);
        assert_eq!(input.metadata.get("subreddit").map(String::as_str), Some("forhire"));
        assert_eq!(input.metadata.get("upvotes").map(String::as_str), Some("12"));
        assert_eq!(input.source.name, "reddit");
        assert_eq!(input.source.external_id.as_deref(), Some(post.url.as_str()));
        assert!(input.source.data.is_some());
    }

    #[test]
    fn notification_names_the_subreddit_and_author() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let post = post_from_listing(listing.data.children.into_iter().next().unwrap().data);
        let payload = notification_payload(&post);

        assert_eq!(payload.title, "[Hiring] Rust backend engineer (forhire)");
        assert_eq!(payload.body, "Posted by /u/hiring_manager");
        assert_eq!(payload.url, post.url);
    }
}
