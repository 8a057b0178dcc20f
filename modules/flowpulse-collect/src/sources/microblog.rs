// Twitter/X v2 recent search. Deprecated: the free API tier this was built
// against keeps shrinking, so the collector is off unless explicitly
// enabled alongside a bearer token.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use flowpulse_common::{Platform, Record};

use crate::traits::Collector;

const SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";
/// The recent-search endpoint caps max_results at 100.
const MAX_RESULTS: usize = 100;

#[derive(Debug, serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Post>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, serde::Deserialize)]
struct Post {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    author_id: String,
    created_at: Option<String>,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

#[derive(Debug, Default, serde::Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    reply_count: u64,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, serde::Deserialize)]
struct User {
    #[serde(default)]
    id: String,
    #[serde(default)]
    username: String,
}

pub struct MicroblogCollector {
    bearer_token: Option<String>,
    queries: Vec<&'static str>,
    limit: usize,
    client: reqwest::Client,
}

impl MicroblogCollector {
    pub fn new(bearer_token: Option<String>, queries: Vec<&'static str>, limit: usize) -> Self {
        Self {
            bearer_token,
            queries,
            limit,
            client: super::http_client(),
        }
    }

    async fn search(&self, token: &str, query: &str) -> Result<Vec<Record>> {
        info!(query, "Microblog search");

        // -is:retweet keeps original posts only
        let full_query = format!("\"{query}\" -is:retweet");
        let max_results = self.limit.min(MAX_RESULTS).to_string();
        let resp = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(token)
            .query(&[
                ("query", full_query.as_str()),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "public_metrics,created_at"),
                ("expansions", "author_id"),
                ("user.fields", "username"),
            ])
            .send()
            .await
            .context("Microblog search request failed")?
            .error_for_status()
            .context("Microblog search returned an error status")?;

        let data: SearchResponse = resp
            .json()
            .await
            .context("Failed to parse microblog search response")?;

        let records = records_from_posts(data);
        info!(query, count = records.len(), "Microblog search complete");
        Ok(records)
    }
}

fn records_from_posts(response: SearchResponse) -> Vec<Record> {
    let users: HashMap<&str, &str> = response
        .includes
        .users
        .iter()
        .map(|u| (u.id.as_str(), u.username.as_str()))
        .collect();

    response
        .data
        .iter()
        .filter(|p| !p.id.is_empty() && !p.text.is_empty())
        .map(|post| {
            let username = users.get(post.author_id.as_str()).copied().unwrap_or("anyuser");
            let mut record = Record::new(
                post.text.clone(),
                Platform::Microblog,
                format!("https://twitter.com/{username}/status/{}", post.id),
            )
            .with_metric("likes", post.public_metrics.like_count as f64)
            .with_metric("reposts", post.public_metrics.retweet_count as f64)
            .with_metric("replies", post.public_metrics.reply_count as f64)
            .with_country("N/A")
            .with_meta("author", serde_json::json!(username));
            if let Some(created_at) = &post.created_at {
                record = record.with_meta("published_at", serde_json::json!(created_at));
            }
            record
        })
        .collect()
}

#[async_trait]
impl Collector for MicroblogCollector {
    fn name(&self) -> &'static str {
        "microblog"
    }

    async fn collect(&self) -> Result<Vec<Record>> {
        let Some(token) = self.bearer_token.as_deref() else {
            warn!("No microblog bearer token configured, skipping microblog collection");
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for query in &self.queries {
            match self.search(token, query).await {
                Ok(batch) => records.extend(batch),
                Err(e) => warn!(query, error = %e, "Microblog query failed, continuing"),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_resolve_authors_and_build_links() {
        let json = r#"{
            "data": [{
                "id": "991",
                "text": "shipping a new automation",
                "author_id": "u1",
                "created_at": "2024-06-01T12:00:00Z",
                "public_metrics": {"retweet_count": 4, "like_count": 20, "reply_count": 2}
            }],
            "includes": {"users": [{"id": "u1", "username": "builder"}]}
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        let records = records_from_posts(parsed);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.link, "https://twitter.com/builder/status/991");
        assert_eq!(r.metrics["likes"], 20.0);
        assert_eq!(r.raw_signal(), 20.0);
        assert_eq!(r.metadata["author"], "builder");
    }

    #[test]
    fn unknown_author_falls_back() {
        let json = r#"{
            "data": [{
                "id": "5",
                "text": "hello",
                "author_id": "missing",
                "public_metrics": {}
            }]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        let records = records_from_posts(parsed);
        assert_eq!(records[0].link, "https://twitter.com/anyuser/status/5");
    }

    #[test]
    fn empty_response_yields_no_records() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(records_from_posts(parsed).is_empty());
    }
}
