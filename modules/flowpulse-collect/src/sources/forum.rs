// Discourse forum search. Sorting by views surfaces the topics the
// community actually reads, which is the popularity signal we score on.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use flowpulse_common::{Platform, Record};

use crate::traits::Collector;

#[derive(Debug, serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    topics: Vec<Topic>,
}

#[derive(Debug, serde::Deserialize)]
struct Topic {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    views: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    like_count: u64,
}

pub struct ForumCollector {
    base_url: String,
    terms: Vec<&'static str>,
    limit: usize,
    client: reqwest::Client,
}

impl ForumCollector {
    pub fn new(base_url: &str, terms: Vec<&'static str>, limit: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            terms,
            limit,
            client: super::http_client(),
        }
    }

    async fn search(&self, term: &str) -> Result<Vec<Record>> {
        info!(term, "Forum search");

        let resp = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[("q", term), ("order", "views")])
            .send()
            .await
            .context("Forum search request failed")?
            .error_for_status()
            .context("Forum search returned an error status")?;

        let data: SearchResponse = resp
            .json()
            .await
            .context("Failed to parse forum search response")?;

        let records = records_from_topics(&self.base_url, data.topics, self.limit);
        info!(term, count = records.len(), "Forum search complete");
        Ok(records)
    }
}

/// Reshape search topics into records, skipping malformed entries.
fn records_from_topics(base_url: &str, topics: Vec<Topic>, limit: usize) -> Vec<Record> {
    topics
        .into_iter()
        .filter(|t| !t.title.is_empty() && !t.slug.is_empty())
        .take(limit)
        .map(|t| {
            let link = format!("{base_url}/t/{}/{}", t.slug, t.id);
            Record::new(t.title, Platform::Forum, link)
                .with_metric("views", t.views as f64)
                .with_metric("replies", t.reply_count as f64)
                .with_metric("likes", t.like_count as f64)
                .with_country("N/A")
        })
        .collect()
}

#[async_trait]
impl Collector for ForumCollector {
    fn name(&self) -> &'static str {
        "forum"
    }

    async fn collect(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for term in &self.terms {
            match self.search(term).await {
                Ok(batch) => records.extend(batch),
                Err(e) => warn!(term, error = %e, "Forum term failed, continuing"),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: u64, title: &str, slug: &str, views: u64) -> Topic {
        Topic {
            id,
            title: title.to_string(),
            slug: slug.to_string(),
            views,
            reply_count: 3,
            like_count: 1,
        }
    }

    #[test]
    fn topics_become_records_with_built_links() {
        let topics = vec![topic(42, "Sync Sheets to Slack", "sync-sheets-to-slack", 900)];
        let records = records_from_topics("https://forum.example.com", topics, 10);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].platform, Platform::Forum);
        assert_eq!(
            records[0].link,
            "https://forum.example.com/t/sync-sheets-to-slack/42"
        );
        assert_eq!(records[0].metrics["views"], 900.0);
        assert_eq!(records[0].country.as_deref(), Some("N/A"));
    }

    #[test]
    fn malformed_topics_are_skipped() {
        let topics = vec![
            topic(1, "", "no-title", 10),
            Topic {
                id: 2,
                title: "No slug".to_string(),
                slug: String::new(),
                views: 10,
                reply_count: 0,
                like_count: 0,
            },
            topic(3, "Valid", "valid", 10),
        ];
        let records = records_from_topics("https://forum.example.com", topics, 10);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Valid");
    }

    #[test]
    fn limit_caps_results() {
        let topics: Vec<Topic> = (0..20u64).map(|i| topic(i, "T", "t", i)).collect();
        let records = records_from_topics("https://forum.example.com", topics, 5);
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn search_response_parses_discourse_shape() {
        let json = r#"{
            "topics": [
                {"id": 7, "title": "Webhook retries", "slug": "webhook-retries",
                 "views": 1520, "reply_count": 12, "like_count": 30}
            ],
            "grouped_search_result": {"term": "webhook"}
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.topics.len(), 1);
        assert_eq!(parsed.topics[0].views, 1520);
    }
}
