// YouTube Data API v3: paginated search for the most-viewed videos per
// term per region, then batched statistics lookups. The API caps both
// search pages and statistics lookups at 50 ids.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use flowpulse_common::{Platform, Record};

use crate::traits::Collector;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
const PAGE_SIZE: usize = 50;
/// Pause between search pages to stay friendly with the quota.
const PAGE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: SearchItemId,
}

#[derive(Debug, Default, serde::Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId", default)]
    video_id: String,
}

#[derive(Debug, serde::Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, serde::Deserialize)]
struct VideoItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
    #[serde(rename = "contentDetails", default)]
    content_details: ContentDetails,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(rename = "publishedAt", default)]
    published_at: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
}

// Statistics counts arrive as JSON strings, not numbers.
#[derive(Debug, Default, serde::Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount", default)]
    view_count: String,
    #[serde(rename = "likeCount", default)]
    like_count: String,
    #[serde(rename = "commentCount", default)]
    comment_count: String,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

pub struct VideoCollector {
    api_key: Option<String>,
    terms: Vec<&'static str>,
    regions: Vec<&'static str>,
    limit: usize,
    client: reqwest::Client,
}

impl VideoCollector {
    pub fn new(
        api_key: Option<String>,
        terms: Vec<&'static str>,
        regions: Vec<&'static str>,
        limit: usize,
    ) -> Self {
        Self {
            api_key,
            terms,
            regions,
            limit,
            client: super::http_client(),
        }
    }

    /// Paginate through search results until `limit` video ids are gathered
    /// or the result set is exhausted.
    async fn search_ids(&self, api_key: &str, term: &str, region: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        while ids.len() < self.limit {
            let page_size = PAGE_SIZE.min(self.limit - ids.len()).to_string();
            let mut request = self.client.get(SEARCH_URL).query(&[
                ("key", api_key),
                ("q", term),
                ("part", "snippet"),
                ("type", "video"),
                ("order", "viewCount"),
                ("maxResults", page_size.as_str()),
                ("regionCode", region),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let resp = request
                .send()
                .await
                .context("Video search request failed")?
                .error_for_status()
                .context("Video search returned an error status")?;

            let data: SearchResponse = resp
                .json()
                .await
                .context("Failed to parse video search response")?;

            ids.extend(
                data.items
                    .into_iter()
                    .map(|i| i.id.video_id)
                    .filter(|id| !id.is_empty()),
            );

            page_token = data.next_page_token;
            if page_token.is_none() {
                break;
            }
            tokio::time::sleep(PAGE_DELAY).await;
        }

        Ok(ids)
    }

    /// Look up statistics for the gathered ids, 50 per call.
    async fn fetch_details(&self, api_key: &str, ids: &[String], region: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        for batch in ids.chunks(PAGE_SIZE) {
            let batch_ids = batch.join(",");
            let resp = self
                .client
                .get(VIDEOS_URL)
                .query(&[
                    ("key", api_key),
                    ("id", batch_ids.as_str()),
                    ("part", "statistics,snippet,contentDetails"),
                ])
                .send()
                .await
                .context("Video statistics request failed")?
                .error_for_status()
                .context("Video statistics returned an error status")?;

            let data: VideosResponse = resp
                .json()
                .await
                .context("Failed to parse video statistics response")?;

            records.extend(records_from_items(data.items, region));
        }

        Ok(records)
    }
}

fn records_from_items(items: Vec<VideoItem>, region: &str) -> Vec<Record> {
    items
        .into_iter()
        .filter(|item| !item.id.is_empty() && !item.snippet.title.is_empty())
        .map(|item| {
            let views = parse_count(&item.statistics.view_count);
            let likes = parse_count(&item.statistics.like_count);
            let comments = parse_count(&item.statistics.comment_count);

            let country = if region.is_empty() { "Global" } else { region };

            Record::new(
                item.snippet.title,
                Platform::Video,
                format!("https://www.youtube.com/watch?v={}", item.id),
            )
            .with_metric("views", views)
            .with_metric("likes", likes)
            .with_metric("comments", comments)
            .with_metric("like_to_view_ratio", ratio(likes, views))
            .with_metric("comment_to_view_ratio", ratio(comments, views))
            .with_country(country)
            .with_meta("author", json!(item.snippet.channel_title))
            .with_meta("published_at", json!(item.snippet.published_at))
            .with_meta("description", json!(item.snippet.description))
            .with_meta("duration", json!(item.content_details.duration))
            .with_meta("tags", json!(item.snippet.tags))
        })
        .collect()
}

fn parse_count(raw: &str) -> f64 {
    raw.parse::<u64>().unwrap_or(0) as f64
}

/// Engagement ratio rounded to 5 decimals; 0 when there are no views.
fn ratio(numerator: f64, views: f64) -> f64 {
    if views > 0.0 {
        (numerator / views * 100_000.0).round() / 100_000.0
    } else {
        0.0
    }
}

#[async_trait]
impl Collector for VideoCollector {
    fn name(&self) -> &'static str {
        "video"
    }

    async fn collect(&self) -> Result<Vec<Record>> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No video API key configured, skipping video collection");
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for region in &self.regions {
            info!(region, "Video collection for region");
            for term in &self.terms {
                let ids = match self.search_ids(api_key, term, region).await {
                    Ok(ids) => ids,
                    Err(e) => {
                        warn!(term, region, error = %e, "Video search failed, continuing");
                        continue;
                    }
                };
                if ids.is_empty() {
                    continue;
                }
                match self.fetch_details(api_key, &ids, region).await {
                    Ok(batch) => {
                        info!(term, region, count = batch.len(), "Video term complete");
                        records.extend(batch);
                    }
                    Err(e) => warn!(term, region, error = %e, "Video details failed, continuing"),
                }
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_strings_parse_into_metrics() {
        let json = r#"{
            "items": [{
                "id": "abc123",
                "snippet": {
                    "title": "Automate everything",
                    "channelTitle": "Acme",
                    "publishedAt": "2024-05-01T00:00:00Z",
                    "description": "demo",
                    "tags": ["automation"]
                },
                "statistics": {"viewCount": "2000", "likeCount": "100", "commentCount": "10"},
                "contentDetails": {"duration": "PT9M30S"}
            }]
        }"#;
        let parsed: VideosResponse = serde_json::from_str(json).unwrap();
        let records = records_from_items(parsed.items, "US");

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.link, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(r.metrics["views"], 2000.0);
        assert_eq!(r.metrics["like_to_view_ratio"], 0.05);
        assert_eq!(r.metrics["comment_to_view_ratio"], 0.005);
        assert_eq!(r.country.as_deref(), Some("US"));
        assert_eq!(r.metadata["author"], "Acme");
    }

    #[test]
    fn zero_views_produce_zero_ratios() {
        assert_eq!(ratio(10.0, 0.0), 0.0);
    }

    #[test]
    fn missing_statistics_default_to_zero() {
        let item = VideoItem {
            id: "x".to_string(),
            snippet: Snippet {
                title: "t".to_string(),
                ..Default::default()
            },
            statistics: Statistics::default(),
            content_details: ContentDetails::default(),
        };
        let records = records_from_items(vec![item], "");
        assert_eq!(records[0].metrics["views"], 0.0);
        assert_eq!(records[0].country.as_deref(), Some("Global"));
    }

    #[test]
    fn search_response_extracts_video_ids() {
        let json = r#"{
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "a1"}},
                {"id": {"kind": "youtube#channel"}}
            ],
            "nextPageToken": "CAoQAA"
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].id.video_id, "a1");
        assert!(parsed.items[1].id.video_id.is_empty());
        assert_eq!(parsed.next_page_token.as_deref(), Some("CAoQAA"));
    }
}
