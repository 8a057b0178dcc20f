// Google Trends has no official API. This speaks the two-step widget
// protocol the web UI uses: an `explore` call returns per-widget tokens,
// then `widgetdata/multiline` returns the interest-over-time series for a
// batch of up to five keywords. Both responses carry an anti-JSON-hijacking
// prefix that must be stripped before parsing.
//
// The endpoint throttles aggressively, so batches are spaced out with a
// randomized delay.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};
use url::Url;

use flowpulse_common::{Platform, Record};

use crate::traits::Collector;

const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";
const MULTILINE_URL: &str = "https://trends.google.com/trends/api/widgetdata/multiline";
const EXPLORE_PAGE: &str = "https://trends.google.com/trends/explore";
/// Interest sampled over the trailing quarter.
const TIMEFRAME: &str = "today 3-m";
/// The multiline widget accepts at most five keywords per request.
const BATCH_SIZE: usize = 5;
const BATCH_DELAY_SECS_MIN: u64 = 15;
const BATCH_DELAY_SECS_MAX: u64 = 25;

#[derive(Debug, serde::Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, serde::Deserialize)]
struct Widget {
    #[serde(default)]
    id: String,
    token: Option<String>,
    #[serde(default)]
    request: serde_json::Value,
}

#[derive(Debug, serde::Deserialize)]
struct MultilineResponse {
    #[serde(default)]
    default: Timeline,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Timeline {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, serde::Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    value: Vec<f64>,
}

pub struct TrendsCollector {
    keywords: Vec<&'static str>,
    regions: Vec<&'static str>,
    client: reqwest::Client,
}

impl TrendsCollector {
    pub fn new(keywords: Vec<&'static str>, regions: Vec<&'static str>) -> Self {
        Self {
            keywords,
            regions,
            client: super::http_client(),
        }
    }

    /// Fetch the averaged interest index for one batch of keywords in one
    /// region. Returns (keyword, average) pairs in batch order.
    async fn batch_interest(
        &self,
        batch: &[&'static str],
        region: &str,
    ) -> Result<Vec<(&'static str, f64)>> {
        let comparison: Vec<serde_json::Value> = batch
            .iter()
            .map(|kw| {
                serde_json::json!({
                    "keyword": kw,
                    "geo": region,
                    "time": TIMEFRAME,
                })
            })
            .collect();
        let explore_req = serde_json::json!({
            "comparisonItem": comparison,
            "category": 0,
            "property": "",
        });

        let explore_req = explore_req.to_string();
        let body = self
            .client
            .get(EXPLORE_URL)
            .query(&[
                ("hl", "en-US"),
                ("tz", "360"),
                ("req", explore_req.as_str()),
            ])
            .send()
            .await
            .context("Trends explore request failed")?
            .error_for_status()
            .context("Trends explore returned an error status")?
            .text()
            .await
            .context("Failed to read trends explore body")?;

        let explore: ExploreResponse = serde_json::from_str(strip_guard_prefix(&body))
            .context("Failed to parse trends explore response")?;

        let widget = explore
            .widgets
            .into_iter()
            .find(|w| w.id == "TIMESERIES" && w.token.is_some())
            .context("Trends explore response had no timeseries widget")?;
        let token = widget.token.unwrap_or_default();

        let widget_req = widget.request.to_string();
        let body = self
            .client
            .get(MULTILINE_URL)
            .query(&[
                ("hl", "en-US"),
                ("tz", "360"),
                ("req", widget_req.as_str()),
                ("token", token.as_str()),
            ])
            .send()
            .await
            .context("Trends multiline request failed")?
            .error_for_status()
            .context("Trends multiline returned an error status")?
            .text()
            .await
            .context("Failed to read trends multiline body")?;

        let multiline: MultilineResponse = serde_json::from_str(strip_guard_prefix(&body))
            .context("Failed to parse trends multiline response")?;

        Ok(average_interest(batch, &multiline.default.timeline_data))
    }
}

/// Both trends endpoints prepend `)]}'` junk before the JSON payload.
fn strip_guard_prefix(body: &str) -> &str {
    match body.find('{') {
        Some(start) => &body[start..],
        None => body,
    }
}

/// Mean interest per keyword across the series, rounded to 2 decimals.
/// The value array of each point indexes keywords in batch order.
fn average_interest(
    batch: &[&'static str],
    points: &[TimelinePoint],
) -> Vec<(&'static str, f64)> {
    batch
        .iter()
        .enumerate()
        .map(|(i, kw)| {
            let values: Vec<f64> = points
                .iter()
                .filter_map(|p| p.value.get(i).copied())
                .collect();
            let avg = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            (*kw, (avg * 100.0).round() / 100.0)
        })
        .collect()
}

fn explore_link(keyword: &str, region: &str) -> String {
    Url::parse_with_params(EXPLORE_PAGE, &[("q", keyword), ("geo", region)])
        .map(String::from)
        .unwrap_or_else(|_| EXPLORE_PAGE.to_string())
}

#[async_trait]
impl Collector for TrendsCollector {
    fn name(&self) -> &'static str {
        "trends"
    }

    async fn collect(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        for region in &self.regions {
            info!(region, "Trends collection for region");

            for batch in self.keywords.chunks(BATCH_SIZE) {
                match self.batch_interest(batch, region).await {
                    Ok(averages) => {
                        for (keyword, avg) in averages {
                            records.push(
                                Record::new(
                                    keyword,
                                    Platform::SearchTrend,
                                    explore_link(keyword, region),
                                )
                                .with_metric("average_search_interest", avg)
                                .with_country(*region),
                            );
                        }
                    }
                    Err(e) => {
                        warn!(region, error = %e, "Trends batch failed, continuing")
                    }
                }

                let delay = rand::rng().random_range(BATCH_DELAY_SECS_MIN..=BATCH_DELAY_SECS_MAX);
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_prefix_is_stripped() {
        let body = ")]}'\n{\"widgets\": []}";
        assert_eq!(strip_guard_prefix(body), "{\"widgets\": []}");

        let clean = "{\"widgets\": []}";
        assert_eq!(strip_guard_prefix(clean), clean);
    }

    #[test]
    fn explore_response_parses_after_stripping() {
        let body = ")]}'\n{\"widgets\": [\
            {\"id\": \"TIMESERIES\", \"token\": \"abc\", \"request\": {\"geo\": \"US\"}},\
            {\"id\": \"RELATED_TOPICS\", \"token\": \"def\", \"request\": {}}\
        ]}";
        let parsed: ExploreResponse =
            serde_json::from_str(strip_guard_prefix(body)).unwrap();
        assert_eq!(parsed.widgets.len(), 2);
        assert_eq!(parsed.widgets[0].id, "TIMESERIES");
        assert_eq!(parsed.widgets[0].token.as_deref(), Some("abc"));
    }

    #[test]
    fn interest_averages_per_keyword_position() {
        let points = vec![
            TimelinePoint { value: vec![10.0, 0.0] },
            TimelinePoint { value: vec![20.0, 1.0] },
            TimelinePoint { value: vec![30.0, 2.0] },
        ];
        let averages = average_interest(&["alpha", "beta"], &points);
        assert_eq!(averages[0], ("alpha", 20.0));
        assert_eq!(averages[1], ("beta", 1.0));
    }

    #[test]
    fn empty_series_averages_to_zero() {
        let averages = average_interest(&["alpha"], &[]);
        assert_eq!(averages[0], ("alpha", 0.0));
    }

    #[test]
    fn averages_round_to_two_decimals() {
        let points = vec![
            TimelinePoint { value: vec![1.0] },
            TimelinePoint { value: vec![2.0] },
            TimelinePoint { value: vec![2.0] },
        ];
        let averages = average_interest(&["kw"], &points);
        assert_eq!(averages[0].1, 1.67);
    }
}
