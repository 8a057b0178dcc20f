// GitHub repository search, sorted by stars. Works unauthenticated at a
// lower rate limit when no token is configured.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{info, warn};

use flowpulse_common::{Platform, Record};

use crate::traits::Collector;

const SEARCH_URL: &str = "https://api.github.com/search/repositories";
/// The search API serves at most 100 results per page.
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repo>,
}

#[derive(Debug, serde::Deserialize)]
struct Repo {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
}

pub struct CodeHostCollector {
    token: Option<String>,
    queries: Vec<&'static str>,
    limit: usize,
    client: reqwest::Client,
}

impl CodeHostCollector {
    pub fn new(token: Option<String>, queries: Vec<&'static str>, limit: usize) -> Self {
        Self {
            token,
            queries,
            limit,
            client: super::http_client(),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<Record>> {
        info!(query, "Code host search");

        let per_page = self.limit.min(MAX_PER_PAGE).to_string();
        let mut request = self
            .client
            .get(SEARCH_URL)
            .header("Accept", "application/vnd.github.v3+json")
            .query(&[
                ("q", query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let resp = request
            .send()
            .await
            .context("Code host search request failed")?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                anyhow::bail!("code host rejected the configured token (401)")
            }
            StatusCode::FORBIDDEN => {
                anyhow::bail!("code host rate limit hit (403)")
            }
            status if !status.is_success() => {
                anyhow::bail!("code host search returned {status}")
            }
            _ => {}
        }

        let data: SearchResponse = resp
            .json()
            .await
            .context("Failed to parse code host search response")?;

        let records = records_from_repos(data.items);
        info!(query, count = records.len(), "Code host search complete");
        Ok(records)
    }
}

fn records_from_repos(repos: Vec<Repo>) -> Vec<Record> {
    repos
        .into_iter()
        .filter(|r| !r.full_name.is_empty() && !r.html_url.is_empty())
        .map(|r| {
            Record::new(r.full_name, Platform::CodeHost, r.html_url)
                .with_metric("stars", r.stargazers_count as f64)
                .with_metric("forks", r.forks_count as f64)
                .with_metric("watchers", r.watchers_count as f64)
                .with_country("N/A")
        })
        .collect()
}

#[async_trait]
impl Collector for CodeHostCollector {
    fn name(&self) -> &'static str {
        "codehost"
    }

    async fn collect(&self) -> Result<Vec<Record>> {
        if self.token.is_none() {
            warn!("No code host token configured, searching unauthenticated");
        }

        let mut records = Vec::new();
        for query in &self.queries {
            match self.search(query).await {
                Ok(batch) => records.extend(batch),
                Err(e) => warn!(query, error = %e, "Code host query failed, continuing"),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repos_become_records_with_star_metrics() {
        let json = r#"{
            "total_count": 2,
            "items": [
                {"full_name": "acme/flows", "html_url": "https://github.com/acme/flows",
                 "stargazers_count": 1200, "forks_count": 80, "watchers_count": 1200},
                {"full_name": "acme/nodes", "html_url": "https://github.com/acme/nodes",
                 "stargazers_count": 300, "forks_count": 12, "watchers_count": 300}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        let records = records_from_repos(parsed.items);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].platform, Platform::CodeHost);
        assert_eq!(records[0].metrics["stars"], 1200.0);
        assert_eq!(records[0].raw_signal(), 1200.0);
    }

    #[test]
    fn repos_missing_identity_are_skipped() {
        let repos = vec![Repo {
            full_name: String::new(),
            html_url: "https://github.com/x".to_string(),
            stargazers_count: 1,
            forks_count: 0,
            watchers_count: 1,
        }];
        assert!(records_from_repos(repos).is_empty());
    }
}
