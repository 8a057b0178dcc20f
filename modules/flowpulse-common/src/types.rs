use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// --- Platforms ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Forum,
    Video,
    CodeHost,
    SearchTrend,
    Microblog,
}

impl Platform {
    /// The metric key used as this platform's popularity signal when scoring.
    ///
    /// Total by construction: adding a platform variant forces a choice here,
    /// so a record can never fall through to a silently-defaulted metric.
    pub fn signal_metric(self) -> &'static str {
        match self {
            Platform::Forum => "views",
            Platform::Video => "views",
            Platform::CodeHost => "stars",
            Platform::SearchTrend => "average_search_interest",
            Platform::Microblog => "likes",
        }
    }

    pub const ALL: [Platform; 5] = [
        Platform::Forum,
        Platform::Video,
        Platform::CodeHost,
        Platform::SearchTrend,
        Platform::Microblog,
    ];
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Forum => write!(f, "forum"),
            Platform::Video => write!(f, "video"),
            Platform::CodeHost => write!(f, "code_host"),
            Platform::SearchTrend => write!(f, "search_trend"),
            Platform::Microblog => write!(f, "microblog"),
        }
    }
}

// --- Records ---

/// One observed popularity data point from a single platform.
///
/// Collectors create these, the aggregator fills defaults, the normalizer
/// writes `score`, and the ranker orders them. The persisted snapshot is a
/// JSON array of scored records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub platform: Platform,
    /// Canonical URL. Natural identifier, uniqueness not enforced.
    pub link: String,
    /// Metric name → non-negative value. Key set depends on the platform.
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    /// Region code, "Global", or "N/A". None until the aggregator defaults it.
    #[serde(default)]
    pub country: Option<String>,
    /// Auxiliary fields (author, publish timestamp, tags).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Batch-relative, platform-local ranking value in [0, 100].
    /// Absent until the normalizer runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Record {
    pub fn new(title: impl Into<String>, platform: Platform, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            platform,
            link: link.into(),
            metrics: BTreeMap::new(),
            country: None,
            metadata: serde_json::Map::new(),
            score: None,
        }
    }

    pub fn with_metric(mut self, key: &str, value: f64) -> Self {
        self.metrics.insert(key.to_string(), value);
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_meta(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// The raw value of this platform's popularity signal.
    /// Missing, non-finite, and negative values all read as 0.
    pub fn raw_signal(&self) -> f64 {
        let raw = self
            .metrics
            .get(self.platform.signal_metric())
            .copied()
            .unwrap_or(0.0);
        if raw.is_finite() && raw > 0.0 {
            raw
        } else {
            0.0
        }
    }

    /// Score for ordering. 0 until the normalizer has run.
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}
