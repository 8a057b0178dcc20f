use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Application configuration loaded from environment variables.
///
/// Constructed once at startup and passed to each collector explicitly —
/// collectors never read the process environment themselves.
#[derive(Debug, Clone)]
pub struct Config {
    // Collector credentials. All optional: a missing credential degrades the
    // collector (unauthenticated or empty result), it never fails the process.
    pub video_api_key: Option<String>,
    pub codehost_token: Option<String>,
    pub microblog_bearer_token: Option<String>,

    /// Base URL of the Discourse forum to search.
    pub forum_base_url: String,

    /// Whether the deprecated microblog collector participates in runs.
    pub microblog_enabled: bool,

    /// Where the ranked snapshot is persisted.
    pub snapshot_path: PathBuf,

    /// Wall-clock budget per collector. A collector that exceeds it
    /// contributes an empty result to the run.
    pub collector_timeout_secs: u64,

    /// Drop records sharing a link with an earlier record (first wins).
    pub dedupe_by_link: bool,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            video_api_key: optional_env("VIDEO_API_KEY"),
            codehost_token: optional_env("CODEHOST_TOKEN"),
            microblog_bearer_token: optional_env("MICROBLOG_BEARER_TOKEN"),
            forum_base_url: env::var("FORUM_BASE_URL")
                .unwrap_or_else(|_| "https://community.n8n.io".to_string()),
            microblog_enabled: env::var("MICROBLOG_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/snapshot.json")),
            collector_timeout_secs: env::var("COLLECTOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("COLLECTOR_TIMEOUT_SECS must be a number"),
            dedupe_by_link: env::var("DEDUPE_BY_LINK")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
        }
    }

    /// Log which credentials are present without printing their values,
    /// and warn about the degradation each absent one implies.
    pub fn log_redacted(&self) {
        if self.video_api_key.is_none() {
            warn!("VIDEO_API_KEY not set — video collector will return no records");
        }
        if self.codehost_token.is_none() {
            warn!("CODEHOST_TOKEN not set — code host searches run unauthenticated (lower rate limit)");
        }
        if self.microblog_enabled && self.microblog_bearer_token.is_none() {
            warn!("MICROBLOG_ENABLED is set but MICROBLOG_BEARER_TOKEN is missing — microblog collector will return no records");
        }
        tracing::info!(
            video_key = self.video_api_key.is_some(),
            codehost_token = self.codehost_token.is_some(),
            microblog = self.microblog_enabled,
            snapshot = %self.snapshot_path.display(),
            dedupe_by_link = self.dedupe_by_link,
            "Configuration loaded"
        );
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
