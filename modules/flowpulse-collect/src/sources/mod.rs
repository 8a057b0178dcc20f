//! One module per external platform. Each collector owns its HTTP client
//! and its slice of the search profile; all of them sit behind the
//! `Collector` trait so the pipeline never knows which platforms exist.

pub mod codehost;
pub mod forum;
pub mod microblog;
pub mod trends;
pub mod video;

use std::time::Duration;

/// Request timeout shared by all collector HTTP clients. Distinct from the
/// per-collector wall-clock budget the pipeline enforces.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("flowpulse/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
}
