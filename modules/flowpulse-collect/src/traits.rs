// Trait seam between the pipeline and the external platforms.
//
// Every source sits behind Collector, so the pipeline can be exercised with
// MockCollector: no network, no credentials. `cargo test` in seconds.

use anyhow::Result;
use async_trait::async_trait;

use flowpulse_common::Record;

#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in logs and run stats. Each collector stamps the
    /// platform onto the records it emits; the pipeline never needs it.
    fn name(&self) -> &'static str;

    /// Run the full search-term list against the external source.
    ///
    /// Returns whatever was collected before the first unrecoverable
    /// failure; an error here is absorbed by the pipeline as an empty
    /// contribution and never aborts the other collectors.
    async fn collect(&self) -> Result<Vec<Record>>;
}
