//! The aggregation pipeline. Data flows one direction:
//! collectors → aggregate → score → rank → snapshot.

pub mod aggregate;
pub mod rank;
pub mod score;
pub mod stats;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use flowpulse_common::Config;

use crate::profile::SearchProfile;
use crate::snapshot::SnapshotStore;
use crate::sources::{
    codehost::CodeHostCollector, forum::ForumCollector, microblog::MicroblogCollector,
    trends::TrendsCollector, video::VideoCollector,
};
use crate::traits::Collector;

pub use stats::RunStats;

pub struct Pipeline {
    collectors: Vec<Arc<dyn Collector>>,
    store: SnapshotStore,
    collector_timeout: Duration,
    dedupe_by_link: bool,
}

impl Pipeline {
    pub fn new(
        collectors: Vec<Arc<dyn Collector>>,
        store: SnapshotStore,
        collector_timeout: Duration,
        dedupe_by_link: bool,
    ) -> Self {
        Self {
            collectors,
            store,
            collector_timeout,
            dedupe_by_link,
        }
    }

    /// Wire up the production collectors from config and profile.
    pub fn from_config(config: &Config, profile: SearchProfile) -> Self {
        let mut collectors: Vec<Arc<dyn Collector>> = vec![
            Arc::new(ForumCollector::new(
                &config.forum_base_url,
                profile.forum_terms,
                profile.forum_limit,
            )),
            Arc::new(VideoCollector::new(
                config.video_api_key.clone(),
                profile.video_terms,
                profile.video_regions,
                profile.video_limit,
            )),
            Arc::new(CodeHostCollector::new(
                config.codehost_token.clone(),
                profile.codehost_queries,
                profile.codehost_limit,
            )),
            Arc::new(TrendsCollector::new(
                profile.trend_keywords,
                profile.trend_regions,
            )),
        ];
        if config.microblog_enabled {
            collectors.push(Arc::new(MicroblogCollector::new(
                config.microblog_bearer_token.clone(),
                profile.microblog_queries,
                profile.microblog_limit,
            )));
        }

        Self::new(
            collectors,
            SnapshotStore::new(&config.snapshot_path),
            Duration::from_secs(config.collector_timeout_secs),
            config.dedupe_by_link,
        )
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// One full run: collect everything, score, rank, persist.
    ///
    /// Collectors run concurrently, each under its own wall-clock budget.
    /// A collector that fails or times out contributes an empty batch; only
    /// persistence failures abort the run.
    pub async fn run(&self) -> Result<RunStats> {
        let started = Instant::now();
        info!(collectors = self.collectors.len(), "Pipeline run starting");

        let tasks = self.collectors.iter().map(|collector| {
            let collector = Arc::clone(collector);
            let timeout = self.collector_timeout;
            async move {
                let name = collector.name();
                match tokio::time::timeout(timeout, collector.collect()).await {
                    Ok(Ok(records)) => {
                        info!(collector = name, count = records.len(), "Collector finished");
                        Outcome::Collected(name, records)
                    }
                    Ok(Err(e)) => {
                        warn!(collector = name, error = %e, "Collector failed, contributing empty result");
                        Outcome::Failed(name)
                    }
                    Err(_) => {
                        warn!(
                            collector = name,
                            timeout_secs = timeout.as_secs(),
                            "Collector timed out, contributing empty result"
                        );
                        Outcome::TimedOut(name)
                    }
                }
            }
        });
        let outcomes = futures::future::join_all(tasks).await;

        let mut stats = RunStats::default();
        let mut batches = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Outcome::Collected(name, records) => {
                    stats.per_collector.push((name, records.len()));
                    batches.push(records);
                }
                Outcome::Failed(name) => {
                    stats.per_collector.push((name, 0));
                    stats.collectors_failed += 1;
                    batches.push(Vec::new());
                }
                Outcome::TimedOut(name) => {
                    stats.per_collector.push((name, 0));
                    stats.collectors_timed_out += 1;
                    batches.push(Vec::new());
                }
            }
        }

        let mut records = aggregate::aggregate(batches, self.dedupe_by_link);
        score::normalize_scores(&mut records);
        rank::rank(&mut records);

        self.store.write(&records).await?;

        stats.records_total = records.len();
        stats.elapsed = started.elapsed();
        info!("{stats}");
        Ok(stats)
    }
}

enum Outcome {
    Collected(&'static str, Vec<flowpulse_common::Record>),
    Failed(&'static str),
    TimedOut(&'static str),
}
