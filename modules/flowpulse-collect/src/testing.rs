// Test mocks for the pipeline. One mock behind the one trait boundary:
// MockCollector returns canned records, fails, or stalls — enough to drive
// every pipeline path without a network.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use flowpulse_common::Record;

use crate::traits::Collector;

pub struct MockCollector {
    records: Vec<Record>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockCollector {
    /// Succeeds with the given records.
    pub fn returning(records: Vec<Record>) -> Self {
        Self {
            records,
            fail: false,
            delay: None,
        }
    }

    /// Always errors, like a collector whose upstream API is down.
    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
            delay: None,
        }
    }

    /// Sleeps before returning, for exercising the per-collector timeout.
    pub fn slow(delay: Duration, records: Vec<Record>) -> Self {
        Self {
            records,
            fail: false,
            delay: Some(delay),
        }
    }
}

#[async_trait]
impl Collector for MockCollector {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn collect(&self) -> Result<Vec<Record>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            bail!("MockCollector: simulated upstream failure");
        }
        Ok(self.records.clone())
    }
}
