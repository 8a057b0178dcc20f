use std::time::Duration;

/// Stats from one pipeline run.
#[derive(Debug, Default)]
pub struct RunStats {
    /// (collector name, records contributed), in collector order.
    pub per_collector: Vec<(&'static str, usize)>,
    pub collectors_failed: u32,
    pub collectors_timed_out: u32,
    pub records_total: usize,
    pub elapsed: Duration,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Pipeline Run Complete ===")?;
        for (name, count) in &self.per_collector {
            writeln!(f, "  {name:<12} {count}")?;
        }
        writeln!(f, "Collectors failed:    {}", self.collectors_failed)?;
        writeln!(f, "Collectors timed out: {}", self.collectors_timed_out)?;
        writeln!(f, "Records persisted:    {}", self.records_total)?;
        writeln!(f, "Elapsed:              {:.1}s", self.elapsed.as_secs_f64())?;
        Ok(())
    }
}
