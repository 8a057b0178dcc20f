use std::collections::HashSet;

use tracing::debug;

use flowpulse_common::Record;

/// Concatenate collector batches into one sequence, preserving collector
/// order and arrival order within each batch.
///
/// Records missing a title or link are malformed upstream output and are
/// dropped here. Absent `country` defaults to "Global". When
/// `dedupe_by_link` is on, the first record wins for each link.
pub fn aggregate(batches: Vec<Vec<Record>>, dedupe_by_link: bool) -> Vec<Record> {
    let mut records = Vec::new();
    let mut seen_links: HashSet<String> = HashSet::new();

    for batch in batches {
        for mut record in batch {
            if record.title.is_empty() || record.link.is_empty() {
                debug!(platform = %record.platform, "Dropping malformed record");
                continue;
            }
            if dedupe_by_link && !seen_links.insert(record.link.clone()) {
                debug!(link = record.link.as_str(), "Dropping duplicate link");
                continue;
            }
            if record.country.is_none() {
                record.country = Some("Global".to_string());
            }
            records.push(record);
        }
    }

    records
}
