// Score normalization: the heterogeneous popularity signals (views, stars,
// interest indices) are only comparable after log-scale min-max rescaling
// within each platform partition.

use std::collections::HashMap;

use flowpulse_common::{Platform, Record};

/// Write a `score` in [0, 100] onto every record.
///
/// Per platform partition: take the platform's signal metric (missing,
/// non-finite, and negative values read as 0), apply `ln_1p` to compress the
/// dynamic range, then min-max rescale so the smallest raw signal scores 0
/// and the largest 100. A partition with no spread (uniform values, a single
/// record, all zeros) scores 0 throughout — there is no information to
/// differentiate its records.
///
/// Scores are batch-relative: rerunning over a different record set moves
/// every score in the partition, even for records whose raw signal did not
/// change. Ordering within a partition always matches the raw signal.
pub fn normalize_scores(records: &mut [Record]) {
    let mut partitions: HashMap<Platform, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        partitions.entry(record.platform).or_default().push(i);
    }

    for indices in partitions.values() {
        let log_scaled: Vec<f64> = indices
            .iter()
            .map(|&i| records[i].raw_signal().ln_1p())
            .collect();

        let min = log_scaled.iter().copied().fold(f64::INFINITY, f64::min);
        let max = log_scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max > min {
            for (&i, &value) in indices.iter().zip(&log_scaled) {
                records[i].score = Some((value - min) / (max - min) * 100.0);
            }
        } else {
            for &i in indices {
                records[i].score = Some(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forum_record(link_suffix: u32, views: f64) -> Record {
        Record::new(
            format!("topic {link_suffix}"),
            Platform::Forum,
            format!("https://forum.example.com/t/{link_suffix}"),
        )
        .with_metric("views", views)
    }

    fn scores(records: &[Record]) -> Vec<f64> {
        records.iter().map(|r| r.score.unwrap()).collect()
    }

    #[test]
    fn extremes_map_to_zero_and_hundred() {
        let mut records = vec![
            forum_record(1, 3.0),
            forum_record(2, 700.0),
            forum_record(3, 48.0),
        ];
        normalize_scores(&mut records);

        let s = scores(&records);
        assert_eq!(s[0], 0.0);
        assert_eq!(s[1], 100.0);
        assert!(s[2] > 0.0 && s[2] < 100.0);
    }

    #[test]
    fn known_scenario_zero_one_nine_ninety_nine() {
        let mut records = vec![
            forum_record(1, 0.0),
            forum_record(2, 1.0),
            forum_record(3, 9.0),
            forum_record(4, 99.0),
        ];
        normalize_scores(&mut records);

        // log1p: [0, ln 2, ln 10, ln 100] → [0, ~15.05, ~50.0, 100]
        let s = scores(&records);
        assert_eq!(s[0], 0.0);
        assert!((s[1] - 15.05).abs() < 0.01, "got {}", s[1]);
        assert!((s[2] - 50.0).abs() < 0.01, "got {}", s[2]);
        assert_eq!(s[3], 100.0);
    }

    #[test]
    fn score_is_monotonic_in_raw_signal() {
        let raws = [0.0, 2.0, 2.0, 17.0, 101.0, 5000.0, 5001.0];
        let mut records: Vec<Record> = raws
            .iter()
            .enumerate()
            .map(|(i, &v)| forum_record(i as u32, v))
            .collect();
        normalize_scores(&mut records);

        let mut pairs: Vec<(f64, f64)> = records
            .iter()
            .map(|r| (r.raw_signal(), r.score.unwrap()))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        for window in pairs.windows(2) {
            assert!(
                window[0].1 <= window[1].1,
                "raw {} scored {} above raw {} scored {}",
                window[0].0,
                window[0].1,
                window[1].0,
                window[1].1
            );
        }
    }

    #[test]
    fn uniform_partition_scores_zero() {
        let mut records = vec![forum_record(1, 5.0), forum_record(2, 5.0)];
        normalize_scores(&mut records);
        assert_eq!(scores(&records), vec![0.0, 0.0]);
    }

    #[test]
    fn all_zero_partition_scores_zero() {
        let mut records = vec![forum_record(1, 0.0), forum_record(2, 0.0)];
        normalize_scores(&mut records);
        assert_eq!(scores(&records), vec![0.0, 0.0]);
    }

    #[test]
    fn single_record_partition_scores_zero() {
        let mut records = vec![forum_record(1, 9999.0)];
        normalize_scores(&mut records);
        assert_eq!(records[0].score, Some(0.0));
    }

    #[test]
    fn empty_input_is_a_noop() {
        let mut records: Vec<Record> = Vec::new();
        normalize_scores(&mut records);
    }

    #[test]
    fn negative_raw_values_coerce_to_zero_before_scaling() {
        let mut records = vec![forum_record(1, -50.0), forum_record(2, 10.0)];
        normalize_scores(&mut records);
        assert_eq!(records[0].score, Some(0.0));
        assert_eq!(records[1].score, Some(100.0));
    }

    #[test]
    fn platforms_are_scored_independently() {
        let mut records = vec![
            forum_record(1, 10.0),
            forum_record(2, 1000.0),
            Record::new("repo", Platform::CodeHost, "https://github.com/a/b")
                .with_metric("stars", 3.0),
            Record::new("repo2", Platform::CodeHost, "https://github.com/a/c")
                .with_metric("stars", 400.0),
        ];
        normalize_scores(&mut records);

        // Each partition spans its own full [0, 100] regardless of the other.
        assert_eq!(records[0].score, Some(0.0));
        assert_eq!(records[1].score, Some(100.0));
        assert_eq!(records[2].score, Some(0.0));
        assert_eq!(records[3].score, Some(100.0));
    }

    #[test]
    fn scores_stay_in_range() {
        let raws = [0.0, 1.0, 10.0, 100.0, 1e6, 1e9];
        let mut records: Vec<Record> = raws
            .iter()
            .enumerate()
            .map(|(i, &v)| forum_record(i as u32, v))
            .collect();
        normalize_scores(&mut records);
        for r in &records {
            let s = r.score.unwrap();
            assert!((0.0..=100.0).contains(&s), "score {s} out of range");
        }
    }

    #[test]
    fn only_score_is_touched() {
        let mut records = vec![forum_record(1, 5.0)
            .with_country("US")
            .with_meta("author", serde_json::json!("a"))];
        let before = records[0].clone();
        normalize_scores(&mut records);

        assert_eq!(records[0].title, before.title);
        assert_eq!(records[0].link, before.link);
        assert_eq!(records[0].metrics, before.metrics);
        assert_eq!(records[0].country, before.country);
        assert_eq!(records[0].metadata, before.metadata);
    }
}
