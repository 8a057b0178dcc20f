use flowpulse_common::Record;

/// Order the scored record set descending by score.
///
/// The sort is stable and uses no secondary key: records with equal scores
/// keep the order they arrived from the aggregator.
pub fn rank(records: &mut [Record]) {
    records.sort_by(|a, b| b.score_or_zero().total_cmp(&a.score_or_zero()));
}
