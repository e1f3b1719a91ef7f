use serde_json::{Map, Value};

use super::types::{Ranking, RankingEntry};
use crate::domain::PlayerRecord;

/// Bucket of free-standing counters in a stat file
const CUSTOM_BUCKET: &str = "minecraft:custom";
/// Bucket of per-block mining counters
const MINED_BUCKET: &str = "minecraft:mined";
/// Derived metric with no counter of its own: the mined bucket summed
const BLOCKS_BROKEN_KEY: &str = "minecraft:blocks_broken";

/// Build the leaderboard for one metric
///
/// Players whose extracted value is not strictly positive are excluded
/// before sorting. The sort is stable, so equal values keep record order.
/// Pure over its inputs; calls for different metrics are independent.
pub fn rank(records: &[PlayerRecord], metric_key: &str, top_n: usize) -> Ranking {
    let mut entries: Vec<RankingEntry> = records
        .iter()
        .filter_map(|record| {
            let value = extract_metric_value(&record.stats, metric_key);
            (value > 0).then(|| RankingEntry {
                identity: record.identity.clone(),
                value,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.value.cmp(&a.value));
    entries.truncate(top_n);

    Ranking { entries }
}

/// Extract a metric's raw value from a player's nested stats
///
/// Lookup order, first match wins: the custom bucket, the derived
/// blocks-broken sum, a direct top-level numeric entry. Anything else
/// counts as zero.
pub fn extract_metric_value(stats: &Map<String, Value>, metric_key: &str) -> i64 {
    if let Some(value) = custom_bucket_value(stats, metric_key) {
        return value;
    }

    if metric_key == BLOCKS_BROKEN_KEY {
        if let Some(total) = mined_bucket_total(stats) {
            return total;
        }
    }

    stats.get(metric_key).and_then(Value::as_i64).unwrap_or(0)
}

fn custom_bucket_value(stats: &Map<String, Value>, metric_key: &str) -> Option<i64> {
    stats.get(CUSTOM_BUCKET)?.get(metric_key)?.as_i64()
}

fn mined_bucket_total(stats: &Map<String, Value>) -> Option<i64> {
    let mined = stats.get(MINED_BUCKET)?.as_object()?;
    Some(mined.values().filter_map(Value::as_i64).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerIdentity;
    use serde_json::json;

    fn record(name: &str, stats: Value) -> PlayerRecord {
        PlayerRecord {
            identity: PlayerIdentity {
                uuid: name.to_string(),
                name: name.to_string(),
            },
            stats: stats.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn custom_bucket_wins_over_direct_match() {
        let stats = json!({
            "minecraft:custom": { "minecraft:jump": 5 },
            "minecraft:jump": 9
        });
        let value = extract_metric_value(stats.as_object().unwrap(), "minecraft:jump");
        assert_eq!(value, 5);
    }

    #[test]
    fn blocks_broken_sums_the_mined_bucket() {
        let stats = json!({
            "minecraft:mined": {
                "minecraft:stone": 100,
                "minecraft:dirt": 20,
                "minecraft:oak_log": 3
            }
        });
        let value = extract_metric_value(stats.as_object().unwrap(), "minecraft:blocks_broken");
        assert_eq!(value, 123);
    }

    #[test]
    fn blocks_broken_prefers_an_explicit_custom_counter() {
        let stats = json!({
            "minecraft:custom": { "minecraft:blocks_broken": 7 },
            "minecraft:mined": { "minecraft:stone": 100 }
        });
        let value = extract_metric_value(stats.as_object().unwrap(), "minecraft:blocks_broken");
        assert_eq!(value, 7);
    }

    #[test]
    fn direct_top_level_number_is_the_last_resort() {
        let stats = json!({ "minecraft:play_time": 48000 });
        let value = extract_metric_value(stats.as_object().unwrap(), "minecraft:play_time");
        assert_eq!(value, 48000);
    }

    #[test]
    fn missing_metric_counts_as_zero() {
        let stats = json!({ "minecraft:custom": {} });
        let value = extract_metric_value(stats.as_object().unwrap(), "minecraft:jump");
        assert_eq!(value, 0);
    }

    #[test]
    fn rank_excludes_zero_and_negative_values() {
        let records = vec![
            record("a", json!({ "minecraft:custom": { "minecraft:jump": 10 } })),
            record("b", json!({ "minecraft:custom": { "minecraft:jump": 0 } })),
            record("c", json!({ "minecraft:custom": { "minecraft:jump": -3 } })),
            record("d", json!({})),
        ];

        let ranking = rank(&records, "minecraft:jump", 10);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking.entries[0].identity.name, "a");
        assert!(ranking.entries.iter().all(|e| e.value > 0));
    }

    #[test]
    fn rank_sorts_descending_and_truncates() {
        let records = vec![
            record("low", json!({ "minecraft:custom": { "minecraft:jump": 1 } })),
            record("high", json!({ "minecraft:custom": { "minecraft:jump": 30 } })),
            record("mid", json!({ "minecraft:custom": { "minecraft:jump": 15 } })),
        ];

        let ranking = rank(&records, "minecraft:jump", 2);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking.entries[0].identity.name, "high");
        assert_eq!(ranking.entries[1].identity.name, "mid");

        let values: Vec<i64> = ranking.entries.iter().map(|e| e.value).collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(values, sorted);
    }

    #[test]
    fn equal_values_keep_record_order() {
        let records = vec![
            record("first", json!({ "minecraft:custom": { "minecraft:jump": 5 } })),
            record("second", json!({ "minecraft:custom": { "minecraft:jump": 5 } })),
            record("third", json!({ "minecraft:custom": { "minecraft:jump": 5 } })),
        ];

        let ranking = rank(&records, "minecraft:jump", 10);
        let names: Vec<&str> = ranking
            .entries
            .iter()
            .map(|e| e.identity.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn aggregate_is_independent_of_bucket_key_order() {
        let forward = json!({
            "minecraft:mined": { "a": 1, "b": 2, "c": 3 }
        });
        let reversed = json!({
            "minecraft:mined": { "c": 3, "b": 2, "a": 1 }
        });

        let key = "minecraft:blocks_broken";
        assert_eq!(
            extract_metric_value(forward.as_object().unwrap(), key),
            extract_metric_value(reversed.as_object().unwrap(), key)
        );
    }
}
