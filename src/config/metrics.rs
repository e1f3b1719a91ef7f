use serde::{Deserialize, Serialize};

/// Display unit of a tracked metric
///
/// Determines the conversion applied for display: distance counters are
/// stored in centimeters, time counters in game ticks (24000 per in-game
/// day). Counts are rendered as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Count,
    Distance,
    Duration,
    None,
}

/// A per-player statistic to rank and how to present it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub key: String,
    pub display_name: String,
    pub unit: Unit,
}

impl MetricSpec {
    pub fn new(key: &str, display_name: &str, unit: Unit) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            unit,
        }
    }
}

/// Get the default list of ranked metrics
///
/// Keys follow the vanilla server's stat naming. The blocks-broken entry is
/// a derived aggregate: it has no counter of its own and is computed as the
/// sum of the per-block mining bucket.
pub fn default_metrics() -> Vec<MetricSpec> {
    vec![
        MetricSpec::new("minecraft:play_time", "Longest time played", Unit::Duration),
        MetricSpec::new("minecraft:walk_one_cm", "Farthest distance walked", Unit::Distance),
        MetricSpec::new("minecraft:fly_one_cm", "Farthest distance flown", Unit::Distance),
        MetricSpec::new("minecraft:swim_one_cm", "Farthest distance swum", Unit::Distance),
        MetricSpec::new("minecraft:jump", "Most jumps", Unit::Count),
        MetricSpec::new("minecraft:mob_kills", "Most mobs killed", Unit::Count),
        MetricSpec::new("minecraft:damage_taken", "Most damage taken", Unit::Count),
        MetricSpec::new("minecraft:blocks_broken", "Most blocks broken", Unit::Count),
    ]
}
