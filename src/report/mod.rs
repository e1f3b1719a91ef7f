use std::fmt::Write as _;

use colored::Colorize;

use crate::config::{MetricSpec, Unit};
use crate::ranking::Ranking;

/// Game ticks per in-game day
const TICKS_PER_DAY: f64 = 24000.0;
const CM_PER_METER: f64 = 100.0;
const MINUTES_PER_DAY: f64 = 1440.0;

/// Fixed first line of the published artifact
const ARTIFACT_HEADER: &str =
    "Auto-updated leaderboard showing the top player for each tracked statistic.";

/// Render the compact publish artifact: one top entry per metric
///
/// Metrics with no positive contributors are omitted entirely. Output is a
/// pure function of the input pairs, reproducible byte for byte, and keeps
/// the metric order it was given.
pub fn render_summary(rankings: &[(MetricSpec, Ranking)]) -> String {
    let mut out = String::new();
    out.push_str(ARTIFACT_HEADER);
    out.push_str("\n\n");

    for (spec, ranking) in rankings {
        let Some(top) = ranking.top() else {
            continue;
        };
        let _ = writeln!(out, "## {}", spec.display_name);
        let _ = writeln!(
            out,
            "- **{}** {}",
            top.identity.name,
            format_summary_value(top.value, spec.unit)
        );
        out.push('\n');
    }

    out
}

/// Render one metric's full leaderboard for the console
///
/// Unlike the compact artifact, an empty ranking is shown as "no data".
pub fn render_console(spec: &MetricSpec, ranking: &Ranking) -> String {
    let mut out = String::new();
    let header = format!("=== {} ===", spec.display_name);
    let _ = writeln!(out, "{}", header.cyan().bold());

    if ranking.is_empty() {
        let _ = writeln!(out, "{}", "no data".dimmed());
        return out;
    }

    for (position, entry) in ranking.entries.iter().enumerate() {
        let rank = format!("{:>2}", position + 1);
        let _ = writeln!(
            out,
            "{}. {}  {}",
            rank.yellow(),
            entry.identity.name.bold(),
            format_console_value(entry.value, spec.unit)
        );
    }

    out
}

/// Format a raw value for the compact artifact
///
/// Durations are shown in whole minutes (days scaled by 1440, truncated).
pub fn format_summary_value(value: i64, unit: Unit) -> String {
    match unit {
        Unit::Distance => format!("{:.2} m", value as f64 / CM_PER_METER),
        Unit::Duration => {
            let days = value as f64 / TICKS_PER_DAY;
            format!("{} minutes", (days * MINUTES_PER_DAY) as i64)
        }
        Unit::Count | Unit::None => value.to_string(),
    }
}

/// Format a raw value for the console listing
///
/// Durations stay in days here; the full table reads better that way.
pub fn format_console_value(value: i64, unit: Unit) -> String {
    match unit {
        Unit::Distance => format!("{:.2} m", value as f64 / CM_PER_METER),
        Unit::Duration => format!("{:.2} days", value as f64 / TICKS_PER_DAY),
        Unit::Count | Unit::None => value.to_string(),
    }
}
