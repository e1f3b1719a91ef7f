pub mod engine;
pub mod types;

pub use engine::{extract_metric_value, rank};
pub use types::{Ranking, RankingEntry};
