use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::warn;
use serde::{Deserialize, Serialize};

use super::metrics::{MetricSpec, default_metrics};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Number of entries kept per leaderboard
    pub top_n: usize,
    /// Metrics to rank, in render order
    pub metrics: Vec<MetricSpec>,
    /// Per-key display name overrides
    pub display_names: HashMap<String, String>,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            metrics: default_metrics(),
            display_names: HashMap::new(),
        }
    }
}

impl RankingSettings {
    /// Metric list with display-name overrides applied
    pub fn resolved_metrics(&self) -> Vec<MetricSpec> {
        self.metrics
            .iter()
            .map(|metric| match self.display_names.get(&metric.key) {
                Some(name) => MetricSpec {
                    display_name: name.clone(),
                    ..metric.clone()
                },
                None => metric.clone(),
            })
            .collect()
    }
}

/// When to recompute and publish the leaderboards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePolicy {
    /// Fixed delay in seconds between cycle completions
    Interval { seconds: u64 },
    /// Daily at a fixed wall-clock time, as hour and fraction (8.5 = 08:30)
    Daily { time: f64 },
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        SchedulePolicy::Interval { seconds: 3600 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// When false, no timer is armed at all
    pub enabled: bool,
    pub policy: SchedulePolicy,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: SchedulePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    /// Local clone of the repository receiving the artifact.
    /// Empty disables the publish step.
    pub repo_path: PathBuf,
    pub branch: String,
    /// Path of the artifact inside the repository
    pub file_path: String,
    /// Bearer token embedded into the https push URL for each push.
    /// Never written into the clone's remote configuration.
    pub token: Option<String>,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::new(),
            branch: "main".to_string(),
            file_path: "ranking.md".to_string(),
            token: None,
        }
    }
}

impl PublishSettings {
    pub fn is_configured(&self) -> bool {
        !self.repo_path.as_os_str().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// UUID to display-name mapping file maintained by the game server
    pub usercache_path: PathBuf,
    /// Directory of per-player stat files
    pub stats_dir: PathBuf,
    /// Staging location of the rendered artifact
    pub output_path: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            usercache_path: PathBuf::from("server/usercache.json"),
            stats_dir: PathBuf::from("server/world/stats"),
            output_path: PathBuf::from("ranking.md"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataSettings,
    pub ranking: RankingSettings,
    pub schedule: ScheduleSettings,
    pub publish: PublishSettings,
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file does not exist. Every field is optional; validation happens
    /// once here rather than at each use site.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str::<Self>(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()));
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ranking.top_n == 0 {
            bail!("ranking.top_n must be at least 1");
        }

        match self.schedule.policy {
            SchedulePolicy::Interval { seconds } if seconds == 0 => {
                bail!("schedule interval must be at least 1 second")
            }
            SchedulePolicy::Daily { time } if !(0.0..24.0).contains(&time) => {
                bail!("schedule daily time must be within [0, 24), got {time}")
            }
            _ => Ok(()),
        }
    }
}
