use std::fs;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::{AppConfig, MetricSpec};
use crate::domain::{CycleSummary, PlayerRecord, StatLoad};
use crate::publish::GitPublisher;
use crate::ranking::{self, Ranking};
use crate::report;
use crate::store::StatRecordStore;

/// One full aggregate, render and publish pass
///
/// Stateless between runs; everything is rebuilt from disk and from the
/// configuration it was constructed with.
pub struct CycleService {
    config: AppConfig,
}

impl CycleService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the cycle
    ///
    /// Missing or partially broken input data degrades to empty rankings.
    /// A publish failure fails the cycle as a whole, but the artifact on
    /// disk and any local commit stay in place for the next attempt.
    pub async fn run(&self) -> Result<CycleSummary> {
        info!("=== Starting Ranking Cycle ===");

        // Step 1: Load player records
        let load = self.load_records()?;
        info!(
            "  → Loaded {} players ({} files skipped)",
            load.records.len(),
            load.skipped.len()
        );

        // Step 2: Compute per-metric rankings
        let rankings = self.compute_rankings(&load.records);
        let populated = rankings.iter().filter(|(_, r)| !r.is_empty()).count();
        info!(
            "  → Computed {} rankings ({} with data)",
            rankings.len(),
            populated
        );

        // Step 3: Render and stage the artifact
        let artifact = report::render_summary(&rankings);
        self.write_artifact(&artifact)?;
        info!(
            "  → Artifact written to {}",
            self.config.data.output_path.display()
        );

        // Step 4: Publish
        let published = self.publish().await?;

        info!("=== Cycle Complete ===");
        Ok(CycleSummary {
            players: load.records.len(),
            skipped_files: load.skipped.len(),
            rankings: populated,
            published,
        })
    }

    fn load_records(&self) -> Result<StatLoad> {
        let store = StatRecordStore::new(&self.config.data);
        let load = store.load()?;
        for skipped in &load.skipped {
            warn!("  → Skipped {}: {}", skipped.file_name, skipped.reason);
        }
        Ok(load)
    }

    fn compute_rankings(&self, records: &[PlayerRecord]) -> Vec<(MetricSpec, Ranking)> {
        self.config
            .ranking
            .resolved_metrics()
            .into_iter()
            .map(|spec| {
                let ranking = ranking::rank(records, &spec.key, self.config.ranking.top_n);
                (spec, ranking)
            })
            .collect()
    }

    fn write_artifact(&self, artifact: &str) -> Result<()> {
        let path = &self.config.data.output_path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        fs::write(path, artifact)
            .with_context(|| format!("Failed to write artifact {}", path.display()))
    }

    async fn publish(&self) -> Result<bool> {
        if !self.config.publish.is_configured() {
            info!("  → Publish target not configured, skipping");
            return Ok(false);
        }

        let publisher = GitPublisher::new(self.config.publish.clone());
        publisher.publish(&self.config.data.output_path).await?;
        info!("  → Pushed to branch {}", self.config.publish.branch);
        Ok(true)
    }
}
