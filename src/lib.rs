pub mod cli;
pub mod config;
pub mod domain;
pub mod publish;
pub mod ranking;
pub mod report;
pub mod scheduler;
pub mod services;
pub mod store;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use log::info;

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::scheduler::Scheduler;
use crate::store::StatRecordStore;

pub fn interpret() -> Cli {
    Cli::parse()
}

/// Run the scheduler loop until the process is interrupted
pub fn handle_run(config_path: &Path) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::load(config_path)?;
        let mut scheduler = Scheduler::new(config_path.to_path_buf());

        scheduler.start(&config);
        if !scheduler.is_running() {
            return Ok(());
        }

        tokio::signal::ctrl_c().await?;
        scheduler.stop();
        Ok(())
    })
}

/// Run one aggregate-and-publish cycle and report the outcome
pub fn handle_publish(config_path: &Path) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::load(config_path)?;
        let scheduler = Scheduler::new(config_path.to_path_buf());

        let summary = scheduler.trigger_now(&config).await?;
        info!("Update complete: {summary}");
        Ok(())
    })
}

/// Print the full top-N leaderboards to the console
pub fn handle_report(config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let store = StatRecordStore::new(&config.data);
    let load = store.load()?;

    println!("{} players on this server\n", load.records.len());
    for spec in config.ranking.resolved_metrics() {
        let ranking = ranking::rank(&load.records, &spec.key, config.ranking.top_n);
        print!("{}", report::render_console(&spec, &ranking));
        println!();
    }
    Ok(())
}

/// Print the identity mapping known to the server
pub fn handle_players(config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let store = StatRecordStore::new(&config.data);
    let identities = store.load_identity_map();

    println!("{} players in the identity mapping", identities.len());
    let mut players: Vec<(&String, &String)> = identities.iter().collect();
    players.sort();
    for (uuid, name) in players {
        println!("  {name} ({uuid})");
    }
    Ok(())
}
