use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "player-stats-ranking leaderboard publisher")]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Run the update scheduler until interrupted
    Run,
    /// Print the full leaderboards to the console
    Report,
    /// Render the artifact and publish it once
    Publish,
    /// Show the known player identity mapping
    Players,
}
