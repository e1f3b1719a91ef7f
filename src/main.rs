use anyhow::Result;

use player_stats_ranking::cli::{Cli, Command};
use player_stats_ranking::{handle_players, handle_publish, handle_report, handle_run, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    match cli.command {
        Command::Run => handle_run(&cli.config),
        Command::Report => handle_report(&cli.config),
        Command::Publish => handle_publish(&cli.config),
        Command::Players => handle_players(&cli.config),
    }
}
