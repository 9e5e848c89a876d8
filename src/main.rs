mod api;
mod browser;
mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod order;
mod prompt;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};
use config::BcConfig;

async fn run(cli: Cli, mut config: BcConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Subscriptions { tier } => commands::subscriptions(&config, tier.as_deref()).await,
        Command::Status => commands::status(&config).await,
        Command::Signup => commands::signup(&mut config).await,
        Command::Login => commands::login(&mut config).await,
        Command::Logout => commands::logout(&mut config),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match BcConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e:#}", console::style("✗").red());
            return ExitCode::FAILURE;
        }
    };
    logging::init(cli.verbose || config.debug);
    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{} {e:#}", console::style("✗").red());
            ExitCode::FAILURE
        }
    }
}
