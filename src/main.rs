use anyhow::Context;
use clap::Parser;
use hiringgo_user_service::cli::{self, Cli, Command};
use hiringgo_user_service::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Serve => cli::serve::run(config).await,
        Command::Token(args) => cli::token::run(config, args),
    }
}
