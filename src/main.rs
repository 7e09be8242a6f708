mod capture;
mod cli;
mod config;
mod core;
mod domain;
mod export;
mod render;
mod session;
mod style;

use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    core::app::run(cli).await
}
