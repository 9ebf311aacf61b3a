use anyhow::Result;
use clap::Parser;

mod api;
mod bundle;
mod cli;
mod config;
mod launch;
mod relay;
#[cfg(test)]
mod test_support;

use cli::Cli;
use config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.clone())?;
    cli::context::init_tracing(&config.logging)?;
    cli::run(cli, config).await
}
