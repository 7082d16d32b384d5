use anyhow::Result;
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    narrator::setup::init_tracing(cli.verbose)?;
    cli::run(cli).await
}
