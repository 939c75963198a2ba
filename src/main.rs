use clap::Parser;

use snappi_lib::bootstrap;
use snappi_lib::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let config = bootstrap::resolve_config(args.config.as_deref())?;
    bootstrap::tracing::init_tracing_subscriber(&config.log_directory)?;

    cli::run(args.command, &config).await
}
