mod commands;
mod display;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "breakwater")]
#[command(about = "Dependency analysis build gate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    #[command(about = "Submit scans and evaluate break thresholds")]
    Run(commands::Run),

    #[command(about = "List known scanner plugins")]
    Plugins(commands::Plugins),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(cmd) => {
            cmd.run().await?;
        }
        Commands::Plugins(cmd) => {
            cmd.run();
        }
    }

    Ok(())
}
