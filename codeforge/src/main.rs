use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config_path = cli.config.as_deref();
    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Generate(args) => runtime.block_on(cli::commands::generate::execute(args, config_path)),
        Commands::Scaffold(args) => runtime.block_on(cli::commands::scaffold::execute(args, config_path)),
        Commands::Sessions(command) => runtime.block_on(cli::commands::sessions::execute(command, config_path)),
        Commands::Templates(command) => cli::commands::templates::execute(command),
    }
}
