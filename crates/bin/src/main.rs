use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;
mod session;
mod store;
mod templates;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("yspotify=info".parse()?))
        .init();

    match cli.into_command() {
        Commands::Serve(args) => commands::serve::run(&args).await,
        Commands::Health(args) => commands::health::run(&args).await,
        Commands::Groups(args) => commands::groups::run(&args).await,
    }
}
