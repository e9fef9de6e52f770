mod cli;
mod collectors;
mod config;
mod error;
mod filter;
mod models;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Command, Config};
use crate::store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vacancies=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    let mut store = JsonFileStore::new(&config.store_path);

    match config.resolved_command() {
        Command::Interactive => cli::interactive(&config, &mut store).await,
        Command::Search(args) => cli::search(&config, &mut store, &args).await,
        Command::Show { index } => cli::show(&mut store, index),
        Command::Find { platform, id } => cli::find(&mut store, &platform, id),
        Command::Delete { index } => cli::delete(&mut store, index),
    }
}
