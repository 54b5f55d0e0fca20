//! # stackport: app-store Compose converter
//!
//! Reads a community app-store Compose app and writes either a container-host
//! provisioning script or a clean stack file.

mod commands;
mod loader;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
