//! Kiln - A static site generator for markdown blogs.

mod build;
mod cli;
mod config;
mod error;
mod page;
mod reload;
mod serve;
mod site;
mod template;
mod utils;
mod watch;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::serve_site;

fn main() -> Result<()> {
    // Unrecognised input prints usage; it is not a failure
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            return Ok(());
        }
    };
    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => build_site(&config),
        Commands::Serve { .. } => serve_site(&config),
    }
}
