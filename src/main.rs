//! Pagehouse - compile JSON page data into site documents.

mod build;
mod cli;
mod init;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use init::new_site;
use pagehouse::ConfigBuilder;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ConfigBuilder::load(&cli.root, &cli.config)?;
    cli.apply(&mut config);

    match &cli.command {
        Commands::Init => {
            let config_path = config.paths.root.join(&cli.config);
            new_site(&config, &config_path)
        }
        Commands::Build { build_args } => build_site(config, build_args).map(|_| ()),
    }
}
