//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use pagehouse::{CONFIG_FILE, ConfigBuilder};
use std::path::PathBuf;

/// Pagehouse static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long, default_value = "./")]
    pub root: PathBuf,

    /// Config file name, relative to root
    #[arg(short = 'C', long, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Abort on the first error
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub strict: Option<bool>,

    /// Print diagnostic detail
    #[arg(short, long)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Output directory (default from config)
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Only build these page references, repeatable
    #[arg(short, long = "limit", value_name = "REF")]
    pub limit: Vec<String>,

    /// Data files or references to build instead of the whole data directory
    #[arg(value_name = "SOURCES")]
    pub sources: Vec<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a default config and an empty site layout
    Init,

    /// Compile page data and write one document per page
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

impl Cli {
    /// Apply flag values over the loaded config.
    pub fn apply(&self, config: &mut ConfigBuilder) {
        if let Some(strict) = self.strict {
            config.report.strict = strict;
        }
        if self.verbose {
            config.report.verbose = true;
        }
        if self.silent {
            config.report.silent = true;
            config.report.verbose = false;
        }
        if let Commands::Build { build_args } = &self.command
            && let Some(target) = &build_args.target
        {
            config.paths.target = target.clone();
        }
    }
}
