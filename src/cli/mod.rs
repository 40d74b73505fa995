//! Command-line interface for docket.
//!
//! # Available Commands
//!
//! - `docs` - current documentation for the plugins of a versions report
//! - `versioned` - versioned documentation for every tagged release, published as a pull request
//! - `placeholder` - empty versions index for a new integration plugin
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only report errors
//!
//! Without either flag the log level comes from `RUST_LOG`, or `info`.
//! Logs go to stderr; one line per written document goes to stdout.
//!
//! # Environment
//!
//! - `GITHUB_TOKEN` - required for tag listing, repository enumeration and pull requests
//! - `PLUGIN_ORG` - organisation of plugins whose registry metadata names no source

mod docs;
mod placeholder;
mod versioned;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use docs::DocsCommand;
pub use placeholder::PlaceholderCommand;
pub use versioned::VersionedCommand;

#[derive(Parser)]
#[command(
    name = "docket",
    about = "Generate Logstash plugin reference documentation",
    version,
    long_about = "docket reads plugin documentation from source repositories at their released versions \
                  and writes it into a documentation repository, either as the current reference or as one \
                  document per release."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the current documentation of every plugin in a versions report.
    Docs(DocsCommand),

    /// Write versioned documentation for new plugin releases and open a pull request.
    Versioned(VersionedCommand),

    /// Add an empty versions index for a new integration plugin and open a pull request.
    Placeholder(PlaceholderCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        init_logging(self.log_filter());

        match self.command {
            Commands::Docs(cmd) => cmd.execute().await,
            Commands::Versioned(cmd) => cmd.execute().await,
            Commands::Placeholder(cmd) => cmd.execute().await,
        }
    }

    /// Filter directive for the selected verbosity; `None` defers to `RUST_LOG`.
    fn log_filter(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

fn init_logging(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // a subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
