use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cmg-monitor", version, about = "Hourly marginal cost monitor")]
pub struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single ingestion tick for the current hour.
    Tick,
    /// Serve the read API and run a tick at the top of every hour.
    Serve {
        /// Override the configured port for this run only.
        #[arg(long)]
        port: Option<u16>,
        /// Serve the API without the hourly scheduler.
        #[arg(long, default_value_t = false)]
        no_scheduler: bool,
    },
    /// Print the hourly aggregates of the trailing window as JSON.
    Aggregates {
        #[arg(long)]
        hours: Option<u32>,
    },
}
