use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "duelterm")]
#[command(about = "⚔️ Peer-to-peer attack/block duel in the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log file (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Host a duel and wait for a guest
    Host,
    /// Join a duel hosted by someone else
    Join {
        /// Endpoint id printed by the host (defaults to the last one joined)
        endpoint_id: Option<String>,
    },
}
