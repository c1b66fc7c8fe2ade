use anyhow::{anyhow, Context as _, Result};
use clap::Parser;
use duelterm::cli::{Cli, Commands};
use duelterm::config::DuelConfig;
use duelterm::core::engine::Engine;
use duelterm::core::lobby;
use duelterm::core::network::NetworkManager;
use duelterm::games::duel::DuelGame;
use std::fs::{create_dir_all, OpenOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::info;

/// stdout belongs to the TUI, so logs go to a file.
fn init_tracing(level: &str, path: &Path) -> Result<()> {
    let level = tracing::Level::from_str(level).map_err(|_| anyhow!("unknown log level '{level}'"))?;
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = DuelConfig::load()?;

    if let Some(path) = cli.log_file.clone() {
        config.log_file = Some(path);
    }
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    let log_path = config.log_path();
    init_tracing(&level, &log_path)?;

    let endpoint = lobby::bind().await?;
    let link = match cli.command {
        Commands::Host => {
            println!("Your Endpoint ID: {}", endpoint.id());
            println!("Share this with your opponent:  duelterm join {}", endpoint.id());
            println!("Waiting for opponent to connect...");
            lobby::host(endpoint).await?
        }
        Commands::Join { endpoint_id } => {
            let peer = endpoint_id
                .or_else(|| config.last_host.clone())
                .ok_or_else(|| anyhow!("no endpoint id given and none remembered"))?;
            println!("Connecting to host...");
            let link = lobby::join(endpoint, &peer).await?;
            config.last_host = Some(peer);
            config.save()?;
            link
        }
    };
    info!(role = %link.role, local = %link.local_id(), remote = %link.remote_id(), "session starting");

    let lobby::PeerLink { endpoint, conn, send, recv, role } = link;
    let network = NetworkManager::new(send, recv);
    let engine = Engine::new(DuelGame::new(role), network);

    let terminal = ratatui::init();
    let result = engine.run(terminal).await;
    ratatui::restore();

    conn.close(0u32.into(), b"bye");
    endpoint.close().await;
    result
}
