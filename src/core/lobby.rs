use anyhow::{anyhow, Context as _, Result};
use iroh::endpoint::{Connection, Endpoint, RecvStream, SendStream};
use iroh::{EndpointAddr, EndpointId, RelayMode};
use tracing::{info, warn};

use crate::games::duel::Role;

pub const ALPN: &[u8] = b"duelterm/duel/0";

/// An established link to the single remote peer.
///
/// Keeps the endpoint and connection alive for as long as the streams are in use.
pub struct PeerLink {
    pub endpoint: Endpoint,
    pub conn: Connection,
    pub send: SendStream,
    pub recv: RecvStream,
    pub role: Role,
}

impl PeerLink {
    pub fn local_id(&self) -> EndpointId {
        self.endpoint.id()
    }

    pub fn remote_id(&self) -> EndpointId {
        self.conn.remote_id()
    }
}

pub async fn bind() -> Result<Endpoint> {
    bind_with(RelayMode::Default).await
}

pub async fn bind_with(relay_mode: RelayMode) -> Result<Endpoint> {
    Endpoint::builder()
        .alpns(vec![ALPN.to_vec()])
        .relay_mode(relay_mode)
        .bind()
        .await
        .context("failed to bind iroh endpoint")
}

/// Host: wait for exactly one guest, then open the game stream.
///
/// Connections arriving after the first are refused for the rest of the session.
pub async fn host(endpoint: Endpoint) -> Result<PeerLink> {
    let incoming = endpoint.accept().await.ok_or_else(|| anyhow!("endpoint closed"))?;
    let conn = incoming.accept()?.await?;
    info!(remote = %conn.remote_id(), "guest connected");

    tokio::spawn(refuse_extra_guests(endpoint.clone()));

    // The host opens and writes first (init), which is what lets the guest's accept_bi resolve.
    let (send, recv) = conn.open_bi().await?;
    info!("bidirectional stream opened (host)");

    Ok(PeerLink { endpoint, conn, send, recv, role: Role::Host })
}

async fn refuse_extra_guests(endpoint: Endpoint) {
    while let Some(incoming) = endpoint.accept().await {
        warn!("refusing duplicate connection attempt");
        incoming.refuse();
    }
}

/// Guest: dial the host named by `peer` and accept its game stream.
pub async fn join(endpoint: Endpoint, peer: &str) -> Result<PeerLink> {
    let peer_id: EndpointId = peer
        .trim()
        .parse()
        .with_context(|| format!("invalid endpoint id '{peer}'"))?;
    dial(endpoint, peer_id).await
}

pub async fn dial(endpoint: Endpoint, addr: impl Into<EndpointAddr>) -> Result<PeerLink> {
    let addr = addr.into();
    info!(host = %addr.id, "connecting to host");
    let conn = endpoint.connect(addr, ALPN).await?;
    let (send, recv) = conn.accept_bi().await?;
    info!("bidirectional stream accepted (guest)");

    Ok(PeerLink { endpoint, conn, send, recv, role: Role::Guest })
}
