use anyhow::{bail, Result};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Upper bound on a single encoded message.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// What the reader task reports to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent<M> {
    Message(M),
    Closed,
}

/// Length-prefixed JSON frames over one reliable, ordered byte stream.
///
/// Inbound frames are read by a background task and queued, so waiting on
/// [`NetworkManager::next_event`] inside `select!` never drops half a frame.
pub struct NetworkManager<W, M> {
    send: W,
    inbound: mpsc::UnboundedReceiver<NetworkEvent<M>>,
    reader: JoinHandle<()>,
}

impl<W, M> NetworkManager<W, M>
where
    W: AsyncWrite + Unpin,
    M: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new<R>(send: W, recv: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, inbound) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop::<R, M>(recv, tx));
        Self {
            send,
            inbound,
            reader,
        }
    }

    pub async fn send_msg(&mut self, msg: &M) -> Result<()> {
        let bytes = serde_json::to_vec(msg)?;
        if bytes.len() > MAX_FRAME_LEN {
            bail!("outgoing frame of {} bytes exceeds {MAX_FRAME_LEN}", bytes.len());
        }
        self.send.write_u32(bytes.len() as u32).await?;
        self.send.write_all(&bytes).await?;
        self.send.flush().await?;
        Ok(())
    }

    /// Cancel-safe. Returns `None` once the reader has finished and every
    /// queued event has been taken.
    pub async fn next_event(&mut self) -> Option<NetworkEvent<M>> {
        self.inbound.recv().await
    }
}

impl<W, M> Drop for NetworkManager<W, M> {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop<R, M>(mut recv: R, tx: mpsc::UnboundedSender<NetworkEvent<M>>)
where
    R: AsyncRead + Unpin,
    M: DeserializeOwned,
{
    loop {
        let len = match recv.read_u32().await {
            Ok(len) => len as usize,
            Err(e) => {
                debug!(error = %e, "peer stream ended");
                break;
            }
        };
        if len > MAX_FRAME_LEN {
            warn!(len, "oversized frame from peer; closing");
            break;
        }
        let mut buf = vec![0u8; len];
        if let Err(e) = recv.read_exact(&mut buf).await {
            warn!(error = %e, "peer stream ended mid-frame");
            break;
        }
        match serde_json::from_slice::<M>(&buf) {
            Ok(msg) => {
                if tx.send(NetworkEvent::Message(msg)).is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "undecodable frame ignored"),
        }
    }
    let _ = tx.send(NetworkEvent::Closed);
}
