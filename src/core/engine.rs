use crate::core::game::{Context, Game};
use crate::core::network::{NetworkEvent, NetworkManager};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tracing::{info, warn};

/// Redraw wake-up so key presses are picked up even when the peer is quiet.
const FRAME: Duration = Duration::from_millis(16);

pub struct Engine<G: Game, W> {
    game: G,
    network: NetworkManager<W, G::Message>,
}

impl<G, W> Engine<G, W>
where
    G: Game,
    W: AsyncWrite + Unpin,
{
    pub fn new(game: G, network: NetworkManager<W, G::Message>) -> Self {
        Self { game, network }
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        // set up the outbox the game writes into
        let (outbox_tx, mut outbox_rx) = tokio::sync::mpsc::unbounded_channel::<G::Message>();
        let ctx = Context::new(outbox_tx);
        let mut connected = true;

        self.game.on_connected(&ctx);

        loop {
            terminal.draw(|f| self.game.render(f))?;

            // INPUT (Non-blocking)
            if event::poll(Duration::from_millis(0))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if key.code == KeyCode::Esc {
                            break;
                        }
                        self.game.handle_input(key, &ctx);
                    }
                }
            }

            tokio::select! {
                // SEND: whatever the game queued, in order
                Some(msg) = outbox_rx.recv(), if connected => {
                    connected = self.deliver(&msg).await;
                }

                // RECEIVE: from the other player
                incoming = self.network.next_event(), if connected => {
                    match incoming {
                        Some(NetworkEvent::Message(msg)) => self.game.handle_network(msg, &ctx),
                        Some(NetworkEvent::Closed) | None => {
                            info!("peer channel closed");
                            connected = false;
                            self.game.on_disconnected();
                        }
                    }
                }

                _ = tokio::time::sleep(FRAME) => {}
            }
        }

        Ok(())
    }

    /// Sends one queued message. A failed write means the peer is gone, even if
    /// the reader has not reported it yet.
    async fn deliver(&mut self, msg: &G::Message) -> bool {
        match self.network.send_msg(msg).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "send to peer failed");
                self.game.on_disconnected();
                false
            }
        }
    }
}
