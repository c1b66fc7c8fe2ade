/// Core game interface for the duelterm engine
use crossterm::event::KeyEvent;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// Outbox handed to a game on every callback. Messages are delivered to the
/// peer in the order they were queued.
#[derive(Debug, Clone)]
pub struct Context<M> {
    tx: UnboundedSender<M>,
}

impl<M> Context<M> {
    pub fn new(tx: UnboundedSender<M>) -> Self {
        Self { tx }
    }

    pub fn send_network_event(&self, msg: M) {
        // The engine owns the receiver for as long as any game callback can run.
        let _ = self.tx.send(msg);
    }
}

/// A two-peer game driven by the engine loop. Every callback runs on the
/// engine task, one at a time.
pub trait Game {
    /// Message exchanged with the peer
    type Message: Serialize + DeserializeOwned + Send + 'static;

    /// The channel to the peer is usable.
    fn on_connected(&mut self, ctx: &Context<Self::Message>);

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context<Self::Message>);

    fn handle_network(&mut self, msg: Self::Message, ctx: &Context<Self::Message>);

    /// The peer went away. There is no reconnection.
    fn on_disconnected(&mut self) {}

    fn render(&self, frame: &mut ratatui::Frame);
}
