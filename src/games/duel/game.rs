use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use super::protocol::{Message, MoveKind, Role};
use super::renderer::DuelRenderer;
use super::session::Session;
use super::setup::POOL_SIZE;
use crate::core::game::{Context, Game};

/// Binds a [`Session`] to the terminal: key presses become move submissions,
/// inbound messages go straight to the session.
pub struct DuelGame {
    session: Session,
    selected: MoveKind,
    notice: Option<String>,
}

impl DuelGame {
    pub fn new(role: Role) -> Self {
        Self {
            session: Session::new(role),
            selected: MoveKind::Attack,
            notice: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selected(&self) -> MoveKind {
        self.selected
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

impl Game for DuelGame {
    type Message = Message;

    fn on_connected(&mut self, ctx: &Context<Message>) {
        self.session.on_connected(ctx);
    }

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context<Message>) {
        match event.code {
            KeyCode::Char('a') => self.selected = MoveKind::Attack,
            KeyCode::Char('b') => self.selected = MoveKind::Block,
            KeyCode::Tab => {
                self.selected = match self.selected {
                    MoveKind::Attack => MoveKind::Block,
                    MoveKind::Block => MoveKind::Attack,
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let slot = c as usize - '1' as usize;
                if slot >= POOL_SIZE {
                    return;
                }
                match self.session.submit_move(self.selected, slot, ctx) {
                    Ok(_) => self.notice = None,
                    Err(e) => {
                        debug!(error = %e, "move rejected");
                        self.notice = Some(e.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_network(&mut self, msg: Message, ctx: &Context<Message>) {
        if let Err(e) = self.session.handle_message(msg, ctx) {
            debug!(error = %e, "inbound message did not apply");
        }
    }

    fn on_disconnected(&mut self) {
        self.session.disconnected();
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        DuelRenderer::render(frame, self);
    }
}
