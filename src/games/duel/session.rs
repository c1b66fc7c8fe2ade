//! Per-peer session state machine.
//!
//! ```text
//! AwaitingConnection -> AwaitingInit (guest only) -> ReadyForMove
//! ReadyForMove -> MoveSubmittedWaiting -> Resolving (host only) -> ReadyForMove
//! ```
//!
//! The host's session is the single source of truth for health. The guest
//! mirrors it and only ever overwrites its copy from a `HealthUpdate`.

use std::fmt;
use tracing::{debug, info};

use super::error::DuelError;
use super::log::BattleLog;
use super::pool::MovePool;
use super::protocol::{Message, Move, MoveKind, Role};
use super::resolve::{resolve, round_line};
use super::setup::{GameSetup, POOL_SIZE};
use crate::core::game::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingConnection,
    /// Connected guest waiting for the host's `Init`.
    AwaitingInit,
    ReadyForMove,
    MoveSubmittedWaiting,
    /// Host only, for the duration of one resolution.
    Resolving,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Phase::AwaitingConnection => "awaiting connection",
            Phase::AwaitingInit => "awaiting game setup",
            Phase::ReadyForMove => "ready for a move",
            Phase::MoveSubmittedWaiting => "waiting for the opponent",
            Phase::Resolving => "resolving the round",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    role: Role,
    phase: Phase,
    local_health: i32,
    remote_health: i32,
    max_health: i32,
    attacks: MovePool,
    blocks: MovePool,
    pending_local: Option<Move>,
    pending_remote: Option<Move>,
    log: BattleLog,
    initialized: bool,
    status: String,
}

impl Session {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            phase: Phase::AwaitingConnection,
            local_health: 0,
            remote_health: 0,
            max_health: 0,
            attacks: MovePool::undealt(MoveKind::Attack),
            blocks: MovePool::undealt(MoveKind::Block),
            pending_local: None,
            pending_remote: None,
            log: BattleLog::default(),
            initialized: false,
            status: "Waiting for connection...".to_string(),
        }
    }

    /// The transport reported the channel usable. The host rolls and sends
    /// the game setup; the guest starts waiting for it.
    pub fn on_connected(&mut self, ctx: &Context<Message>) {
        if self.phase != Phase::AwaitingConnection {
            return;
        }
        self.status = "Connected! Syncing game...".to_string();
        match self.role {
            Role::Host => self.start_with(GameSetup::roll(&mut rand::rng()), ctx),
            Role::Guest => self.phase = Phase::AwaitingInit,
        }
    }

    /// Host side of initialization with a given setup.
    pub fn start_with(&mut self, setup: GameSetup, ctx: &Context<Message>) {
        if !self.role.is_host() || self.initialized {
            return;
        }
        self.apply_setup(setup);
        info!(health = setup.health, attacks = ?setup.attacks, blocks = ?setup.blocks, "game initialized");
        ctx.send_network_event(setup.into());
    }

    fn apply_setup(&mut self, setup: GameSetup) {
        self.max_health = setup.health;
        self.local_health = setup.health;
        self.remote_health = setup.health;
        self.attacks = MovePool::new(MoveKind::Attack, setup.attacks);
        self.blocks = MovePool::new(MoveKind::Block, setup.blocks);
        self.initialized = true;
        self.phase = Phase::ReadyForMove;
        self.status = "Game started! Choose your move.".to_string();
    }

    /// Spends the given pool slot and sends the move to the peer.
    pub fn submit_move(
        &mut self,
        kind: MoveKind,
        slot: usize,
        ctx: &Context<Message>,
    ) -> Result<Move, DuelError> {
        if self.pending_local.is_some() {
            return Err(DuelError::MoveAlreadyPending);
        }
        if self.phase != Phase::ReadyForMove {
            return Err(DuelError::NotAcceptingMoves(self.phase));
        }
        let value = self.pool_mut(kind).take(slot)?;
        let mv = Move { kind, value, submitter: self.role };

        self.pending_local = Some(mv);
        self.phase = Phase::MoveSubmittedWaiting;
        self.status = "Move sent. Waiting for opponent...".to_string();
        debug!(%kind, value, slot, "move submitted");
        ctx.send_network_event(mv.into());

        self.try_resolve(ctx);
        Ok(mv)
    }

    /// Dispatches one inbound message.
    pub fn handle_message(&mut self, msg: Message, ctx: &Context<Message>) -> Result<(), DuelError> {
        match msg {
            Message::Init { health, attacks, blocks } => self.on_init(GameSetup { health, attacks, blocks }),
            Message::MoveSubmitted { kind, value, submitter } => {
                self.on_remote_move(Move { kind, value, submitter }, ctx)
            }
            Message::HealthUpdate { host_health, guest_health } => {
                self.on_health_update(host_health, guest_health);
                Ok(())
            }
            Message::LogEntry { text } => {
                if self.role.is_host() {
                    return Err(DuelError::IgnoredMessage("log entry sent to the host"));
                }
                self.log.prepend(text);
                Ok(())
            }
            Message::Unknown => Err(DuelError::IgnoredMessage("unrecognized message type")),
        }
    }

    fn on_init(&mut self, setup: GameSetup) -> Result<(), DuelError> {
        if self.role.is_host() {
            return Err(DuelError::IgnoredMessage("init sent to the host"));
        }
        if self.initialized {
            return Err(DuelError::IgnoredMessage("duplicate init"));
        }
        self.apply_setup(setup);
        info!(health = setup.health, "received game setup from host");
        Ok(())
    }

    fn on_remote_move(&mut self, mv: Move, ctx: &Context<Message>) -> Result<(), DuelError> {
        if mv.submitter != self.role.opponent() {
            return Err(DuelError::IgnoredMessage("move not submitted by the opponent"));
        }
        if self.pending_remote.is_some() {
            return Err(DuelError::IgnoredMessage("opponent already moved this round"));
        }
        self.pending_remote = Some(mv);
        if self.pending_local.is_none() {
            self.status = "Opponent has moved. Choose your move.".to_string();
        }
        self.try_resolve(ctx);
        Ok(())
    }

    /// Only the host ever acts on both moves being known.
    fn try_resolve(&mut self, ctx: &Context<Message>) {
        if !self.role.is_host() {
            return;
        }
        let (Some(mine), Some(theirs)) = (self.pending_local, self.pending_remote) else {
            return;
        };

        self.phase = Phase::Resolving;
        let outcome = resolve(mine, theirs, self.local_health, self.remote_health);
        ctx.send_network_event(Message::HealthUpdate {
            host_health: outcome.host_health,
            guest_health: outcome.guest_health,
        });

        let round = self.log.advance_round();
        let line = round_line(round, outcome.standing());
        ctx.send_network_event(Message::LogEntry { text: line.clone() });
        info!(round, host = outcome.host_health, guest = outcome.guest_health, "{line}");
        self.log.prepend(line);

        self.local_health = outcome.host_health;
        self.remote_health = outcome.guest_health;
        self.end_round();
    }

    fn on_health_update(&mut self, host_health: i32, guest_health: i32) {
        let (local, remote) = match self.role {
            Role::Host => (host_health, guest_health),
            Role::Guest => (guest_health, host_health),
        };
        self.local_health = local;
        self.remote_health = remote;
        if !self.role.is_host() && self.initialized {
            // One health update per host resolution keeps both round counters equal.
            self.log.advance_round();
        }
        self.end_round();
    }

    fn end_round(&mut self) {
        self.pending_local = None;
        self.pending_remote = None;
        if self.initialized {
            self.phase = Phase::ReadyForMove;
            self.status = if self.has_moves_left() {
                format!("Round {} done. Choose your move.", self.log.round())
            } else {
                "No moves left.".to_string()
            };
        }
    }

    fn pool_mut(&mut self, kind: MoveKind) -> &mut MovePool {
        match kind {
            MoveKind::Attack => &mut self.attacks,
            MoveKind::Block => &mut self.blocks,
        }
    }

    pub fn pool(&self, kind: MoveKind) -> &MovePool {
        match kind {
            MoveKind::Attack => &self.attacks,
            MoveKind::Block => &self.blocks,
        }
    }

    pub fn has_moves_left(&self) -> bool {
        self.attacks.has_unused() || self.blocks.has_unused()
    }

    /// Marks the session as cut off from its peer.
    pub fn disconnected(&mut self) {
        self.status = "Opponent disconnected.".to_string();
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn local_health(&self) -> i32 {
        self.local_health
    }

    pub fn remote_health(&self) -> i32 {
        self.remote_health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn pending_local(&self) -> Option<Move> {
        self.pending_local
    }

    pub fn pending_remote(&self) -> Option<Move> {
        self.pending_remote
    }

    pub fn round(&self) -> u32 {
        self.log.round()
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn pool_values(&self, kind: MoveKind) -> [u8; POOL_SIZE] {
        self.pool(kind).values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn outbox() -> (Context<Message>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Context::new(tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Message> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    const SETUP: GameSetup = GameSetup { health: 12, attacks: [3, 2, 5, 1, 4], blocks: [4, 1, 2, 5, 3] };

    #[test]
    fn host_connect_sends_init_once() {
        let (ctx, mut rx) = outbox();
        let mut host = Session::new(Role::Host);
        host.on_connected(&ctx);
        host.on_connected(&ctx);

        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 1);
        let Message::Init { health, .. } = sent[0] else {
            panic!("expected init, got {:?}", sent[0]);
        };
        assert_eq!(host.phase(), Phase::ReadyForMove);
        assert_eq!(host.local_health(), health);
        assert_eq!(host.remote_health(), health);
        assert_eq!(host.max_health(), health);
    }

    #[test]
    fn guest_waits_for_init() {
        let (ctx, mut rx) = outbox();
        let mut guest = Session::new(Role::Guest);
        guest.on_connected(&ctx);
        assert_eq!(guest.phase(), Phase::AwaitingInit);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(
            guest.submit_move(MoveKind::Attack, 0, &ctx),
            Err(DuelError::NotAcceptingMoves(Phase::AwaitingInit))
        );

        guest.handle_message(SETUP.into(), &ctx).unwrap();
        assert_eq!(guest.phase(), Phase::ReadyForMove);
        assert_eq!(guest.pool_values(MoveKind::Attack), SETUP.attacks);
        assert_eq!(guest.pool_values(MoveKind::Block), SETUP.blocks);
        assert_eq!(guest.local_health(), 12);
    }

    #[test]
    fn second_init_does_not_reset_round() {
        let (ctx, _rx) = outbox();
        let mut guest = Session::new(Role::Guest);
        guest.on_connected(&ctx);
        guest.handle_message(SETUP.into(), &ctx).unwrap();
        guest.submit_move(MoveKind::Attack, 0, &ctx).unwrap();

        let replay = GameSetup { health: 15, attacks: [5; POOL_SIZE], blocks: [5; POOL_SIZE] };
        assert_eq!(
            guest.handle_message(replay.into(), &ctx),
            Err(DuelError::IgnoredMessage("duplicate init"))
        );
        assert_eq!(guest.phase(), Phase::MoveSubmittedWaiting);
        assert!(guest.pool(MoveKind::Attack).is_used(0));
        assert_eq!(guest.local_health(), 12);
    }

    #[test]
    fn resubmission_while_pending_is_a_no_op() {
        let (ctx, mut rx) = outbox();
        let mut host = Session::new(Role::Host);
        host.start_with(SETUP, &ctx);
        drain(&mut rx);

        host.submit_move(MoveKind::Attack, 0, &ctx).unwrap();
        assert_eq!(host.submit_move(MoveKind::Block, 1, &ctx), Err(DuelError::MoveAlreadyPending));
        assert_eq!(drain(&mut rx).len(), 1);
        assert!(!host.pool(MoveKind::Block).is_used(1));
    }

    #[test]
    fn used_slot_stays_excluded_across_rounds() {
        let (ctx, mut rx) = outbox();
        let mut host = Session::new(Role::Host);
        host.start_with(SETUP, &ctx);

        host.submit_move(MoveKind::Attack, 2, &ctx).unwrap();
        host.handle_message(Move::block(1, Role::Guest).into(), &ctx).unwrap();
        assert_eq!(host.phase(), Phase::ReadyForMove);

        for _ in 0..3 {
            assert_eq!(
                host.submit_move(MoveKind::Attack, 2, &ctx),
                Err(DuelError::SlotUsed { kind: MoveKind::Attack, slot: 2 })
            );
        }
        assert_eq!(host.phase(), Phase::ReadyForMove);
        drain(&mut rx);
    }

    #[test]
    fn host_resolves_when_guest_moves_first() {
        let (ctx, mut rx) = outbox();
        let mut host = Session::new(Role::Host);
        host.start_with(SETUP, &ctx);
        drain(&mut rx);

        host.handle_message(Move::attack(2, Role::Guest).into(), &ctx).unwrap();
        assert_eq!(host.phase(), Phase::ReadyForMove);
        assert_eq!(host.pending_remote(), Some(Move::attack(2, Role::Guest)));

        host.submit_move(MoveKind::Attack, 0, &ctx).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![
                Message::from(Move::attack(3, Role::Host)),
                Message::HealthUpdate { host_health: 10, guest_health: 9 },
                Message::LogEntry { text: "Round 1: Player1 leading by 1".to_string() },
            ]
        );
        assert_eq!(host.round(), 1);
        assert_eq!(host.pending_local(), None);
        assert_eq!(host.pending_remote(), None);
        assert_eq!(host.log().latest(), Some("Round 1: Player1 leading by 1"));
    }

    #[test]
    fn guest_never_resolves() {
        let (ctx, mut rx) = outbox();
        let mut guest = Session::new(Role::Guest);
        guest.on_connected(&ctx);
        guest.handle_message(SETUP.into(), &ctx).unwrap();

        guest.submit_move(MoveKind::Attack, 0, &ctx).unwrap();
        guest.handle_message(Move::attack(5, Role::Host).into(), &ctx).unwrap();

        assert_eq!(guest.phase(), Phase::MoveSubmittedWaiting);
        assert_eq!(guest.round(), 0);
        assert_eq!(guest.local_health(), 12);
        assert_eq!(drain(&mut rx), vec![Message::from(Move::attack(3, Role::Guest))]);
    }

    #[test]
    fn health_update_maps_through_role() {
        let (ctx, _rx) = outbox();
        let mut guest = Session::new(Role::Guest);
        guest.on_connected(&ctx);
        guest.handle_message(SETUP.into(), &ctx).unwrap();
        guest.submit_move(MoveKind::Block, 0, &ctx).unwrap();

        guest
            .handle_message(Message::HealthUpdate { host_health: 11, guest_health: -1 }, &ctx)
            .unwrap();
        assert_eq!(guest.local_health(), -1);
        assert_eq!(guest.remote_health(), 11);
        assert_eq!(guest.phase(), Phase::ReadyForMove);
        assert_eq!(guest.pending_local(), None);
        assert_eq!(guest.round(), 1);
    }

    #[test]
    fn stray_health_update_before_init_does_not_count_a_round() {
        let (ctx, _rx) = outbox();
        let mut guest = Session::new(Role::Guest);
        guest.on_connected(&ctx);

        guest
            .handle_message(Message::HealthUpdate { host_health: 3, guest_health: 4 }, &ctx)
            .unwrap();
        assert_eq!(guest.round(), 0);
        assert_eq!(guest.phase(), Phase::AwaitingInit);

        guest.handle_message(SETUP.into(), &ctx).unwrap();
        assert_eq!(guest.local_health(), 12);
        assert_eq!(guest.round(), 0);
    }

    #[test]
    fn hostile_health_update_cannot_overflow_the_host() {
        let (ctx, mut rx) = outbox();
        let mut host = Session::new(Role::Host);
        host.start_with(GameSetup { health: 12, attacks: [1; POOL_SIZE], blocks: [1; POOL_SIZE] }, &ctx);
        drain(&mut rx);

        host.handle_message(Message::HealthUpdate { host_health: i32::MIN, guest_health: i32::MAX }, &ctx)
            .unwrap();
        host.submit_move(MoveKind::Attack, 0, &ctx).unwrap();
        host.handle_message(Move::attack(5, Role::Guest).into(), &ctx).unwrap();

        assert_eq!(host.local_health(), i32::MIN);
        assert_eq!(host.remote_health(), i32::MAX - 1);
        assert_eq!(host.round(), 1);
        assert_eq!(
            host.log().latest(),
            Some(format!("Round 1: Player2 leading by {}", u32::MAX - 1).as_str())
        );
        assert_eq!(host.phase(), Phase::ReadyForMove);
    }

    #[test]
    fn foreign_and_unknown_messages_are_ignored() {
        let (ctx, _rx) = outbox();
        let mut host = Session::new(Role::Host);
        host.start_with(SETUP, &ctx);

        assert!(matches!(host.handle_message(Message::Unknown, &ctx), Err(DuelError::IgnoredMessage(_))));
        assert!(matches!(
            host.handle_message(Move::attack(1, Role::Host).into(), &ctx),
            Err(DuelError::IgnoredMessage(_))
        ));
        assert!(matches!(host.handle_message(SETUP.into(), &ctx), Err(DuelError::IgnoredMessage(_))));

        host.handle_message(Move::block(2, Role::Guest).into(), &ctx).unwrap();
        assert_eq!(
            host.handle_message(Move::attack(4, Role::Guest).into(), &ctx),
            Err(DuelError::IgnoredMessage("opponent already moved this round"))
        );
        assert_eq!(host.pending_remote(), Some(Move::block(2, Role::Guest)));
    }

    #[test]
    fn reports_exhausted_pools() {
        let (ctx, _rx) = outbox();
        let mut host = Session::new(Role::Host);
        host.start_with(SETUP, &ctx);
        for kind in [MoveKind::Attack, MoveKind::Block] {
            for slot in 0..POOL_SIZE {
                host.submit_move(kind, slot, &ctx).unwrap();
                host.handle_message(Move::block(1, Role::Guest).into(), &ctx).unwrap();
            }
        }
        assert!(!host.has_moves_left());
        assert_eq!(host.status(), "No moves left.");
        assert_eq!(host.round(), 2 * POOL_SIZE as u32);
    }
}
