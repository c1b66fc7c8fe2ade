use thiserror::Error;

use super::protocol::MoveKind;
use super::session::Phase;

/// Reasons a local action or an inbound message did not advance the session.
/// None of these are fatal; the session state is left exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DuelError {
    #[error("a move is already pending this round")]
    MoveAlreadyPending,
    #[error("moves cannot be submitted while {0}")]
    NotAcceptingMoves(Phase),
    #[error("{kind} slot {slot} is out of range")]
    SlotOutOfRange { kind: MoveKind, slot: usize },
    #[error("{kind} slot {slot} has already been used")]
    SlotUsed { kind: MoveKind, slot: usize },
    #[error("ignored message: {0}")]
    IgnoredMessage(&'static str),
}
