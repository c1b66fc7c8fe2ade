//! Host-only combat resolution.
//!
//! Everything here is computed from the host's frame of reference: the host's
//! move is "mine", the guest's move is the opponent's. Health is never clamped
//! to a range, but arithmetic saturates at the `i32` bounds.

use std::fmt;

use super::protocol::{Move, MoveKind};

/// Outcome of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub host_health: i32,
    pub guest_health: i32,
}

impl Resolution {
    pub fn standing(&self) -> Standing {
        Standing::between(self.host_health, self.guest_health)
    }
}

/// Who is ahead after a round, named the way the host's log names players:
/// the host is always Player1, the guest Player2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    HostLeading(u32),
    GuestLeading(u32),
    Tied,
}

impl Standing {
    pub fn between(host_health: i32, guest_health: i32) -> Self {
        match host_health.cmp(&guest_health) {
            std::cmp::Ordering::Greater => Standing::HostLeading(host_health.abs_diff(guest_health)),
            std::cmp::Ordering::Less => Standing::GuestLeading(host_health.abs_diff(guest_health)),
            std::cmp::Ordering::Equal => Standing::Tied,
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Standing::HostLeading(diff) => write!(f, "Player1 leading by {diff}"),
            Standing::GuestLeading(diff) => write!(f, "Player2 leading by {diff}"),
            Standing::Tied => write!(f, "Score tied"),
        }
    }
}

/// Applies one pair of moves.
///
/// Attack into block subtracts the attacker's value and then adds the
/// blocker's value back to the blocker's health.
pub fn resolve(host_move: Move, guest_move: Move, host_health: i32, guest_health: i32) -> Resolution {
    let mine = i32::from(host_move.value);
    let theirs = i32::from(guest_move.value);

    let (host_health, guest_health) = match (host_move.kind, guest_move.kind) {
        (MoveKind::Attack, MoveKind::Attack) => {
            (host_health.saturating_sub(theirs), guest_health.saturating_sub(mine))
        }
        (MoveKind::Attack, MoveKind::Block) => {
            (host_health, guest_health.saturating_sub(mine).saturating_add(theirs))
        }
        (MoveKind::Block, MoveKind::Attack) => {
            (host_health.saturating_sub(theirs).saturating_add(mine), guest_health)
        }
        (MoveKind::Block, MoveKind::Block) => (host_health, guest_health),
    };

    Resolution { host_health, guest_health }
}

/// Log line for the given round, e.g. `Round 3: Player2 leading by 1`.
pub fn round_line(round: u32, standing: Standing) -> String {
    format!("Round {round}: {standing}")
}
