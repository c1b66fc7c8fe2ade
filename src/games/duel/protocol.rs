//! Wire messages exchanged between the two duel peers.
//!
//! Every message is a JSON record carrying a `type` discriminator. Only the
//! host sends `init`, `health_update` and `log_entry`; both sides send
//! `move_submitted` once per round.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::setup::POOL_SIZE;

/// Which side of the session a peer plays. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    pub fn opponent(self) -> Self {
        match self {
            Role::Host => Role::Guest,
            Role::Guest => Role::Host,
        }
    }

    pub fn is_host(self) -> bool {
        self == Role::Host
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Guest => write!(f, "guest"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Attack,
    Block,
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveKind::Attack => write!(f, "attack"),
            MoveKind::Block => write!(f, "block"),
        }
    }
}

/// A single submitted move. The value was drawn from a pool slot that is now spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub kind: MoveKind,
    pub value: u8,
    pub submitter: Role,
}

impl Move {
    pub fn attack(value: u8, submitter: Role) -> Self {
        Self { kind: MoveKind::Attack, value, submitter }
    }

    pub fn block(value: u8, submitter: Role) -> Self {
        Self { kind: MoveKind::Block, value, submitter }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Host -> guest, once, right after the channel opens.
    Init {
        health: i32,
        attacks: [u8; POOL_SIZE],
        blocks: [u8; POOL_SIZE],
    },
    /// Either peer, once per round.
    MoveSubmitted {
        kind: MoveKind,
        value: u8,
        submitter: Role,
    },
    /// Host -> guest, once per round, right after resolution.
    HealthUpdate { host_health: i32, guest_health: i32 },
    /// Host -> guest, once per round, alongside the health update.
    LogEntry { text: String },
    /// Any tag this build does not know about.
    #[serde(other)]
    Unknown,
}

impl From<Move> for Message {
    fn from(mv: Move) -> Self {
        Message::MoveSubmitted {
            kind: mv.kind,
            value: mv.value,
            submitter: mv.submitter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn move_submitted_carries_type_tag() {
        let msg = Message::from(Move::attack(3, Role::Guest));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"type": "move_submitted", "kind": "attack", "value": 3, "submitter": "guest"})
        );
    }

    #[test]
    fn health_update_field_names() {
        let msg = Message::HealthUpdate { host_health: 10, guest_health: -2 };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"type": "health_update", "host_health": 10, "guest_health": -2})
        );
    }

    #[test]
    fn decodes_init_record() {
        let raw = r#"{"type":"init","health":12,"attacks":[1,2,3,4,5],"blocks":[5,4,3,2,1]}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(
            msg,
            Message::Init { health: 12, attacks: [1, 2, 3, 4, 5], blocks: [5, 4, 3, 2, 1] }
        );
    }

    #[test]
    fn init_with_short_pool_is_rejected() {
        let raw = r#"{"type":"init","health":12,"attacks":[1,2,3],"blocks":[5,4,3,2,1]}"#;
        assert!(serde_json::from_str::<Message>(raw).is_err());
    }

    #[test]
    fn unknown_tag_decodes_to_unknown() {
        let raw = r#"{"type":"chat","text":"gg"}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg, Message::Unknown);
    }

    #[test]
    fn role_opponent_flips() {
        assert_eq!(Role::Host.opponent(), Role::Guest);
        assert_eq!(Role::Guest.opponent(), Role::Host);
    }
}
