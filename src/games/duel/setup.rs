use rand::Rng;
use std::ops::RangeInclusive;

use super::protocol::Message;

pub const POOL_SIZE: usize = 5;
pub const HEALTH_RANGE: RangeInclusive<i32> = 10..=15;
pub const MOVE_VALUE_RANGE: RangeInclusive<u8> = 1..=5;

/// Starting conditions rolled by the host and mirrored verbatim by the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSetup {
    pub health: i32,
    pub attacks: [u8; POOL_SIZE],
    pub blocks: [u8; POOL_SIZE],
}

impl GameSetup {
    /// The only place randomness enters a session.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let health = rng.random_range(HEALTH_RANGE);
        let attacks = std::array::from_fn(|_| rng.random_range(MOVE_VALUE_RANGE));
        let blocks = std::array::from_fn(|_| rng.random_range(MOVE_VALUE_RANGE));
        Self { health, attacks, blocks }
    }
}

impl From<GameSetup> for Message {
    fn from(setup: GameSetup) -> Self {
        Message::Init {
            health: setup.health,
            attacks: setup.attacks,
            blocks: setup.blocks,
        }
    }
}
