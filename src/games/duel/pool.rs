use super::error::DuelError;
use super::protocol::MoveKind;
use super::setup::POOL_SIZE;

/// Five single-use move values of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePool {
    kind: MoveKind,
    values: [u8; POOL_SIZE],
    used: [bool; POOL_SIZE],
}

impl MovePool {
    pub fn new(kind: MoveKind, values: [u8; POOL_SIZE]) -> Self {
        Self {
            kind,
            values,
            used: [false; POOL_SIZE],
        }
    }

    /// A pool before the setup arrives: every slot already spent.
    pub fn undealt(kind: MoveKind) -> Self {
        Self {
            kind,
            values: [0; POOL_SIZE],
            used: [true; POOL_SIZE],
        }
    }

    /// Spends a slot and returns its value. A spent slot stays spent for the session.
    pub fn take(&mut self, slot: usize) -> Result<u8, DuelError> {
        let kind = self.kind;
        if slot >= POOL_SIZE {
            return Err(DuelError::SlotOutOfRange { kind, slot });
        }
        if self.used[slot] {
            return Err(DuelError::SlotUsed { kind, slot });
        }
        self.used[slot] = true;
        Ok(self.values[slot])
    }

    pub fn is_used(&self, slot: usize) -> bool {
        self.used.get(slot).copied().unwrap_or(true)
    }

    pub fn has_unused(&self) -> bool {
        self.used.iter().any(|used| !used)
    }

    /// `(value, used)` per slot, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (u8, bool)> + '_ {
        self.values.iter().copied().zip(self.used.iter().copied())
    }

    pub fn values(&self) -> [u8; POOL_SIZE] {
        self.values
    }
}
