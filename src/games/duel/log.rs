use std::collections::VecDeque;

/// Round counter plus the human-readable battle log, newest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BattleLog {
    round: u32,
    entries: VecDeque<String>,
}

impl BattleLog {
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn advance_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    pub fn prepend(&mut self, line: impl Into<String>) {
        self.entries.push_front(line.into());
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
