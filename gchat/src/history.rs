//! Bounded per-session conversation history.

use std::collections::VecDeque;

use gprovider::{Role, Turn};

/// Builds the fixed preamble: the persona as a system turn, optionally followed by
/// a canned assistant acknowledgement.
pub fn persona_preamble(persona: &str, acknowledgement: Option<&str>) -> Vec<Turn> {
    let mut preamble = vec![Turn::system(persona)];
    if let Some(acknowledgement) = acknowledgement
        && !acknowledgement.trim().is_empty()
    {
        preamble.push(Turn::assistant(acknowledgement));
    }
    preamble
}

/// A fixed preamble followed by a rolling window holding at most `capacity` turns.
///
/// The preamble is never trimmed and is prepended to every snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    preamble: Vec<Turn>,
    rolling: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new(preamble: Vec<Turn>, capacity: usize) -> Self {
        Self {
            preamble,
            rolling: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Pushes `turn` and evicts from the front until the window fits again.
    /// Returns the evicted turns, oldest first.
    pub fn append(&mut self, turn: Turn) -> Vec<Turn> {
        self.rolling.push_back(turn);

        let overflow = self.rolling.len().saturating_sub(self.capacity);
        self.rolling.drain(..overflow).collect()
    }

    /// Point-in-time copy of `preamble ++ rolling`.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.preamble
            .iter()
            .chain(self.rolling.iter())
            .cloned()
            .collect()
    }

    /// Removes the newest turn when it has `expected_role`; otherwise leaves the window alone.
    pub fn remove_last(&mut self, expected_role: Role) -> Option<Turn> {
        match self.rolling.back() {
            Some(last) if last.role() == expected_role => self.rolling.pop_back(),
            _ => None,
        }
    }

    /// Undoes the most recent `append` of an `expected_role` turn, given the turns that
    /// append evicted. Afterwards the window holds exactly what it held before the append.
    pub fn revert_append(&mut self, expected_role: Role, mut evicted: Vec<Turn>) -> Option<Turn> {
        let removed = match self.remove_last(expected_role) {
            Some(turn) => Some(turn),
            // With a zero capacity the appended turn evicted itself.
            None if self.capacity == 0 => evicted.pop(),
            None => None,
        };

        for turn in evicted.into_iter().rev() {
            self.rolling.push_front(turn);
        }

        removed
    }

    pub fn preamble(&self) -> &[Turn] {
        &self.preamble
    }

    pub fn rolling(&self) -> impl ExactSizeIterator<Item = &Turn> {
        self.rolling.iter()
    }

    /// Number of turns in the rolling window; the preamble is not counted.
    pub fn len(&self) -> usize {
        self.rolling.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolling.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
