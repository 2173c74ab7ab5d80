//! Bounded conversation history for chat mode.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message, serialized exactly as the chat API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub role: Role,
    pub content: String,
}

impl Record {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

/// Rolling history of user/assistant records behind a fixed system record.
///
/// Holds at most `2 * max_exchanges` records besides the system record. When
/// a push exceeds the bound, the oldest records are dropped in pairs so the
/// remaining history still starts on a user turn.
pub struct History {
    system: Record,
    records: VecDeque<Record>,
    max_exchanges: usize,
}

impl History {
    pub fn new(system_context: &str, max_exchanges: usize) -> Self {
        Self {
            system: Record::new(Role::System, system_context),
            records: VecDeque::new(),
            max_exchanges: max_exchanges.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_exchanges * 2
    }

    /// Number of records, excluding the system record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, role: Role, content: &str) {
        self.records.push_back(Record::new(role, content));
        while self.records.len() > self.capacity() {
            let drop = self.records.len().min(2);
            self.records.drain(..drop);
        }
    }

    /// Record a completed exchange.
    pub fn commit(&mut self, question: &str, answer: &str) {
        self.push(Role::User, question);
        self.push(Role::Assistant, answer);
    }

    /// Messages for a request that ends with `turn`, without storing it.
    ///
    /// The oldest exchanges are skipped exactly as `push` would drop them,
    /// so the request never carries more than `capacity()` history records.
    pub fn with_turn<'a>(&'a self, turn: &'a Record) -> Vec<&'a Record> {
        let mut skip = 0;
        while self.records.len() - skip + 1 > self.capacity() {
            skip += (self.records.len() - skip).min(2);
        }
        std::iter::once(&self.system)
            .chain(self.records.iter().skip(skip))
            .chain(std::iter::once(turn))
            .collect()
    }

    /// System record followed by history, oldest first.
    pub fn messages(&self) -> Vec<&Record> {
        std::iter::once(&self.system).chain(self.records.iter()).collect()
    }
}
