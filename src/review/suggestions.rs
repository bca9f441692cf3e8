/*!
 * Bookkeeping for improvement suggestions fetched while a session is open.
 *
 * A suggestion request is described by a ticket that snapshots the line's
 * translation at request time. The reply is only kept if the line still holds
 * that text when it arrives.
 */

use std::collections::HashMap;

/// An outstanding suggestion request for one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionTicket {
    /// Line ID
    pub id: u32,
    /// Source text to send along with the request
    pub source_text: String,
    /// Translation at the time of the request
    pub snapshot: String,
}

/// What happened to a received suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// Stored as the pending suggestion for its line
    Stored,
    /// The line was edited after the request; the reply was discarded
    Stale,
    /// The line no longer exists in the session
    UnknownItem,
}

/// At most one pending suggestion per line ID
#[derive(Debug, Clone, Default)]
pub struct PendingSuggestions {
    pending: HashMap<u32, String>,
}

impl PendingSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a suggestion, replacing any older one for the same line
    pub fn insert(&mut self, id: u32, text: String) {
        self.pending.insert(id, text);
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.pending.get(&id).map(String::as_str)
    }

    pub fn take(&mut self, id: u32) -> Option<String> {
        self.pending.remove(&id)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending line IDs in ascending order
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.pending.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
