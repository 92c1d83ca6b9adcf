use std::collections::HashMap;
use std::time::Instant;

use crate::types::RequestKind;

/// One outstanding request: inserted before send, removed on matching
/// response or session teardown. Invariant (spec §8.1): at any instant the
/// set of outstanding ids equals `issued − completed − aborted`, and no
/// entry is removed twice (removal is a `HashMap::remove`, which is
/// naturally idempotent-safe: a double removal just observes `None`).
#[derive(Debug, Clone, Copy)]
pub struct PendingRequest {
    pub id: u32,
    pub kind: RequestKind,
    pub sent_at: Instant,
}

/// The pending-request table, keyed by request id.
#[derive(Debug, Default)]
pub struct PendingTable {
    entries: HashMap<u32, PendingRequest>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, kind: RequestKind, sent_at: Instant) {
        self.entries.insert(id, PendingRequest { id, kind, sent_at });
    }

    /// Remove and return the entry for `id`, if still outstanding.
    pub fn take(&mut self, id: u32) -> Option<PendingRequest> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_removes_exactly_once() {
        let mut table = PendingTable::new();
        table.insert(1, RequestKind::Auth, Instant::now());
        assert!(table.take(1).is_some());
        assert!(table.take(1).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn unknown_id_is_none_not_an_error() {
        let mut table = PendingTable::new();
        assert!(table.take(999).is_none());
    }
}
