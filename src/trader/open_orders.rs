//! The open-order set the stale-order canceller sweeps (spec §5, §8.3).
//!
//! Kept under its own lock, separate from `Api`'s book/session/positions
//! locks, so the canceller never contends with message routing while it
//! decides what to cancel.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy)]
pub struct OpenOrder {
    pub opened_at: Instant,
}

/// The set of orders believed open, keyed by order id.
#[derive(Default)]
pub struct OpenOrders {
    entries: Mutex<std::collections::HashMap<String, OpenOrder>>,
}

impl OpenOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order_id: String) {
        self.entries.lock().insert(order_id, OpenOrder { opened_at: Instant::now() });
    }

    pub fn remove(&self, order_id: &str) {
        self.entries.lock().remove(order_id);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns the ids whose age exceeds `stale_after`, without holding the
    /// lock while the caller cancels them (spec §8.3: "partition under the
    /// lock, then act outside it").
    pub fn stale_ids(&self, stale_after: Duration) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .lock()
            .iter()
            .filter(|(_, order)| now.duration_since(order.opened_at) >= stale_after)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ids_only_returns_orders_past_the_threshold() {
        let orders = OpenOrders::new();
        orders.insert("fresh".to_owned());
        assert!(orders.stale_ids(Duration::from_secs(0)).contains(&"fresh".to_owned()));
        assert!(!orders.stale_ids(Duration::from_secs(60)).contains(&"fresh".to_owned()));
    }

    #[test]
    fn remove_drops_the_entry() {
        let orders = OpenOrders::new();
        orders.insert("a".to_owned());
        assert_eq!(orders.len(), 1);
        orders.remove("a");
        assert!(orders.is_empty());
    }
}
