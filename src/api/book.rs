//! The in-memory top-of-book mirror (spec §3).
//!
//! Bids are kept descending by price, asks ascending, with any level at or
//! below [`crate::constants::LEVEL_EPSILON`] treated as absent. Replacement
//! is whole-sale per notification (snapshot semantics) — see
//! [`crate::config::BookUpdateMode`] and the open question in spec §9.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::codec::Level;
use crate::constants::LEVEL_EPSILON;

/// A plain-data, read-only view of the book handed to the trader. A plain
/// value rather than a generic/templated type (Design Note §9: "strategy
/// code does not need compile-time polymorphism").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookSnapshot {
    /// Descending by price.
    pub bids: Vec<(f64, f64)>,
    /// Ascending by price.
    pub asks: Vec<(f64, f64)>,
}

impl BookSnapshot {
    pub fn best_bid(&self) -> Option<(f64, f64)> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<(f64, f64)> {
        self.asks.first().copied()
    }
}

/// The mutable mirror C3 owns and mutates on the reader thread.
#[derive(Debug, Default)]
pub struct OrderBook {
    bids: BTreeMap<OrderedFloat<f64>, f64>,
    asks: BTreeMap<OrderedFloat<f64>, f64>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear and rebuild both sides from raw `[price, size]` levels,
    /// dropping any level at or below epsilon.
    pub fn replace(&mut self, bids: &[Level], asks: &[Level]) {
        self.bids.clear();
        self.asks.clear();
        for &(price, size) in bids {
            if size > LEVEL_EPSILON {
                self.bids.insert(OrderedFloat(price), size);
            }
        }
        for &(price, size) in asks {
            if size > LEVEL_EPSILON {
                self.asks.insert(OrderedFloat(price), size);
            }
        }
    }

    /// A read-only, ordered snapshot: bids descending, asks ascending.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            bids: self
                .bids
                .iter()
                .rev()
                .map(|(p, s)| (p.0, *s))
                .collect(),
            asks: self.asks.iter().map(|(p, s)| (p.0, *s)).collect(),
        }
    }

    pub fn best_bid(&self) -> Option<(f64, f64)> {
        self.bids.iter().next_back().map(|(p, s)| (p.0, *s))
    }

    pub fn best_ask(&self) -> Option<(f64, f64)> {
        self.asks.iter().next().map(|(p, s)| (p.0, *s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_orders_bids_descending_and_asks_ascending() {
        let mut book = OrderBook::new();
        book.replace(
            &[(100.0, 1.0), (102.0, 2.0), (101.0, 3.0)],
            &[(110.0, 1.0), (108.0, 2.0), (109.0, 3.0)],
        );
        let snap = book.snapshot();
        assert_eq!(snap.bids, vec![(102.0, 2.0), (101.0, 3.0), (100.0, 1.0)]);
        assert_eq!(snap.asks, vec![(108.0, 2.0), (109.0, 3.0), (110.0, 1.0)]);
    }

    #[test]
    fn levels_at_or_below_epsilon_are_absent() {
        let mut book = OrderBook::new();
        book.replace(&[(100.0, 1e-13), (99.0, 1.0)], &[]);
        let snap = book.snapshot();
        assert_eq!(snap.bids, vec![(99.0, 1.0)]);
    }

    #[test]
    fn empty_bids_clears_mirror_without_best_bid() {
        let mut book = OrderBook::new();
        book.replace(&[(100.0, 1.0)], &[(101.0, 1.0)]);
        book.replace(&[], &[(101.0, 1.0)]);
        assert!(book.best_bid().is_none());
        assert_eq!(book.best_ask(), Some((101.0, 1.0)));
    }

    #[test]
    fn best_bid_and_ask_are_first_entries() {
        let mut book = OrderBook::new();
        book.replace(&[(100.0, 1.0), (101.0, 1.0)], &[(105.0, 1.0), (104.0, 1.0)]);
        assert_eq!(book.best_bid(), Some((101.0, 1.0)));
        assert_eq!(book.best_ask(), Some((104.0, 1.0)));
    }
}
