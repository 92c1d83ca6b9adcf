//! Strategy and connection configuration.
//!
//! [`StrategyConfig`] holds the observable tuning surface named in the wire
//! contract (spread threshold, quote edge, quote size, stale-order timeout,
//! canceller tick) plus the instrument traded. Defaults match the values
//! fixed in the contract; callers may override any of them, e.g. for paper
//! trading a different instrument or a wider spread threshold.

use std::time::Duration;

/// How the book mirror is updated on each `book.*` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookUpdateMode {
    /// Clear and rebuild both sides from the notification payload. This is
    /// the behavior preserved from the source system (see design notes on
    /// why this may not suit a `raw` incremental channel).
    #[default]
    Snapshot,
    /// Apply the payload as an incremental diff against the existing
    /// mirror. Not implemented by the strategy yet — reserved so a future
    /// diff-apply mode is a config change, not a silent behavior change.
    Diff,
}

/// Tunable strategy and connection parameters.
///
/// # Example
///
/// ```
/// use deribit_mm::config::StrategyConfig;
///
/// let config = StrategyConfig::default()
///     .instrument("ETH-PERPETUAL")
///     .spread_threshold(5.0);
/// assert_eq!(config.instrument, "ETH-PERPETUAL");
/// ```
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Instrument traded by the strategy (default `BTC-PERPETUAL`).
    pub instrument: String,
    /// Currency used for the positions snapshot request (default `BTC`).
    pub currency: String,
    /// Minimum ask-minus-bid spread that triggers quoting.
    pub spread_threshold: f64,
    /// Price improvement applied to best bid/ask when quoting.
    pub edge: f64,
    /// Quote size on each side.
    pub size: f64,
    /// Age at which an open order is considered stale and cancelled.
    pub stale_after: Duration,
    /// Stale-order canceller wake interval.
    pub tick: Duration,
    /// Book update application mode.
    pub book_update_mode: BookUpdateMode,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            instrument: "BTC-PERPETUAL".to_owned(),
            currency: "BTC".to_owned(),
            spread_threshold: 10.0,
            edge: 0.5,
            size: 10.0,
            stale_after: Duration::from_secs(5),
            tick: Duration::from_secs(1),
            book_update_mode: BookUpdateMode::Snapshot,
        }
    }
}

impl StrategyConfig {
    /// Override the traded instrument.
    pub fn instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instrument = instrument.into();
        self
    }

    /// Override the positions currency.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Override the quoting spread threshold.
    pub fn spread_threshold(mut self, threshold: f64) -> Self {
        self.spread_threshold = threshold;
        self
    }

    /// Override the quote edge.
    pub fn edge(mut self, edge: f64) -> Self {
        self.edge = edge;
        self
    }

    /// Override the quote size.
    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Override the stale-order timeout.
    pub fn stale_after(mut self, duration: Duration) -> Self {
        self.stale_after = duration;
        self
    }

    /// Override the canceller tick interval.
    pub fn tick(mut self, duration: Duration) -> Self {
        self.tick = duration;
        self
    }

    /// Public book channel name for the configured instrument.
    pub fn public_book_channel(&self) -> String {
        format!("book.{}.raw", self.instrument)
    }

    /// Private order-update channel name for the configured instrument.
    pub fn private_orders_channel(&self) -> String {
        format!("user.orders.{}.raw", self.instrument)
    }
}
