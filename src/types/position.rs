use serde::Deserialize;

/// A single instrument position, replaced wholesale by each
/// `get_positions` response (see spec §3 — no incremental position
/// tracking is attempted).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Position {
    #[serde(rename = "instrument_name")]
    pub instrument: String,
    pub size: f64,
    #[serde(default)]
    pub average_price: f64,
}
