/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use crate::order::Side;
use crate::price::Price;
use serde::{Deserialize, Serialize};

/// A single execution between an incoming order and a resting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution price.
    pub price: Price,
    /// Quantity exchanged.
    pub quantity: u64,
}

/// What changed about a price level as a result of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateAction {
    /// New displayed liquidity appeared at this price.
    Add,
    /// The aggregate displayed quantity at this price changed.
    Modify,
    /// The price level no longer has any displayed liquidity.
    Delete,
}

/// One price-level entry within a [`DepthUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdateInfo {
    /// The affected price.
    pub price: Price,
    /// The resulting aggregate displayed quantity at `price` (absolute,
    /// not a delta); `0` for a `Delete`.
    pub quantity: u64,
    /// What kind of change this is.
    pub action: UpdateAction,
}

/// A batch of price-level changes for one instrument, split by side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepthUpdate {
    /// Changes on the bid side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bid: Vec<OrderUpdateInfo>,
    /// Changes on the ask side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ask: Vec<OrderUpdateInfo>,
}

impl DepthUpdate {
    /// A depth update carrying a single entry on `side`.
    pub fn single(side: Side, entry: OrderUpdateInfo) -> Self {
        let mut update = DepthUpdate::default();
        match side {
            Side::Bid => update.bid.push(entry),
            Side::Ask => update.ask.push(entry),
        }
        update
    }

    /// Whether both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.bid.is_empty() && self.ask.is_empty()
    }

    /// Merges `other` into `self` in place, per the coalescing rule of
    /// §4.6: callers only invoke this once they've established the two
    /// updates concern distinct, non-overlapping sides.
    pub fn merge(&mut self, other: DepthUpdate) {
        self.bid.extend(other.bid);
        self.ask.extend(other.ask);
    }
}

/// One price/quantity pair within a [`MarketSnap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price.
    pub price: Price,
    /// Aggregate displayed quantity at `price`.
    pub quantity: u64,
}

/// A full snapshot of one (symbol, side) book's displayed price levels,
/// emitted only when a session opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnap {
    /// Instrument symbol.
    pub symbol: String,
    /// Which side this snapshot describes.
    pub side: Side,
    /// Price levels, ordered best-to-worst for the book's side.
    pub levels: Vec<PriceLevel>,
}

/// Anything the engine can emit in response to a command or session
/// transition. Internally tagged on `"type"`, so each inner struct stays a
/// plain field bag and the discriminant lives on the wrapper instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An execution.
    #[serde(rename = "TRADE")]
    Trade(Trade),
    /// A batch of price-level changes.
    #[serde(rename = "DEPTH_UPDATE")]
    Depth(DepthUpdate),
    /// A full book snapshot, emitted at market open.
    #[serde(rename = "MARKET_SNAP")]
    Snapshot(MarketSnap),
}
