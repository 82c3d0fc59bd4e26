//! Convenience re-exports of the crate's public surface.

pub use crate::command::Command;
pub use crate::config::RuleConfig;
pub use crate::error::EngineError;
pub use crate::events::{DepthUpdate, Event, MarketSnap, OrderUpdateInfo, Trade, UpdateAction};
pub use crate::order::{HiddenReserve, NewOrderPayload, Order, OrderCore, OrderId, Side, TimeInForce};
pub use crate::orderbook::{MatchingEngine, OrderBook};
pub use crate::price::{InvalidPrice, Price};
pub use crate::validation::{LotSizeRules, LotType, NoRuleForPrice, PriceInterval, SymbolSet, TickSizeRules};
