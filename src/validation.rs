/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use crate::price::Price;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Classification of an order's quantity relative to the lot step active
/// at its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotType {
    /// Quantity smaller than one lot.
    OddLot,
    /// Quantity is an exact multiple of the lot step.
    RoundLot,
    /// Quantity is larger than one lot but not an exact multiple.
    MixedLot,
}

/// One half-open price interval `[from, to)` with a rule value attached.
///
/// `to == None` means the interval is open-ended (covers every price at
/// or above `from`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceInterval<T> {
    /// Inclusive lower bound of the interval.
    pub from: Price,
    /// Exclusive upper bound; `None` means unbounded above.
    pub to: Option<Price>,
    /// The rule value (tick size or lot step) active in this interval.
    pub value: T,
}

fn find_interval<'a, T>(intervals: &'a [PriceInterval<T>], price: Price) -> Option<&'a PriceInterval<T>> {
    intervals
        .iter()
        .find(|iv| price >= iv.from && iv.to.map(|to| price < to).unwrap_or(true))
}

/// Tick-size rules: the minimum admissible price increment, by price
/// band.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TickSizeRules {
    intervals: Vec<PriceInterval<i64>>,
}

impl TickSizeRules {
    /// Builds a rule set from explicit intervals.
    pub fn new(intervals: Vec<PriceInterval<i64>>) -> Self {
        Self { intervals }
    }

    /// Whether `price` sits on a valid tick for its price band.
    ///
    /// An empty rule set is permissive (always valid). A non-empty rule
    /// set with no matching interval yields `false` — callers surface
    /// this as `NoRuleForPrice`.
    pub fn is_valid(&self, price: Price) -> Result<bool, NoRuleForPrice> {
        if self.intervals.is_empty() {
            return Ok(true);
        }
        match find_interval(&self.intervals, price) {
            Some(iv) => Ok(iv.value > 0 && price.unscaled() % iv.value == 0),
            None => Err(NoRuleForPrice(price)),
        }
    }
}

/// Lot-size rules: the quantity step size, by price band.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LotSizeRules {
    intervals: Vec<PriceInterval<u64>>,
}

impl LotSizeRules {
    /// Builds a rule set from explicit intervals.
    pub fn new(intervals: Vec<PriceInterval<u64>>) -> Self {
        Self { intervals }
    }

    /// Classifies `quantity` at `price` as odd/round/mixed lot.
    ///
    /// An empty rule set always classifies as `RoundLot`.
    pub fn classify(&self, price: Price, quantity: u64) -> Result<LotType, NoRuleForPrice> {
        if self.intervals.is_empty() {
            return Ok(LotType::RoundLot);
        }
        let step = find_interval(&self.intervals, price)
            .ok_or(NoRuleForPrice(price))?
            .value;
        if step == 0 {
            return Ok(LotType::RoundLot);
        }
        Ok(if quantity < step {
            LotType::OddLot
        } else if quantity % step == 0 {
            LotType::RoundLot
        } else {
            LotType::MixedLot
        })
    }
}

/// The finite whitelist of instruments the engine will accept orders for.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SymbolSet {
    symbols: HashSet<String>,
}

impl SymbolSet {
    /// Builds a whitelist from an iterable of symbols.
    pub fn new(symbols: impl IntoIterator<Item = String>) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
        }
    }

    /// Whether `symbol` is tradable.
    pub fn is_valid(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }
}

/// Raised when a price falls outside every configured interval of a
/// non-empty rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no rule configured for price {0}")]
pub struct NoRuleForPrice(pub Price);
