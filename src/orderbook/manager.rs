/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use crate::command::Command;
use crate::error::EngineError;
use crate::events::{DepthUpdate, Event};
use crate::order::{Order, OrderId, Side};
use crate::orderbook::OrderBook;
use crate::session::{read_snapshot, write_snapshot};
use crate::validation::{LotSizeRules, LotType, SymbolSet, TickSizeRules};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Owns every `(symbol, side)` book and the validation rules active for
/// the session, and routes inbound commands to them.
///
/// `MatchingEngine` is fully synchronous: `process` never suspends and
/// there is no interior mutability, so the engine is `!Sync` by
/// construction. Concurrency, if ever added, is left to a caller that
/// partitions work by symbol — see the design notes in the
/// specification.
#[derive(Debug)]
pub struct MatchingEngine {
    books: HashMap<(String, Side), OrderBook>,
    tick_rules: TickSizeRules,
    lot_rules: LotSizeRules,
    symbols: SymbolSet,
    /// Monotonic counter, advanced once per `process` call. `REPLENISH`
    /// carries no `time` field of its own (see §6's field table), so this
    /// is the session clock used to stamp a newly-exposed iceberg child,
    /// preserving price-time priority across replenish events.
    clock: i64,
}

impl MatchingEngine {
    /// Builds an engine with the given validation rules and no resting
    /// liquidity. Books are created lazily on first insertion.
    pub fn new(tick_rules: TickSizeRules, lot_rules: LotSizeRules, symbols: SymbolSet) -> Self {
        Self {
            books: HashMap::new(),
            tick_rules,
            lot_rules,
            symbols,
            clock: 0,
        }
    }

    fn book_mut(&mut self, symbol: &str, side: Side) -> &mut OrderBook {
        self.books
            .entry((symbol.to_string(), side))
            .or_insert_with(|| OrderBook::new(side))
    }

    /// Processes one command, returning the events it produced. Commands
    /// rejected by validation, or that reference an unknown order id,
    /// produce an empty event list rather than an error — see §7.
    pub fn process(&mut self, command: Command) -> Vec<Event> {
        self.clock += 1;
        match command {
            Command::New(payload) => self.process_new(payload),
            Command::Cancel { order_id } => self.process_cancel(order_id),
            Command::Replenish {
                order_id,
                quantity,
                symbol,
            } => self.process_replenish(order_id, quantity, &symbol),
        }
    }

    fn process_new(&mut self, payload: crate::order::NewOrderPayload) -> Vec<Event> {
        if !self.symbols.is_valid(&payload.symbol) {
            warn!(symbol = %payload.symbol, "rejecting NEW: unknown symbol");
            return Vec::new();
        }

        let order = payload.into_order();

        if matches!(order, Order::Iceberg { .. }) && order.total_quantity() == 0 {
            warn!("rejecting NEW: zero quantity iceberg order");
            return Vec::new();
        }

        if let Some(limit_price) = order.limit_price() {
            match self.tick_rules.is_valid(limit_price) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(price = %limit_price, "rejecting NEW: off-tick price");
                    return Vec::new();
                }
                Err(err) => {
                    warn!(error = %err, "rejecting NEW: {}", err);
                    return Vec::new();
                }
            }

            let lot_quantity = order.total_quantity();
            match self.lot_rules.classify(limit_price, lot_quantity) {
                Ok(LotType::RoundLot) => {}
                Ok(_) => {
                    warn!(quantity = lot_quantity, "rejecting NEW: not a round lot");
                    return Vec::new();
                }
                Err(err) => {
                    warn!(error = %err, "rejecting NEW: {}", err);
                    return Vec::new();
                }
            }
        } else if order.total_quantity() == 0 {
            warn!("rejecting NEW: zero quantity market order");
            return Vec::new();
        }

        trace!(order_id = order.id(), symbol = order.symbol(), "processing NEW");

        let symbol = order.symbol().to_string();
        let side = order.side();
        let mut incoming = order;

        let opposite_book = self.book_mut(&symbol, side.opposite());
        let (trades, match_depth) = opposite_book.match_order(&mut incoming);

        let mut events: Vec<Event> = trades.into_iter().map(Event::Trade).collect();

        let remaining = incoming.total_quantity();
        let is_market = matches!(incoming, Order::Market { .. });
        let insert_depth = if remaining > 0 && !is_market && !incoming.tif().is_immediate() {
            let own_book = self.book_mut(&symbol, side);
            Some(own_book.insert(incoming))
        } else {
            None
        };

        match (match_depth.is_empty(), insert_depth) {
            (_, None) => {
                if !match_depth.is_empty() {
                    events.push(Event::Depth(match_depth));
                }
            }
            (true, Some(insert_depth)) => {
                if !insert_depth.is_empty() {
                    events.push(Event::Depth(insert_depth));
                }
            }
            (false, Some(insert_depth)) => {
                events.push(Event::Depth(coalesce(match_depth, insert_depth)));
            }
        }

        debug!(symbol = %symbol, events = events.len(), "NEW processed");
        events
    }

    fn process_cancel(&mut self, order_id: OrderId) -> Vec<Event> {
        let mut events = Vec::new();
        for book in self.books.values_mut() {
            let update = book.cancel(order_id);
            if !update.is_empty() {
                events.push(Event::Depth(update));
            }
        }
        events
    }

    fn process_replenish(&mut self, order_id: OrderId, quantity: u64, symbol: &str) -> Vec<Event> {
        let current_time = self.clock;
        let mut events = Vec::new();
        for side in [Side::Bid, Side::Ask] {
            if let Some(book) = self.books.get_mut(&(symbol.to_string(), side)) {
                let update = book.replenish(order_id, quantity, current_time);
                if !update.is_empty() {
                    events.push(Event::Depth(update));
                }
            }
        }
        events
    }

    /// Loads a prior end-of-day snapshot and seeds each book with its
    /// resting orders, without matching them against one another. A
    /// snapshot I/O failure is logged and the session proceeds with
    /// whatever could be loaded.
    pub fn market_open(&mut self, snapshot_path: &Path) -> Vec<Event> {
        let orders = match read_snapshot(snapshot_path) {
            Ok(orders) => orders,
            Err(err) => {
                warn!(path = %snapshot_path.display(), error = %err, "snapshot read failed, opening empty");
                Vec::new()
            }
        };

        for order in orders {
            let symbol = order.symbol().to_string();
            let side = order.side();
            self.book_mut(&symbol, side).insert(order);
        }

        let mut keys: Vec<(String, Side)> = self.books.keys().cloned().collect();
        keys.sort();
        keys.into_iter()
            .map(|(symbol, _side)| {
                let book = self.books.get(&(symbol.clone(), _side)).unwrap();
                Event::Snapshot(book.price_levels_snapshot(&symbol))
            })
            .collect()
    }

    /// Sweeps every book for its `GoodTillCancel` orders and overwrites
    /// the snapshot file with them, newline-delimited, in deterministic
    /// key order. `Day` orders are discarded.
    pub fn market_close(&mut self, snapshot_path: &Path) -> Result<(), EngineError> {
        let mut keys: Vec<(String, Side)> = self.books.keys().cloned().collect();
        keys.sort();

        let mut surviving = Vec::new();
        for key in keys {
            if let Some(book) = self.books.get_mut(&key) {
                surviving.extend(book.get_eod_orders());
            }
        }

        write_snapshot(snapshot_path, &surviving).map_err(|source| EngineError::SnapshotIoFailure {
            path: snapshot_path.display().to_string(),
            source,
        })
    }
}

/// Merges the trailing depth update from a match with the trailing depth
/// update from the subsequent insertion, per §4.6: the two are expected
/// to concern distinct, non-overlapping sides (the match touches the
/// opposite book from the insertion).
fn coalesce(match_depth: DepthUpdate, insert_depth: DepthUpdate) -> DepthUpdate {
    let same_side_conflict = (!match_depth.bid.is_empty() && !insert_depth.bid.is_empty())
        || (!match_depth.ask.is_empty() && !insert_depth.ask.is_empty());
    assert!(
        !same_side_conflict,
        "SideMismatch: match and insertion depth updates touched the same non-empty side"
    );
    let mut merged = match_depth;
    merged.merge(insert_depth);
    merged
}
