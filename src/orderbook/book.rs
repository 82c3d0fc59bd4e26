/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use crate::events::{DepthUpdate, MarketSnap, OrderUpdateInfo, PriceLevel, Trade, UpdateAction};
use crate::order::{Order, OrderCore, OrderId, Side, TimeInForce};
use crate::price::Price;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

/// Authoritative mutable state for a resting visible order. The priority
/// queue only ever carries ordering keys; this map is the single owner
/// of remaining quantity, so a fill never has to propagate through more
/// than one place.
#[derive(Debug, Clone)]
struct OrderInfo {
    price: Price,
    quantity: u64,
    tif: TimeInForce,
    symbol: String,
    time: i64,
}

/// Authoritative mutable state for a resting iceberg hidden reserve.
#[derive(Debug, Clone)]
struct HiddenInfo {
    price: Price,
    quantity: u64,
    tif: TimeInForce,
    symbol: String,
    time: i64,
}

/// An ordering key for the priority queues. `rank` encodes the book's
/// side at construction time (higher is better for both sides), so a
/// single `BinaryHeap<HeapKey>` serves as both the bid and the ask
/// queue without a generic comparator parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapKey {
    rank: i64,
    time: i64,
    id: OrderId,
    price: Price,
}

impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| other.time.cmp(&self.time))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The resting liquidity for one instrument on one side of the book.
///
/// Holds a visible priority queue (price-time priority) and, for iceberg
/// orders, a separate hidden-reserve queue. Cancellation is lazy: a
/// cancelled id is dropped from `valid_ids`/`hidden_valid_ids` and the
/// heap entry is left in place to be skipped the next time it surfaces
/// at the top of the queue, rather than walking the heap to remove it.
#[derive(Debug)]
pub struct OrderBook {
    side: Side,
    visible_queue: BinaryHeap<HeapKey>,
    hidden_queue: BinaryHeap<HeapKey>,
    valid_ids: HashSet<OrderId>,
    hidden_valid_ids: HashSet<OrderId>,
    price_levels: BTreeMap<Price, u64>,
    order_info: HashMap<OrderId, OrderInfo>,
    hidden_order_info: HashMap<OrderId, HiddenInfo>,
}

impl OrderBook {
    /// Creates an empty book for `side`.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            visible_queue: BinaryHeap::new(),
            hidden_queue: BinaryHeap::new(),
            valid_ids: HashSet::new(),
            hidden_valid_ids: HashSet::new(),
            price_levels: BTreeMap::new(),
            order_info: HashMap::new(),
            hidden_order_info: HashMap::new(),
        }
    }

    /// The side this book rests liquidity for.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of currently live visible orders, for diagnostics/tests.
    pub fn visible_order_count(&self) -> usize {
        self.valid_ids.len()
    }

    /// Aggregate displayed quantity at `price`, `0` if the level is empty.
    pub fn quantity_at(&self, price: Price) -> u64 {
        self.price_levels.get(&price).copied().unwrap_or(0)
    }

    fn rank(&self, price: Price) -> i64 {
        match self.side {
            Side::Bid => price.unscaled(),
            Side::Ask => -price.unscaled(),
        }
    }

    fn heap_key(&self, price: Price, time: i64, id: OrderId) -> HeapKey {
        HeapKey {
            rank: self.rank(price),
            time,
            id,
            price,
        }
    }

    fn clean_top(queue: &mut BinaryHeap<HeapKey>, valid: &HashSet<OrderId>) -> Option<HeapKey> {
        while let Some(top) = queue.peek().copied() {
            if valid.contains(&top.id) {
                return Some(top);
            }
            queue.pop();
        }
        None
    }

    fn best_overall(&mut self) -> Option<Price> {
        let v = Self::clean_top(&mut self.visible_queue, &self.valid_ids);
        let h = Self::clean_top(&mut self.hidden_queue, &self.hidden_valid_ids);
        match (v, h) {
            (None, None) => None,
            (Some(k), None) => Some(k.price),
            (None, Some(k)) => Some(k.price),
            (Some(kv), Some(kh)) => Some(if kv.rank >= kh.rank { kv.price } else { kh.price }),
        }
    }

    fn crosses(incoming: &Order, best_price: Price) -> bool {
        match incoming {
            Order::Market { .. } => true,
            _ => {
                let limit = incoming.limit_price().expect("non-market order always has a limit price");
                match incoming.side() {
                    Side::Bid => best_price <= limit,
                    Side::Ask => best_price >= limit,
                }
            }
        }
    }

    /// Inserts `order` (which must target this book's side) into resting
    /// liquidity. A duplicate id is a silent no-op (empty depth update),
    /// per the error taxonomy in §7 of the specification.
    pub fn insert(&mut self, order: Order) -> DepthUpdate {
        assert_eq!(
            order.side(),
            self.side,
            "SideMismatch: order routed to the wrong book side"
        );
        match order {
            Order::Iceberg {
                core,
                limit_price,
                quantity,
                hidden_quantity,
            } => {
                if self.valid_ids.contains(&core.id) || self.hidden_valid_ids.contains(&core.id) {
                    return DepthUpdate::default();
                }
                if hidden_quantity > 0 {
                    self.hidden_valid_ids.insert(core.id);
                    self.hidden_order_info.insert(
                        core.id,
                        HiddenInfo {
                            price: limit_price,
                            quantity: hidden_quantity,
                            tif: core.tif,
                            symbol: core.symbol.clone(),
                            time: core.time,
                        },
                    );
                    self.hidden_queue
                        .push(self.heap_key(limit_price, core.time, core.id));
                }
                if quantity > 0 {
                    self.insert_visible(Order::Limit {
                        core,
                        limit_price,
                        quantity,
                    })
                } else {
                    DepthUpdate::default()
                }
            }
            other => self.insert_visible(other),
        }
    }

    fn insert_visible(&mut self, order: Order) -> DepthUpdate {
        let id = order.id();
        if self.valid_ids.contains(&id) {
            return DepthUpdate::default();
        }
        let quantity = order.displayed_quantity();
        if quantity == 0 {
            return DepthUpdate::default();
        }
        let price = order
            .limit_price()
            .expect("a visible resting order always carries a limit price");
        let time = order.time();

        self.valid_ids.insert(id);
        self.order_info.insert(
            id,
            OrderInfo {
                price,
                quantity,
                tif: order.tif(),
                symbol: order.symbol().to_string(),
                time,
            },
        );
        self.visible_queue.push(self.heap_key(price, time, id));
        let aggregate = {
            let level = self.price_levels.entry(price).or_insert(0);
            *level += quantity;
            *level
        };

        DepthUpdate::single(
            self.side,
            OrderUpdateInfo {
                price,
                quantity: aggregate,
                action: UpdateAction::Add,
            },
        )
    }

    /// Cancels `order_id` if it is resting (visible or hidden). Cancelling
    /// an id this book has never seen is a no-op, not an error.
    pub fn cancel(&mut self, order_id: OrderId) -> DepthUpdate {
        if self.hidden_valid_ids.remove(&order_id) {
            self.hidden_order_info.remove(&order_id);
        }

        if !self.valid_ids.remove(&order_id) {
            return DepthUpdate::default();
        }
        let info = self
            .order_info
            .remove(&order_id)
            .expect("valid_ids/order_info must stay in sync");

        let remaining = match self.price_levels.get_mut(&info.price) {
            Some(level) => {
                *level = level.saturating_sub(info.quantity);
                let remaining = *level;
                if remaining == 0 {
                    self.price_levels.remove(&info.price);
                }
                remaining
            }
            None => 0,
        };

        let action = if remaining == 0 {
            UpdateAction::Delete
        } else {
            UpdateAction::Modify
        };
        DepthUpdate::single(
            self.side,
            OrderUpdateInfo {
                price: info.price,
                quantity: remaining,
                action,
            },
        )
    }

    /// Exposes up to `quantity` of a resting iceberg's hidden reserve as
    /// a fresh visible child. Rejected (no event) if the order still has
    /// a displayed remainder or has no live hidden reserve.
    pub fn replenish(&mut self, order_id: OrderId, quantity: u64, current_time: i64) -> DepthUpdate {
        if self.valid_ids.contains(&order_id) {
            return DepthUpdate::default();
        }
        if !self.hidden_valid_ids.contains(&order_id) {
            return DepthUpdate::default();
        }
        let (price, tif, symbol, expose) = {
            let hidden = self
                .hidden_order_info
                .get_mut(&order_id)
                .expect("hidden_valid_ids/hidden_order_info must stay in sync");
            let expose = quantity.min(hidden.quantity);
            hidden.quantity -= expose;
            (hidden.price, hidden.tif, hidden.symbol.clone(), expose)
        };

        if expose == 0 {
            return DepthUpdate::default();
        }
        if self.hidden_order_info.get(&order_id).map(|h| h.quantity) == Some(0) {
            self.hidden_valid_ids.remove(&order_id);
            self.hidden_order_info.remove(&order_id);
        }

        let child = Order::Limit {
            core: OrderCore {
                time: current_time,
                id: order_id,
                symbol,
                side: self.side,
                tif,
            },
            limit_price: price,
            quantity: expose,
        };
        self.insert_visible(child)
    }

    /// Matches `incoming` (which must target the opposite side) against
    /// this book's resting liquidity, mutating `incoming`'s remaining
    /// quantity in place and returning the trades and trailing depth
    /// update produced.
    pub fn match_order(&mut self, incoming: &mut Order) -> (Vec<Trade>, DepthUpdate) {
        assert_eq!(
            incoming.side(),
            self.side.opposite(),
            "SideMismatch: match target must be the opposite side's book"
        );

        let mut trades = Vec::new();
        let mut depth = DepthUpdate::default();

        loop {
            if incoming.total_quantity() == 0 {
                break;
            }
            let Some(best_price) = self.best_overall() else {
                break;
            };
            if !Self::crosses(incoming, best_price) {
                break;
            }
            self.drain_visible_at_price(best_price, incoming, &mut trades, &mut depth);
            if incoming.total_quantity() == 0 {
                break;
            }
            self.drain_hidden_at_price(best_price, incoming, &mut trades);
        }

        (trades, depth)
    }

    /// Drains resting visible liquidity at `price` against `incoming`,
    /// pushing one [`OrderUpdateInfo`] per filled order rather than a
    /// single post-loop summary: a fully filled order emits `Delete(price,
    /// 0)`, deduplicated against an immediately preceding entry already at
    /// this price (since `price` is constant for the whole call, that
    /// collapses to "only the batch's first entry may be a dedup'd
    /// delete"); a partially filled order emits an unconditional
    /// `Modify(price, remaining_aggregate)`. Mirrors the per-fill update
    /// emission in `order_book.hpp`'s `match_order`/`quantity_of_best_price`.
    fn drain_visible_at_price(
        &mut self,
        price: Price,
        incoming: &mut Order,
        trades: &mut Vec<Trade>,
        depth: &mut DepthUpdate,
    ) {
        let mut first = true;
        loop {
            if incoming.total_quantity() == 0 {
                break;
            }
            let Some(top) = Self::clean_top(&mut self.visible_queue, &self.valid_ids) else {
                break;
            };
            if top.price != price {
                break;
            }
            let fill = {
                let info = self
                    .order_info
                    .get_mut(&top.id)
                    .expect("valid_ids entry without order_info");
                let fill = info.quantity.min(incoming.total_quantity());
                info.quantity -= fill;
                fill
            };
            incoming.reduce(fill);
            trades.push(Trade {
                price,
                quantity: fill,
            });
            if let Some(level) = self.price_levels.get_mut(&price) {
                *level = level.saturating_sub(fill);
            }

            let order_exhausted = self.order_info.get(&top.id).map(|i| i.quantity) == Some(0);
            if order_exhausted {
                self.visible_queue.pop();
                self.valid_ids.remove(&top.id);
                self.order_info.remove(&top.id);

                if self.price_levels.get(&price).copied().unwrap_or(0) == 0 {
                    self.price_levels.remove(&price);
                }

                if first {
                    let entry = OrderUpdateInfo {
                        price,
                        quantity: 0,
                        action: UpdateAction::Delete,
                    };
                    match self.side {
                        Side::Bid => depth.bid.push(entry),
                        Side::Ask => depth.ask.push(entry),
                    }
                }
            } else {
                let remaining = self.price_levels.get(&price).copied().unwrap_or(0);
                let entry = OrderUpdateInfo {
                    price,
                    quantity: remaining,
                    action: UpdateAction::Modify,
                };
                match self.side {
                    Side::Bid => depth.bid.push(entry),
                    Side::Ask => depth.ask.push(entry),
                }
            }
            first = false;
        }
    }

    fn drain_hidden_at_price(&mut self, price: Price, incoming: &mut Order, trades: &mut Vec<Trade>) {
        loop {
            if incoming.total_quantity() == 0 {
                break;
            }
            let Some(top) = Self::clean_top(&mut self.hidden_queue, &self.hidden_valid_ids) else {
                break;
            };
            if top.price != price {
                break;
            }
            let fill = {
                let info = self
                    .hidden_order_info
                    .get_mut(&top.id)
                    .expect("hidden_valid_ids entry without hidden_order_info");
                let fill = info.quantity.min(incoming.total_quantity());
                info.quantity -= fill;
                fill
            };
            incoming.reduce(fill);
            trades.push(Trade {
                price,
                quantity: fill,
            });

            if self.hidden_order_info.get(&top.id).map(|i| i.quantity) == Some(0) {
                self.hidden_queue.pop();
                self.hidden_valid_ids.remove(&top.id);
                self.hidden_order_info.remove(&top.id);
            }
        }
    }

    /// Drains the book at end of session: `GoodTillCancel` orders are
    /// returned for persistence (iceberg display and hidden halves are
    /// reassembled into a single `Order::Iceberg`); `Day` orders are
    /// discarded. The book is empty afterwards.
    pub fn get_eod_orders(&mut self) -> Vec<Order> {
        let mut surviving_displays: HashMap<OrderId, (Price, u64, TimeInForce, String, i64)> =
            HashMap::new();

        while let Some(key) = self.visible_queue.pop() {
            if !self.valid_ids.remove(&key.id) {
                continue;
            }
            if let Some(info) = self.order_info.remove(&key.id) {
                if info.tif == TimeInForce::GoodTillCancel {
                    surviving_displays.insert(
                        key.id,
                        (info.price, info.quantity, info.tif, info.symbol, info.time),
                    );
                }
            }
        }

        let mut results = Vec::new();
        let mut reassembled: HashSet<OrderId> = HashSet::new();

        while let Some(key) = self.hidden_queue.pop() {
            if !self.hidden_valid_ids.remove(&key.id) {
                continue;
            }
            let Some(hidden) = self.hidden_order_info.remove(&key.id) else {
                continue;
            };
            if hidden.tif != TimeInForce::GoodTillCancel {
                continue;
            }
            let (price, display_qty, tif, symbol, time) = surviving_displays
                .remove(&key.id)
                .unwrap_or((hidden.price, 0, hidden.tif, hidden.symbol.clone(), hidden.time));
            reassembled.insert(key.id);
            results.push(Order::Iceberg {
                core: OrderCore {
                    time,
                    id: key.id,
                    symbol,
                    side: self.side,
                    tif,
                },
                limit_price: price,
                quantity: display_qty,
                hidden_quantity: hidden.quantity,
            });
        }

        for (id, (price, quantity, tif, symbol, time)) in surviving_displays {
            if reassembled.contains(&id) {
                continue;
            }
            results.push(Order::Limit {
                core: OrderCore {
                    time,
                    id,
                    symbol,
                    side: self.side,
                    tif,
                },
                limit_price: price,
                quantity,
            });
        }

        self.price_levels.clear();
        results
    }

    /// A full snapshot of this book's displayed price levels, ordered
    /// best-to-worst for its side.
    pub fn price_levels_snapshot(&self, symbol: &str) -> MarketSnap {
        let mut levels: Vec<PriceLevel> = self
            .price_levels
            .iter()
            .map(|(price, quantity)| PriceLevel {
                price: *price,
                quantity: *quantity,
            })
            .collect();
        match self.side {
            Side::Bid => levels.sort_by(|a, b| b.price.cmp(&a.price)),
            Side::Ask => levels.sort_by(|a, b| a.price.cmp(&b.price)),
        }
        MarketSnap {
            symbol: symbol.to_string(),
            side: self.side,
            levels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn limit(id: OrderId, time: i64, side: Side, price: &str, qty: u64, tif: TimeInForce) -> Order {
        Order::Limit {
            core: OrderCore {
                time,
                id,
                symbol: "ABC".to_string(),
                side,
                tif,
            },
            limit_price: Price::from_str(price).unwrap(),
            quantity: qty,
        }
    }

    fn market(id: OrderId, time: i64, side: Side, qty: u64) -> Order {
        Order::Market {
            core: OrderCore {
                time,
                id,
                symbol: "ABC".to_string(),
                side,
                tif: TimeInForce::ImmediateOrCancel,
            },
            quantity: qty,
        }
    }

    #[test]
    fn price_time_priority() {
        let mut bids = OrderBook::new(Side::Bid);
        bids.insert(limit(1, 1, Side::Bid, "10.01", 100, TimeInForce::Day));
        bids.insert(limit(2, 2, Side::Bid, "10.01", 200, TimeInForce::Day));

        let mut incoming = market(3, 3, Side::Ask, 150);
        let (trades, depth) = bids.match_order(&mut incoming);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].quantity, 100);
        assert_eq!(trades[1].quantity, 50);
        assert_eq!(bids.quantity_at(Price::from_str("10.01").unwrap()), 150);

        // order #1 is fully filled first (Delete), then order #2 is
        // partially filled (Modify) — one entry per fill, not a single
        // post-loop summary.
        assert_eq!(depth.bid.len(), 2);
        assert_eq!(depth.bid[0].action, UpdateAction::Delete);
        assert_eq!(depth.bid[0].quantity, 0);
        assert_eq!(depth.bid[1].action, UpdateAction::Modify);
        assert_eq!(depth.bid[1].quantity, 150);
    }

    #[test]
    fn partial_fill_then_insert_remainder() {
        let mut asks = OrderBook::new(Side::Ask);
        asks.insert(limit(1, 1, Side::Ask, "10.03", 500, TimeInForce::Day));

        let mut incoming = limit(2, 2, Side::Bid, "10.03", 700, TimeInForce::Day);
        let (trades, depth) = asks.match_order(&mut incoming);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, 500);
        assert_eq!(depth.ask.len(), 1);
        assert_eq!(depth.ask[0].action, UpdateAction::Delete);
        assert_eq!(incoming.total_quantity(), 200);

        let mut bids = OrderBook::new(Side::Bid);
        let add = bids.insert(incoming);
        assert_eq!(add.bid.len(), 1);
        assert_eq!(add.bid[0].quantity, 200);
    }

    #[test]
    fn iceberg_display_then_hidden_then_replenish() {
        let mut bids = OrderBook::new(Side::Bid);
        bids.insert(Order::Iceberg {
            core: OrderCore {
                time: 1,
                id: 1,
                symbol: "ABC".to_string(),
                side: Side::Bid,
                tif: TimeInForce::GoodTillCancel,
            },
            limit_price: Price::from_str("10.00").unwrap(),
            quantity: 100,
            hidden_quantity: 300,
        });
        assert_eq!(bids.quantity_at(Price::from_str("10.00").unwrap()), 100);

        let mut incoming = market(2, 2, Side::Ask, 250);
        let (trades, _depth) = bids.match_order(&mut incoming);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].quantity, 100);
        assert_eq!(trades[1].quantity, 150);
        assert_eq!(bids.quantity_at(Price::from_str("10.00").unwrap()), 0);

        let add = bids.replenish(1, 100, 3);
        assert_eq!(add.bid.len(), 1);
        assert_eq!(add.bid[0].quantity, 100);
    }

    #[test]
    fn cancel_is_lazy_and_reflects_remaining_aggregate() {
        let mut bids = OrderBook::new(Side::Bid);
        bids.insert(limit(1, 1, Side::Bid, "10.01", 100, TimeInForce::Day));
        bids.insert(limit(2, 2, Side::Bid, "10.01", 200, TimeInForce::Day));

        let update = bids.cancel(1);
        assert_eq!(update.bid.len(), 1);
        assert_eq!(update.bid[0].quantity, 200);
        assert_eq!(update.bid[0].action, UpdateAction::Modify);
        assert_eq!(bids.visible_order_count(), 1);
    }

    #[test]
    fn cancel_unknown_id_is_noop() {
        let mut bids = OrderBook::new(Side::Bid);
        let update = bids.cancel(999);
        assert!(update.is_empty());
    }

    #[test]
    fn eod_round_trip_keeps_only_gtc() {
        let mut bids = OrderBook::new(Side::Bid);
        bids.insert(limit(1, 1, Side::Bid, "10.00", 100, TimeInForce::GoodTillCancel));
        bids.insert(limit(2, 2, Side::Bid, "10.01", 50, TimeInForce::Day));
        bids.insert(limit(3, 3, Side::Bid, "9.99", 25, TimeInForce::GoodTillCancel));

        let survivors = bids.get_eod_orders();
        assert_eq!(survivors.len(), 2);
        assert!(survivors.iter().all(|o| o.tif() == TimeInForce::GoodTillCancel));
        assert_eq!(bids.visible_order_count(), 0);
    }

    #[test]
    fn duplicate_id_insert_is_noop() {
        let mut bids = OrderBook::new(Side::Bid);
        bids.insert(limit(1, 1, Side::Bid, "10.00", 100, TimeInForce::Day));
        let update = bids.insert(limit(1, 2, Side::Bid, "10.00", 50, TimeInForce::Day));
        assert!(update.is_empty());
        assert_eq!(bids.quantity_at(Price::from_str("10.00").unwrap()), 100);
    }
}
