/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use crate::price::Price;
use serde::{Deserialize, Serialize};

/// Resting side of an order book, or the side of an incoming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy side.
    Bid,
    /// Sell side.
    Ask,
}

impl Side {
    /// The opposite side, used to find the book an incoming order matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// How long an order is eligible to rest before it is invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    /// Expires at end of day if not fully filled.
    Day,
    /// Must fill immediately (fully or partially); any remainder is discarded.
    ImmediateOrCancel,
    /// Rests until explicitly cancelled or fully filled.
    GoodTillCancel,
}

impl TimeInForce {
    /// Whether this TIF forbids resting in the book at all.
    pub fn is_immediate(self) -> bool {
        matches!(self, TimeInForce::ImmediateOrCancel)
    }
}

/// A unique order identifier, as supplied by the submitter.
pub type OrderId = i64;

/// Fields shared by every order variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCore {
    /// Submission timestamp (epoch), used to break price ties.
    pub time: i64,
    /// Unique id.
    pub id: OrderId,
    /// Instrument symbol.
    pub symbol: String,
    /// Book side this order targets.
    pub side: Side,
    /// Time in force.
    pub tif: TimeInForce,
}

/// A single order, tagged by type.
///
/// Polymorphism that in an object-oriented design would live behind a
/// virtual base class is expressed here as a plain enum matched on by
/// the book and engine; there is no trait object anywhere in the hot
/// path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    /// Immediate-or-cancel order with no limit price.
    Market {
        /// Shared fields.
        core: OrderCore,
        /// Remaining quantity to fill.
        quantity: u64,
    },
    /// Resting limit order.
    Limit {
        /// Shared fields.
        core: OrderCore,
        /// Limit price.
        limit_price: Price,
        /// Remaining quantity to fill.
        quantity: u64,
    },
    /// Limit order with a hidden reserve behind a displayed quantity.
    Iceberg {
        /// Shared fields.
        core: OrderCore,
        /// Limit price.
        limit_price: Price,
        /// Currently displayed quantity (can reach zero while hidden remains).
        quantity: u64,
        /// Quantity not yet displayed.
        hidden_quantity: u64,
    },
}

impl Order {
    /// The order's unique id.
    pub fn id(&self) -> OrderId {
        self.core().id
    }

    /// The book side this order targets.
    pub fn side(&self) -> Side {
        self.core().side
    }

    /// The instrument symbol.
    pub fn symbol(&self) -> &str {
        &self.core().symbol
    }

    /// Submission timestamp.
    pub fn time(&self) -> i64 {
        self.core().time
    }

    /// Time in force.
    pub fn tif(&self) -> TimeInForce {
        self.core().tif
    }

    /// Limit price, if this order carries one.
    pub fn limit_price(&self) -> Option<Price> {
        match self {
            Order::Market { .. } => None,
            Order::Limit { limit_price, .. } | Order::Iceberg { limit_price, .. } => {
                Some(*limit_price)
            }
        }
    }

    /// Quantity currently eligible to be matched and/or displayed.
    pub fn displayed_quantity(&self) -> u64 {
        match self {
            Order::Market { quantity, .. } => *quantity,
            Order::Limit { quantity, .. } => *quantity,
            Order::Iceberg { quantity, .. } => *quantity,
        }
    }

    /// Total remaining quantity, displayed plus hidden.
    pub fn total_quantity(&self) -> u64 {
        match self {
            Order::Market { quantity, .. } => *quantity,
            Order::Limit { quantity, .. } => *quantity,
            Order::Iceberg {
                quantity,
                hidden_quantity,
                ..
            } => quantity + hidden_quantity,
        }
    }

    fn core(&self) -> &OrderCore {
        match self {
            Order::Market { core, .. } => core,
            Order::Limit { core, .. } => core,
            Order::Iceberg { core, .. } => core,
        }
    }

    /// Reduces the order's remaining quantity by `by`, draining displayed
    /// quantity first and then the hidden reserve for an iceberg order.
    ///
    /// `by` must not exceed `total_quantity()`.
    pub fn reduce(&mut self, by: u64) {
        match self {
            Order::Market { quantity, .. } | Order::Limit { quantity, .. } => {
                *quantity = quantity.saturating_sub(by);
            }
            Order::Iceberg {
                quantity,
                hidden_quantity,
                ..
            } => {
                if by <= *quantity {
                    *quantity -= by;
                } else {
                    let remainder = by - *quantity;
                    *quantity = 0;
                    *hidden_quantity = hidden_quantity.saturating_sub(remainder);
                }
            }
        }
    }

    /// Splits an iceberg order into its displayed child (a `Limit`, `None`
    /// when the displayed quantity is zero) and its hidden reserve child.
    ///
    /// Panics if called on a non-iceberg order.
    pub fn split(&self) -> (Option<Order>, HiddenReserve) {
        match self {
            Order::Iceberg {
                core,
                limit_price,
                quantity,
                hidden_quantity,
            } => {
                let display = if *quantity > 0 {
                    Some(Order::Limit {
                        core: core.clone(),
                        limit_price: *limit_price,
                        quantity: *quantity,
                    })
                } else {
                    None
                };
                let hidden = HiddenReserve {
                    core: core.clone(),
                    limit_price: *limit_price,
                    quantity: *hidden_quantity,
                };
                (display, hidden)
            }
            _ => panic!("split() called on a non-iceberg order"),
        }
    }
}

/// The hidden half of an iceberg order, tracked separately from its
/// displayed child once both are resting in the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenReserve {
    /// Shared fields, copied from the parent iceberg order.
    pub core: OrderCore,
    /// Limit price, shared with the displayed child.
    pub limit_price: Price,
    /// Remaining hidden quantity.
    pub quantity: u64,
}

/// Inbound payload for a `NEW` command, as received over the wire (see
/// `crate::command`). Distinguishing a payload from an `Order` keeps the
/// wire shape decoupled from the variant factory below.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewOrderPayload {
    /// Submission timestamp.
    pub time: i64,
    /// Unique id.
    pub order_id: OrderId,
    /// Instrument symbol.
    pub symbol: String,
    /// Book side.
    pub side: Side,
    /// Time in force.
    pub tif: TimeInForce,
    /// Plain quantity, for market/limit orders.
    #[serde(default)]
    pub quantity: Option<u64>,
    /// Displayed quantity, for iceberg orders.
    #[serde(default)]
    pub display_quantity: Option<u64>,
    /// Hidden quantity, for iceberg orders.
    #[serde(default)]
    pub hidden_quantity: Option<u64>,
    /// Limit price, for limit/iceberg orders.
    #[serde(default)]
    pub limit_price: Option<Price>,
}

impl NewOrderPayload {
    /// Builds the tagged `Order` this payload describes.
    ///
    /// Dispatch mirrors §4.2 of the specification: presence of
    /// `hidden_quantity` means iceberg, presence of `limit_price` alone
    /// means limit, otherwise market.
    pub fn into_order(self) -> Order {
        let core = OrderCore {
            time: self.time,
            id: self.order_id,
            symbol: self.symbol,
            side: self.side,
            tif: self.tif,
        };

        if let Some(hidden_quantity) = self.hidden_quantity {
            return Order::Iceberg {
                core,
                limit_price: self.limit_price.unwrap_or_else(Price::zero),
                quantity: self.display_quantity.unwrap_or(0),
                hidden_quantity,
            };
        }

        if let Some(limit_price) = self.limit_price {
            return Order::Limit {
                core,
                limit_price,
                quantity: self.quantity.unwrap_or(0),
            };
        }

        Order::Market {
            core,
            quantity: self.quantity.unwrap_or(0),
        }
    }
}
