/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use crate::order::NewOrderPayload;
use crate::order::Order;
use crate::price::Price;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// The on-disk shape of one snapshot line. Unlike the wire `NewOrderPayload`,
/// this carries quantities split exactly the way `Order` stores them so a
/// round trip through the snapshot never perturbs iceberg display/hidden
/// quantities.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotOrder {
    time: i64,
    order_id: i64,
    symbol: String,
    side: crate::order::Side,
    tif: crate::order::TimeInForce,
    #[serde(default)]
    quantity: Option<u64>,
    #[serde(default)]
    hidden_quantity: Option<u64>,
    #[serde(default)]
    limit_price: Option<Price>,
}

impl From<&Order> for SnapshotOrder {
    fn from(order: &Order) -> Self {
        match order {
            Order::Market { core, quantity } => SnapshotOrder {
                time: core.time,
                order_id: core.id,
                symbol: core.symbol.clone(),
                side: core.side,
                tif: core.tif,
                quantity: Some(*quantity),
                hidden_quantity: None,
                limit_price: None,
            },
            Order::Limit {
                core,
                limit_price,
                quantity,
            } => SnapshotOrder {
                time: core.time,
                order_id: core.id,
                symbol: core.symbol.clone(),
                side: core.side,
                tif: core.tif,
                quantity: Some(*quantity),
                hidden_quantity: None,
                limit_price: Some(*limit_price),
            },
            Order::Iceberg {
                core,
                limit_price,
                quantity,
                hidden_quantity,
            } => SnapshotOrder {
                time: core.time,
                order_id: core.id,
                symbol: core.symbol.clone(),
                side: core.side,
                tif: core.tif,
                quantity: Some(*quantity),
                hidden_quantity: Some(*hidden_quantity),
                limit_price: Some(*limit_price),
            },
        }
    }
}

impl SnapshotOrder {
    fn into_order(self) -> Order {
        NewOrderPayload {
            time: self.time,
            order_id: self.order_id,
            symbol: self.symbol,
            side: self.side,
            tif: self.tif,
            quantity: self.quantity,
            display_quantity: self.quantity,
            hidden_quantity: self.hidden_quantity,
            limit_price: self.limit_price,
        }
        .into_order()
    }
}

/// Reads an end-of-day snapshot file into the orders it held. Blank
/// lines are skipped; a line that fails to parse is logged at `warn`
/// and skipped rather than aborting the rest of the load.
pub fn read_snapshot(path: &Path) -> io::Result<Vec<Order>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut orders = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<SnapshotOrder>(line) {
            Ok(snapshot) => orders.push(snapshot.into_order()),
            Err(err) => {
                warn!(line = line_no + 1, error = %err, "skipping malformed snapshot line");
            }
        }
    }
    Ok(orders)
}

/// Writes `orders` as newline-delimited JSON, one per line, to `path`.
/// The full content is built in memory and written to a sibling temp
/// file which is then renamed into place, so a crash mid-write never
/// leaves a half-written snapshot at `path`.
pub fn write_snapshot(path: &Path, orders: &[Order]) -> io::Result<()> {
    let mut body = String::new();
    for order in orders {
        let snapshot = SnapshotOrder::from(order);
        let line = serde_json::to_string(&snapshot)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        body.push_str(&line);
        body.push('\n');
    }

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, body)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
