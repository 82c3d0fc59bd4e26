/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use crate::error::EngineError;
use crate::order::{NewOrderPayload, OrderId};
use serde::Deserialize;

/// The textual/JSON framing of an inbound request, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Command {
    /// Submit a new order.
    New(NewOrderPayload),
    /// Cancel a resting order by id.
    Cancel {
        /// The order to cancel.
        order_id: OrderId,
    },
    /// Expose more of an iceberg order's hidden reserve.
    Replenish {
        /// The iceberg order to replenish.
        order_id: OrderId,
        /// How much additional quantity to expose.
        quantity: u64,
        /// The instrument, used to find the right book.
        symbol: String,
    },
}

impl Command {
    /// Parses one JSON command payload. A parse failure is surfaced as
    /// `EngineError::MalformedPayload` with the original text attached,
    /// per §7: this command is then logged and dropped by the caller,
    /// not treated as a fatal error.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(|err| EngineError::MalformedPayload(err.to_string()))
    }
}
