/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use std::io;

/// Errors raised by the engine's boundary and session I/O. Ordinary,
/// expected rejections of a well-formed command (duplicate id, unknown
/// id, failed validation) are modelled as empty-event returns rather
/// than `Result::Err` — see §7 of the specification — so this enum only
/// covers the truly exceptional paths: malformed wire payloads and
/// session persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The command payload could not be parsed into a recognized shape.
    #[error("malformed command payload: {0}")]
    MalformedPayload(String),

    /// Reading or writing the end-of-session snapshot failed.
    #[error("snapshot I/O failure at {path}: {source}")]
    SnapshotIoFailure {
        /// Path that was being read or written.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
