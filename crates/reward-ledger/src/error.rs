use jsonrpsee::core::Error as JsonRpseeError;

/// Every ledger call fails with one of two shapes —
/// retry-worthy, or not. Callers pattern-match on this, never on
/// `jsonrpsee`/transport internals.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Network error, timeout, or a 5xx-shaped RPC error — the caller
    /// should abandon this tick and retry on the next one.
    #[error("transient ledger RPC error: {0}")]
    Transient(String),

    /// Bad request shape, an RPC error the ledger will never resolve on
    /// its own, or a response that fails to parse.
    #[error("permanent ledger RPC error: {0}")]
    Permanent(String),
}

impl From<JsonRpseeError> for LedgerError {
    fn from(error: JsonRpseeError) -> Self {
        match error {
            JsonRpseeError::RequestTimeout | JsonRpseeError::Transport(_) => {
                Self::Transient(error.to_string())
            }
            JsonRpseeError::Call(call) if (500..600).contains(&i64::from(call.code())) => {
                Self::Transient(call.to_string())
            }
            other => Self::Permanent(other.to_string()),
        }
    }
}
