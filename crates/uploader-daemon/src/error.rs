use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploaderError {
    #[error(transparent)]
    Ledger(#[from] reward_ledger::LedgerError),

    #[error(transparent)]
    State(#[from] reward_state::StateError),

    #[error(transparent)]
    Abi(#[from] reward_abi::AbiError),

    #[error("chain RPC error: {0}")]
    Provider(String),

    #[error("gas fee cap {wanted} exceeds configured maximum {max}, refusing to resubmit")]
    GasFeeCapExceeded { wanted: String, max: String },

    #[error("tx {tx_hash} reverted: {reason}")]
    TxReverted { tx_hash: String, reason: String },

    #[error("no reward tracked for ledger block {0}")]
    UnknownBlock(u64),
}
