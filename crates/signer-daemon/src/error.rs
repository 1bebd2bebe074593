use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignerDaemonError {
    #[error(transparent)]
    Ledger(#[from] reward_ledger::LedgerError),

    #[error(transparent)]
    State(#[from] reward_state::StateError),

    #[error(transparent)]
    Abi(#[from] reward_abi::AbiError),

    #[error(transparent)]
    Crypto(#[from] reward_crypto::CryptoError),

    #[error("malformed 32-byte hex field `{field}`: {value}")]
    MalformedHash { field: &'static str, value: String },
}
