use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("signature has wrong length: expected 65 bytes, got {0}")]
    WrongLength(usize),

    #[error("signature recovery byte {0} is out of the Gnosis range {{31,32}}")]
    BadRecoveryByte(u8),

    #[error("invalid private key bytes")]
    InvalidKey,

    #[error("signature is not recoverable to a valid public key")]
    RecoveryFailed,

    #[error("recovered address does not match expected signer")]
    AddressMismatch,
}
