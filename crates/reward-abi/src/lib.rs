//! Solidity ABI encoding (`abi.encode`, not `abi.encodePacked`) and the
//! `keccak256` digest derivations the reward bridge signs.
//!
//! Encoding itself is delegated to [`ethabi::encode`], which already
//! implements the 32-byte-word head/tail layout the EVM uses — there is no
//! reason to hand-roll it.

mod error;
pub mod digest;

pub use error::AbiError;

use ethabi::{
    ethereum_types::{Address, U256},
    Token,
};
use sha3::{Digest, Keccak256};

/// One value to be ABI-encoded, tagged by its Solidity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address([u8; 20]),
    Uint8(u8),
    Uint256(U256),
    Bytes32([u8; 32]),
    Addresses(Vec<[u8; 20]>),
    Bytes32Array(Vec<[u8; 32]>),
    BytesArray(Vec<Vec<u8>>),
}

impl AbiValue {
    fn to_token(&self) -> Token {
        match self {
            Self::Address(a) => Token::Address(Address::from_slice(a)),
            Self::Uint8(v) => Token::Uint(U256::from(*v)),
            Self::Uint256(v) => Token::Uint(*v),
            Self::Bytes32(b) => Token::FixedBytes(b.to_vec()),
            Self::Addresses(addrs) => Token::Array(
                addrs.iter().map(|a| Token::Address(Address::from_slice(a))).collect(),
            ),
            Self::Bytes32Array(items) => {
                Token::Array(items.iter().map(|b| Token::FixedBytes(b.to_vec())).collect())
            }
            Self::BytesArray(items) => {
                Token::Array(items.iter().map(|b| Token::Bytes(b.clone())).collect())
            }
        }
    }
}

/// ABI-encode a tuple of values using Solidity's `abi.encode` (non-packed) layout.
pub fn pack(values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if values.is_empty() {
        return Err(AbiError::Empty);
    }
    let tokens: Vec<Token> = values.iter().map(AbiValue::to_token).collect();
    Ok(ethabi::encode(&tokens))
}

/// `keccak256` of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&out);
    digest
}

/// Parse a `0x`-prefixed or bare hex address into its 20 raw bytes.
pub fn parse_address(s: &str) -> Result<[u8; 20], AbiError> {
    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let bytes = hex::decode(hex_str).map_err(|_| AbiError::InvalidAddress(s.to_string()))?;
    if bytes.len() != 20 {
        return Err(AbiError::InvalidAddress(s.to_string()));
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Parse a decimal (or `0x`-prefixed hex) string into a `uint256`.
pub fn parse_uint256(s: &str) -> Result<U256, AbiError> {
    if let Some(hex_str) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return U256::from_str_radix(hex_str, 16).map_err(|_| AbiError::InvalidUint256(s.to_string()));
    }
    U256::from_dec_str(s).map_err(|_| AbiError::InvalidUint256(s.to_string()))
}

/// Parse a 64-hex-char (with or without `0x`) string into 32 raw bytes.
pub fn parse_bytes32(s: &str) -> Result<[u8; 32], AbiError> {
    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let bytes = hex::decode(hex_str).map_err(|_| AbiError::InvalidBytes32(s.to_string()))?;
    if bytes.len() != 32 {
        return Err(AbiError::InvalidBytes32(s.to_string()));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_rejects_empty() {
        assert_eq!(pack(&[]), Err(AbiError::Empty));
    }

    #[test]
    fn address_round_trips_with_and_without_prefix() {
        let with_prefix = parse_address("0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc").unwrap();
        let without_prefix = parse_address("9965507D1a55bcC2695C58ba16FB37d819B0A4dc").unwrap();
        assert_eq!(with_prefix, without_prefix);
    }

    #[test]
    fn uint256_accepts_decimal_and_hex() {
        assert_eq!(parse_uint256("100").unwrap(), U256::from(100));
        assert_eq!(parse_uint256("0x64").unwrap(), U256::from(100));
    }

    #[test]
    fn bytes32_rejects_wrong_length() {
        assert!(parse_bytes32("00").is_err());
    }
}
