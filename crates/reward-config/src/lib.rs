//! Typed configuration shapes for the `reward-signer` and `reward-uploader`
//! binaries. Loading a config file is a thin `serde_json` read — the
//! mechanism itself (env overrides, secret managers, etc.) is explicitly
//! out of scope; only the shape of what gets loaded is
//! specified.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, #[source] source: serde_json::Error },
}

pub fn load<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read { path: path_str.clone(), source })?;
    serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse { path: path_str, source })
}

/// `{ledgerRPC, namespace, privateKey, syncAfterBlock, pollInterval, stateFile?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    pub ledger_rpc: String,
    pub namespace: String,
    pub private_key: String,
    #[serde(default)]
    pub sync_after_block: u64,
    /// Poll cadence, in seconds.
    pub poll_interval: u64,
    pub state_file: Option<String>,
}

/// Which of the two `postReward` ABI shapes the deployed contract
/// exposes. Callers must bind to the ABI the deployed contract
/// actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractVariant {
    /// `postReward(bytes32 root, uint256 amount, bytes[] signatures)`.
    FourArgSignatures,
    /// `postReward(bytes32 root, uint256 amount)`, quorum implied by a
    /// linked Safe contract.
    TwoArgSafeLinked,
}

/// `{chainRPC, chainId, contractAddress, privateKey, ledgerClient, stateFile, repostPostedReward?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    pub chain_rpc: String,
    pub chain_id: u64,
    pub contract_address: String,
    pub contract_variant: ContractVariant,
    pub private_key: String,
    pub ledger_rpc: String,
    pub state_file: String,
    #[serde(default)]
    pub repost_posted_reward: bool,

    /// A configurable hard ceiling on `GasFeeCap`, in wei. `postReward`
    /// refuses to resubmit past this cap.
    pub max_gas_fee_cap_wei: String,

    #[serde(default = "default_fetch_batch_limit")]
    pub fetch_batch_limit: u64,
    #[serde(default = "default_confirmation_depth")]
    pub confirmation_depth_blocks: u64,
    #[serde(default = "default_pending_too_long")]
    pub pending_too_long_blocks: u64,
    #[serde(default = "default_poll_interval")]
    pub fetch_interval_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub check_interval_secs: u64,
    #[serde(default = "default_loop_offset")]
    pub check_loop_offset_secs: u64,
}

fn default_fetch_batch_limit() -> u64 {
    10
}

fn default_confirmation_depth() -> u64 {
    10
}

fn default_pending_too_long() -> u64 {
    270
}

fn default_poll_interval() -> u64 {
    60
}

fn default_loop_offset() -> u64 {
    13
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploader_config_applies_defaults() {
        let json = r#"{
            "chain_rpc": "http://localhost:8545",
            "chain_id": 1,
            "contract_address": "0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc",
            "contract_variant": "two_arg_safe_linked",
            "private_key": "0xabc",
            "ledger_rpc": "http://localhost:9090",
            "state_file": "/tmp/uploader.json",
            "max_gas_fee_cap_wei": "100000000000"
        }"#;
        let cfg: UploaderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.fetch_batch_limit, 10);
        assert_eq!(cfg.confirmation_depth_blocks, 10);
        assert_eq!(cfg.pending_too_long_blocks, 270);
        assert_eq!(cfg.check_loop_offset_secs, 13);
        assert!(!cfg.repost_posted_reward);
    }
}
