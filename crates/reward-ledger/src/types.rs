use serde::{Deserialize, Serialize};

/// A ledger-side reward row, consumed read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingReward {
    pub id: String,
    pub recipient: String,
    /// Arbitrary-precision decimal, never a float.
    pub amount: String,
    pub contract: String,
    pub creation_block: u64,
}

/// An epoch as reported by the ledger, before quorum signing is known.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpochReward {
    pub id: String,
    pub start_height: u64,
    pub end_height: u64,
    /// Arbitrary-precision decimal.
    pub total_amount: String,
    /// 32-byte Merkle root, `0x`-prefixed hex.
    pub reward_root: String,
    pub safe_nonce: u64,
    /// 32-byte digest signers sign, `0x`-prefixed hex.
    pub sign_hash: String,
    pub contract: String,
    pub voters: Vec<String>,
}

/// An [`EpochReward`] that has cleared signer quorum.
///
/// Invariant: `quorum_voters.len() == signatures.len()`; signatures are
/// aligned by index, and each recovers to the voter address at the same
/// index when applied to `epoch.sign_hash` under the Gnosis `v` convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinalizedReward {
    #[serde(flatten)]
    pub epoch: EpochReward,
    pub quorum_voters: Vec<String>,
    /// `0x`-prefixed hex, aligned index-for-index with `quorum_voters`.
    pub signatures: Vec<String>,
}
