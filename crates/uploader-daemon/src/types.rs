//! Uploader state shapes, grounded on `goimpl/uploader/uploader.go`'s
//! `State`/`Reward`/`TxInfo`. Big integers always serialize as decimal
//! strings, never as JSON numbers, which would silently truncate
//! through an IEEE-754 float in other language bindings reading this
//! file.

use ethers::types::U256;
use reward_ledger::FinalizedReward;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// On-chain transaction bookkeeping for one posted reward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxInfo {
    /// `0x`-prefixed hex.
    pub tx_hash: String,
    #[serde(with = "u256_decimal")]
    pub fee: U256,
    #[serde(with = "u256_decimal")]
    pub gas_price: U256,
    pub post_block: u64,
    /// `0` while the tx has not yet been observed included.
    pub include_block: u64,
    pub account_nonce: u64,
}

/// One reward the uploader has taken responsibility for: the finalized
/// epoch it came from, and (once posted) its on-chain lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reward {
    pub request: FinalizedReward,
    pub result: Option<TxInfo>,
}

/// The uploader's durable state:
/// `{last_block, rewards: [{request, result}], pending: [uint64]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploaderState {
    pub last_block: u64,
    pub rewards: Vec<Reward>,
    /// Ordered ledger blocks whose on-chain posting is not yet confirmed.
    /// `pending[0]` is the only one ever advanced per tick, enforcing
    /// strict FIFO per-account posting.
    pub pending: Vec<u64>,
    /// Ledger block → position in `rewards`. Rebuilt on load, never
    /// persisted.
    #[serde(skip)]
    pub index: HashMap<u64, usize>,
}

impl UploaderState {
    /// Rebuild `index` from `rewards` after loading from disk.
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, reward) in self.rewards.iter().enumerate() {
            self.index.insert(reward.request.epoch.end_height, i);
        }
    }

    pub fn reward_for_block(&self, block: u64) -> Option<&Reward> {
        self.index.get(&block).map(|&i| &self.rewards[i])
    }

    pub fn reward_for_block_mut(&mut self, block: u64) -> Option<&mut Reward> {
        match self.index.get(&block) {
            Some(&i) => self.rewards.get_mut(i),
            None => None,
        }
    }

    pub fn add_reward(&mut self, block: u64, request: FinalizedReward) {
        let position = self.rewards.len();
        self.rewards.push(Reward { request, result: None });
        self.index.insert(block, position);
        self.pending.push(block);
    }

    /// Drop `block` from `pending` without recording a `TxInfo` — the
    /// "acknowledged but not owned by this uploader" path.
    pub fn skip_block(&mut self, block: u64) {
        self.pending.retain(|&b| b != block);
    }

    /// Remove `block` from `pending` once its posting is confirmed
    /// (the terminal state of the tx lifecycle).
    pub fn confirm_block(&mut self, block: u64) {
        self.pending.retain(|&b| b != block);
    }
}

mod u256_decimal {
    use ethers::types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_info_serializes_big_ints_as_decimal_strings() {
        let info = TxInfo {
            tx_hash: "0xabc".to_string(),
            fee: U256::from(123456789012345678u64),
            gas_price: U256::from(30_000_000_000u64),
            post_block: 100,
            include_block: 0,
            account_nonce: 5,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"123456789012345678\""));
        assert!(json.contains("\"30000000000\""));
        let back: TxInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }

    #[test]
    fn index_is_rebuilt_after_reload() {
        let mut state = UploaderState::default();
        state.rewards.push(Reward {
            request: finalized_reward_fixture(42),
            result: None,
        });
        assert!(state.reward_for_block(42).is_none());
        state.rebuild_index();
        assert!(state.reward_for_block(42).is_some());
    }

    fn finalized_reward_fixture(end_height: u64) -> FinalizedReward {
        use reward_ledger::EpochReward;
        FinalizedReward {
            epoch: EpochReward {
                id: "e1".to_string(),
                start_height: end_height - 1,
                end_height,
                total_amount: "100".to_string(),
                reward_root: format!("0x{}", "00".repeat(32)),
                safe_nonce: 1,
                sign_hash: format!("0x{}", "00".repeat(32)),
                contract: "0x0000000000000000000000000000000000000000".to_string(),
                voters: vec![],
            },
            quorum_voters: vec![],
            signatures: vec![],
        }
    }
}
