use base64::Engine;
use serde::{Deserialize, Serialize};

/// One completed vote, as persisted to the signer's state file. The
/// tail's `height` is the resume watermark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteRecord {
    pub height: u64,
    #[serde(with = "sign_hash_base64")]
    pub sign_hash: [u8; 32],
    pub tx_hash: String,
}

/// The persisted signer state is a plain JSON array of [`VoteRecord`]:
/// `[{height, sign_hash (base64), tx_hash}, ...]`.
pub type SignerState = Vec<VoteRecord>;

pub fn resume_watermark(state: &SignerState) -> Option<u64> {
    state.last().map(|r| r.height)
}

mod sign_hash_base64 {
    use super::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_record_round_trips_through_json() {
        let record = VoteRecord { height: 42, sign_hash: [7u8; 32], tx_hash: "0xabc".to_string() };
        let json = serde_json::to_string(&record).unwrap();
        let back: VoteRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn resume_watermark_is_tail_height() {
        let state = vec![
            VoteRecord { height: 10, sign_hash: [0u8; 32], tx_hash: "0x1".to_string() },
            VoteRecord { height: 20, sign_hash: [0u8; 32], tx_hash: "0x2".to_string() },
        ];
        assert_eq!(resume_watermark(&state), Some(20));
        assert_eq!(resume_watermark(&[]), None);
    }
}
