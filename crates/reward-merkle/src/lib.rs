//! An OpenZeppelin `StandardMerkleTree`-compatible commitment engine over
//! reward leaves.
//!
//! Leaves are rows of typed values (addresses, `uint256`s, ...), double
//! `keccak256`-hashed after ABI encoding (via [`reward_abi::pack`]), then
//! folded bottom-up into a flat array of length `2n - 1` exactly as the
//! OpenZeppelin JS/Go libraries lay it out: `tree[i]`'s children live at
//! `2i + 1` and `2i + 2`, and the `n` leaves occupy the last `n` slots in
//! reverse insertion order. Internal pairs are hashed commutatively (the
//! two children are sorted before concatenation), so proofs verify
//! regardless of left/right orientation.

mod error;

pub use error::MerkleError;

use reward_abi::{keccak256, parse_address, parse_bytes32, parse_uint256, pack, AbiValue};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// One row of raw leaf values together with the Solidity type tags used to
/// ABI-encode it. `encoding.len()` must equal `values.len()` for every row
/// passed to [`StandardMerkleTree::of`].
pub type LeafEncoding = Vec<String>;
pub type LeafRow = Vec<Json>;

fn value_to_abi(type_tag: &str, value: &Json) -> Result<AbiValue, MerkleError> {
    let as_str = |v: &Json| -> Result<String, MerkleError> {
        match v {
            Json::String(s) => Ok(s.clone()),
            Json::Number(n) => Ok(n.to_string()),
            other => Err(MerkleError::BadValue {
                type_tag: type_tag.to_string(),
                value: other.to_string(),
            }),
        }
    };

    match type_tag {
        "address" => Ok(AbiValue::Address(parse_address(&as_str(value)?)?)),
        "uint256" => Ok(AbiValue::Uint256(parse_uint256(&as_str(value)?)?)),
        "uint8" => {
            let s = as_str(value)?;
            let n = parse_uint256(&s)?;
            let byte: u8 = n.try_into().map_err(|_| MerkleError::BadValue {
                type_tag: type_tag.to_string(),
                value: s,
            })?;
            Ok(AbiValue::Uint8(byte))
        }
        "bytes32" => Ok(AbiValue::Bytes32(parse_bytes32(&as_str(value)?)?)),
        "address[]" => {
            let arr = value.as_array().ok_or_else(|| MerkleError::BadValue {
                type_tag: type_tag.to_string(),
                value: value.to_string(),
            })?;
            let addrs = arr
                .iter()
                .map(|v| parse_address(&as_str(v)?).map_err(MerkleError::from))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AbiValue::Addresses(addrs))
        }
        "bytes32[]" => {
            let arr = value.as_array().ok_or_else(|| MerkleError::BadValue {
                type_tag: type_tag.to_string(),
                value: value.to_string(),
            })?;
            let items = arr
                .iter()
                .map(|v| parse_bytes32(&as_str(v)?).map_err(MerkleError::from))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AbiValue::Bytes32Array(items))
        }
        other => Err(MerkleError::UnknownTypeTag(other.to_string())),
    }
}

fn leaf_hash(encoding: &LeafEncoding, row: &LeafRow) -> Result<[u8; 32], MerkleError> {
    if row.len() != encoding.len() {
        return Err(MerkleError::RaggedRow {
            index: 0,
            expected: encoding.len(),
            got: row.len(),
        });
    }
    let values = encoding
        .iter()
        .zip(row.iter())
        .map(|(tag, v)| value_to_abi(tag, v))
        .collect::<Result<Vec<_>, _>>()?;
    let encoded = pack(&values)?;
    Ok(keccak256(&keccak256(&encoded)))
}

fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut buf = [0u8; 64];
    if a <= b {
        buf[..32].copy_from_slice(a);
        buf[32..].copy_from_slice(b);
    } else {
        buf[..32].copy_from_slice(b);
        buf[32..].copy_from_slice(a);
    }
    keccak256(&buf)
}

fn left_child(i: usize) -> usize {
    2 * i + 1
}

fn right_child(i: usize) -> usize {
    2 * i + 2
}

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

fn sibling(i: usize) -> usize {
    if i % 2 == 0 {
        i - 1
    } else {
        i + 1
    }
}

fn is_left(i: usize) -> bool {
    i % 2 != 0
}

/// Build the flat `2n-1` tree array from already-hashed, already-ordered
/// leaves. `leaves[0]` ends up at `tree[tree.len() - 1]`.
fn make_tree(leaves: &[[u8; 32]]) -> Vec<[u8; 32]> {
    let n = leaves.len();
    let mut tree = vec![[0u8; 32]; 2 * n - 1];
    for (i, h) in leaves.iter().enumerate() {
        tree[tree.len() - 1 - i] = *h;
    }
    for i in (0..tree.len() - n).rev() {
        tree[i] = hash_pair(&tree[left_child(i)], &tree[right_child(i)]);
    }
    tree
}

/// A single entry as returned by [`StandardMerkleTree::entries`]: the
/// original insertion-order index and the raw leaf row at that index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub value_index: usize,
    pub value: LeafRow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DumpValue {
    value: LeafRow,
    #[serde(rename = "treeIndex")]
    tree_index: usize,
}

/// Canonical on-disk / over-the-wire representation, matching the
/// OpenZeppelin `StandardMerkleTree.dump()` JSON shape (`format:
/// "standard-v1"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDump {
    format: String,
    tree: Vec<String>,
    values: Vec<DumpValue>,
    leaf_encoding: LeafEncoding,
}

/// An OpenZeppelin-compatible standard Merkle tree over a fixed leaf
/// encoding.
#[derive(Debug, Clone)]
pub struct StandardMerkleTree {
    tree: Vec<[u8; 32]>,
    /// `values[i]` is the leaf row with original insertion index `i`.
    values: Vec<LeafRow>,
    /// `value_index_at_tree_index[j]` recovers which original value sits
    /// at `tree[j]`, for `j` in the leaf range.
    tree_index_of_value: Vec<usize>,
    leaf_encoding: LeafEncoding,
}

impl StandardMerkleTree {
    /// Build a tree from `values` (in arbitrary row-major order) using
    /// `leaf_encoding` as the Solidity type tags for every row.
    pub fn of(values: Vec<LeafRow>, leaf_encoding: LeafEncoding) -> Result<Self, MerkleError> {
        if values.is_empty() {
            return Err(MerkleError::Empty);
        }
        for (i, row) in values.iter().enumerate() {
            if row.len() != leaf_encoding.len() {
                return Err(MerkleError::RaggedRow {
                    index: i,
                    expected: leaf_encoding.len(),
                    got: row.len(),
                });
            }
        }

        let mut indexed_hashes: Vec<(usize, [u8; 32])> = values
            .iter()
            .enumerate()
            .map(|(i, row)| leaf_hash(&leaf_encoding, row).map(|h| (i, h)))
            .collect::<Result<Vec<_>, _>>()?;
        // Descending lexicographic order by leaf hash, for a canonical,
        // insertion-order-independent tree shape.
        indexed_hashes.sort_by(|a, b| b.1.cmp(&a.1));

        let sorted_hashes: Vec<[u8; 32]> = indexed_hashes.iter().map(|(_, h)| *h).collect();
        let tree = make_tree(&sorted_hashes);

        let n = sorted_hashes.len();
        let mut tree_index_of_value = vec![0usize; n];
        for (sorted_pos, (orig_index, _)) in indexed_hashes.into_iter().enumerate() {
            let tree_index = tree.len() - 1 - sorted_pos;
            tree_index_of_value[orig_index] = tree_index;
        }

        Ok(Self {
            tree,
            values,
            tree_index_of_value,
            leaf_encoding,
        })
    }

    /// The Merkle root, as lowercase hex without a `0x` prefix.
    pub fn root(&self) -> String {
        hex::encode(self.tree[0])
    }

    /// The raw root bytes.
    pub fn root_bytes(&self) -> [u8; 32] {
        self.tree[0]
    }

    /// Iterate `(value_index, row)` pairs in original insertion order.
    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.values.iter().enumerate().map(|(i, row)| Entry {
            value_index: i,
            value: row.clone(),
        })
    }

    /// Number of leaves in the tree.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Produce a Merkle proof (root-to-leaf sibling hashes, leaf-first) for
    /// the value originally inserted at `value_index`.
    pub fn proof(&self, value_index: usize) -> Result<Vec<[u8; 32]>, MerkleError> {
        let mut index = *self
            .tree_index_of_value
            .get(value_index)
            .ok_or(MerkleError::IndexOutOfRange(value_index))?;

        let mut proof = Vec::new();
        while index > 0 {
            proof.push(self.tree[sibling(index)]);
            index = parent(index);
        }
        Ok(proof)
    }

    /// Same as [`Self::proof`] but hex-encoded with `0x` prefixes, the
    /// shape external callers (the signer/uploader daemons, RPC responses)
    /// consume.
    pub fn proof_hex(&self, value_index: usize) -> Result<Vec<String>, MerkleError> {
        Ok(self
            .proof(value_index)?
            .into_iter()
            .map(|h| format!("0x{}", hex::encode(h)))
            .collect())
    }

    /// Verify a leaf row against `root` using `proof`, independent of any
    /// constructed tree. This is what an on-chain verifier equivalent
    /// would do, and what the uploader uses to sanity-check proofs
    /// returned by the ledger before submitting a transaction.
    pub fn verify(
        leaf_encoding: &LeafEncoding,
        row: &LeafRow,
        proof: &[[u8; 32]],
        root: &[u8; 32],
    ) -> Result<bool, MerkleError> {
        let mut computed = leaf_hash(leaf_encoding, row)?;
        for sibling_hash in proof {
            computed = hash_pair(&computed, sibling_hash);
        }
        Ok(&computed == root)
    }

    /// Dump to the canonical `standard-v1` JSON representation.
    pub fn dump(&self) -> TreeDump {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, row)| DumpValue {
                value: row.clone(),
                tree_index: self.tree_index_of_value[i],
            })
            .collect();
        TreeDump {
            format: "standard-v1".to_string(),
            tree: self.tree.iter().map(|h| format!("0x{}", hex::encode(h))).collect(),
            values,
            leaf_encoding: self.leaf_encoding.clone(),
        }
    }

    pub fn dump_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.dump())
    }

    /// Reconstruct a tree from its canonical dump, recomputing every leaf
    /// and internal hash from `values`/`leaf_encoding` and checking it
    /// against the stored `tree` array — matching OpenZeppelin's
    /// `StandardMerkleTree.load()`. Any divergence (a corrupted internal
    /// node, or a value whose re-hash doesn't match its `treeIndex`)
    /// fails with [`MerkleError::Corrupt`] rather than loading silently.
    pub fn load(dump: TreeDump) -> Result<Self, MerkleError> {
        if dump.format != "standard-v1" {
            return Err(MerkleError::UnsupportedFormat(dump.format));
        }
        let stored_tree = dump
            .tree
            .iter()
            .map(|s| {
                let stripped = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(stripped)
                    .map_err(|_| MerkleError::Corrupt(format!("bad tree hash: {s}")))?;
                if bytes.len() != 32 {
                    return Err(MerkleError::Corrupt(format!("bad tree hash length: {s}")));
                }
                let mut out = [0u8; 32];
                out.copy_from_slice(&bytes);
                Ok(out)
            })
            .collect::<Result<Vec<[u8; 32]>, MerkleError>>()?;

        let n = dump.values.len();
        let n_from_tree = (stored_tree.len() + 1) / 2;
        if n != n_from_tree {
            return Err(MerkleError::Corrupt(format!(
                "tree has {n_from_tree} leaves but {n} values were provided"
            )));
        }

        let leaf_start = stored_tree.len() - n;
        let mut values = vec![Vec::new(); n];
        let mut tree_index_of_value = vec![0usize; n];
        let mut rebuilt = vec![[0u8; 32]; stored_tree.len()];

        for (value_index, v) in dump.values.into_iter().enumerate() {
            if v.tree_index < leaf_start || v.tree_index >= stored_tree.len() {
                return Err(MerkleError::Corrupt(format!(
                    "tree index {} is not a leaf slot",
                    v.tree_index
                )));
            }
            let recomputed = leaf_hash(&dump.leaf_encoding, &v.value)?;
            if recomputed != stored_tree[v.tree_index] {
                return Err(MerkleError::Corrupt(format!(
                    "value {value_index} does not hash to its stored tree index {}",
                    v.tree_index
                )));
            }
            rebuilt[v.tree_index] = recomputed;
            values[value_index] = v.value;
            tree_index_of_value[value_index] = v.tree_index;
        }

        for i in (0..leaf_start).rev() {
            let computed = hash_pair(&rebuilt[left_child(i)], &rebuilt[right_child(i)]);
            if computed != stored_tree[i] {
                return Err(MerkleError::Corrupt(format!(
                    "internal node at tree index {i} does not match its recomputed hash"
                )));
            }
            rebuilt[i] = computed;
        }

        Ok(Self {
            tree: rebuilt,
            values,
            tree_index_of_value,
            leaf_encoding: dump.leaf_encoding,
        })
    }
}

/// Convenience builder for the reward bridge's fixed leaf shape:
/// `(recipient address, amount uint256, contract address, ledger_block uint256)`.
pub fn reward_leaf_encoding() -> LeafEncoding {
    vec![
        "address".to_string(),
        "uint256".to_string(),
        "address".to_string(),
        "uint256".to_string(),
    ]
}

/// Build a reward row from its typed components, ready to hand to
/// [`StandardMerkleTree::of`].
pub fn reward_leaf(recipient: &str, amount: &str, contract: &str, ledger_block: &str) -> LeafRow {
    vec![
        Json::String(recipient.to_string()),
        Json::String(amount.to_string()),
        Json::String(contract.to_string()),
        Json::String(ledger_block.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc";
    const A1: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const A2: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
    const A3: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";
    const A4: &str = "0x90F79bf6EB2c4f870365E785982E1f101E93b906";
    const A5: &str = "0x15d34AAf54267DB7D7c367839AAf71A00a2C6A65";

    // The fixtures use a plain 3-column `(address, amount, contract)` leaf
    // shape (no ledger block), matching the upstream mtree test vectors.
    fn three_col_encoding() -> LeafEncoding {
        vec!["address".to_string(), "uint256".to_string(), "address".to_string()]
    }

    fn row(addr: &str, amount: &str) -> LeafRow {
        vec![Json::String(addr.to_string()), Json::String(amount.to_string()), Json::String(CONTRACT.to_string())]
    }

    #[test]
    fn three_leaf_root_matches_fixture() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        assert_eq!(tree.root(), "e4b867aad8e2ed878496a1d11f020ec3e2cb4470e552bbaeb5d3cb8b633b7d60");
    }

    #[test]
    fn three_leaf_proof_for_a3_matches_fixture() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        let proof = tree.proof_hex(2).unwrap();
        assert_eq!(proof, vec!["0x2f87038f22c4d34c3b4a790a5feeabe33502a6ce9db946d119e9f02ee2c616f9"]);
    }

    #[test]
    fn four_leaf_root_matches_fixture() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100"), row(A4, "200")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        assert_eq!(tree.root(), "0e0cf3eb9e1fd0acb0a0a8131bea8fd9ea7182ef52a94e8b402dedd7cd2c713c");
    }

    #[test]
    fn four_leaf_proof_for_a3_matches_fixture() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100"), row(A4, "200")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        let proof = tree.proof_hex(2).unwrap();
        assert_eq!(
            proof,
            vec![
                "0x843c5da35b6dec0d96b1667418b89fb8650c0c011fe4622b1304b55bfe1b5d9d",
                "0x195aca1e2ee1f09f900f6174cb3ea54d325f29ad05919a4e4416e1c0558a44d6",
            ]
        );
    }

    #[test]
    fn five_leaf_root_matches_fixture() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100"), row(A4, "200"), row(A5, "100")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        assert_eq!(tree.root(), "826d202df86ddc011ba185b4073a80af0b928984893d31fd91221a74094bd062");
    }

    #[test]
    fn five_leaf_proof_for_a3_matches_fixture() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100"), row(A4, "200"), row(A5, "100")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        let proof = tree.proof_hex(2).unwrap();
        assert_eq!(
            proof,
            vec![
                "0x195aca1e2ee1f09f900f6174cb3ea54d325f29ad05919a4e4416e1c0558a44d6",
                "0x038afff99cec2e245a14b191c62ff961b5d4b288634e01b64fd0af40609c0efd",
            ]
        );
    }

    #[test]
    fn proof_verifies_against_root() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100"), row(A4, "200"), row(A5, "100")];
        let tree = StandardMerkleTree::of(values.clone(), three_col_encoding()).unwrap();
        let root = tree.root_bytes();
        for i in 0..values.len() {
            let proof = tree.proof(i).unwrap();
            assert!(StandardMerkleTree::verify(&three_col_encoding(), &values[i], &proof, &root).unwrap());
        }
    }

    #[test]
    fn tampered_row_fails_verification() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        let root = tree.root_bytes();
        let proof = tree.proof(0).unwrap();
        let tampered = row(A1, "999");
        assert!(!StandardMerkleTree::verify(&three_col_encoding(), &tampered, &proof, &root).unwrap());
    }

    #[test]
    fn dump_and_load_round_trips() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100"), row(A4, "200")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        let dump = tree.dump();
        let reloaded = StandardMerkleTree::load(dump).unwrap();
        assert_eq!(reloaded.root(), tree.root());
        assert_eq!(reloaded.proof_hex(2).unwrap(), tree.proof_hex(2).unwrap());
    }

    #[test]
    fn ragged_row_is_rejected() {
        let values = vec![row(A1, "100"), vec![Json::String(A2.to_string())]];
        let err = StandardMerkleTree::of(values, three_col_encoding()).unwrap_err();
        assert!(matches!(err, MerkleError::RaggedRow { index: 1, .. }));
    }

    #[test]
    fn load_rejects_tampered_internal_node() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100"), row(A4, "200")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        let mut dump = tree.dump();
        dump.tree[0] = "0x00".to_string() + &"00".repeat(31);
        let err = StandardMerkleTree::load(dump).unwrap_err();
        assert!(matches!(err, MerkleError::Corrupt(_)));
    }

    #[test]
    fn load_rejects_value_with_wrong_tree_index() {
        let values = vec![row(A1, "100"), row(A2, "200"), row(A3, "100"), row(A4, "200")];
        let tree = StandardMerkleTree::of(values, three_col_encoding()).unwrap();
        let mut dump = tree.dump();
        dump.values[0].value = row(A1, "999");
        let err = StandardMerkleTree::load(dump).unwrap_err();
        assert!(matches!(err, MerkleError::Corrupt(_)));
    }

    #[test]
    fn reward_leaf_encoding_has_four_columns() {
        assert_eq!(reward_leaf_encoding().len(), 4);
        assert_eq!(reward_leaf(A1, "100", CONTRACT, "42").len(), 4);
    }
}
