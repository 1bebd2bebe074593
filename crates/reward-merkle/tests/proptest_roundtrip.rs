use proptest::prelude::*;
use reward_merkle::{reward_leaf, reward_leaf_encoding, StandardMerkleTree};

fn arb_address() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<u8>(), 20).prop_map(|bytes| format!("0x{}", hex::encode(bytes)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every leaf in a freshly built tree must verify against its own
    /// proof and root, regardless of how many leaves or what values.
    #[test]
    fn every_leaf_verifies_against_its_own_proof(
        recipients in proptest::collection::vec(arb_address(), 1..12),
        amount in 0u64..1_000_000,
        contract in arb_address(),
        ledger_block in 0u64..10_000_000,
    ) {
        let rows: Vec<_> = recipients
            .iter()
            .map(|r| reward_leaf(r, &amount.to_string(), &contract, &ledger_block.to_string()))
            .collect();
        let tree = StandardMerkleTree::of(rows.clone(), reward_leaf_encoding()).unwrap();
        let root = tree.root_bytes();
        for i in 0..rows.len() {
            let proof = tree.proof(i).unwrap();
            prop_assert!(StandardMerkleTree::verify(&reward_leaf_encoding(), &rows[i], &proof, &root).unwrap());
        }
    }

    /// Dumping and reloading a tree must preserve the root and every proof.
    #[test]
    fn dump_load_preserves_root_and_proofs(
        recipients in proptest::collection::vec(arb_address(), 1..8),
        contract in arb_address(),
    ) {
        let rows: Vec<_> = recipients
            .iter()
            .enumerate()
            .map(|(i, r)| reward_leaf(r, &(i as u64 * 10).to_string(), &contract, "1"))
            .collect();
        let tree = StandardMerkleTree::of(rows, reward_leaf_encoding()).unwrap();
        let reloaded = StandardMerkleTree::load(tree.dump()).unwrap();
        prop_assert_eq!(tree.root(), reloaded.root());
        for i in 0..tree.len() {
            prop_assert_eq!(tree.proof_hex(i).unwrap(), reloaded.proof_hex(i).unwrap());
        }
    }
}
