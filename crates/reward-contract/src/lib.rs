//! `ethers::contract::abigen!` bindings for the `RewardDistributor`
//! contract, in both ABI shapes the reward bridge may be deployed with:
//! a 2-argument `postReward(bytes32,uint256)` where quorum is enforced
//! by a linked Safe contract (grounded on
//! `peripheral/goimpl/reward/contract.go`), and a 4-argument
//! `postReward(bytes32,uint256,bytes[])` where signatures are passed
//! directly and checked on-chain against a signer set/threshold.
//!
//! Callers must bind to whichever ABI the deployed contract actually
//! exposes — `reward-config::ContractVariant` selects between the two
//! at construction time in the uploader daemon.

pub mod two_arg_safe_linked {
    use ethers::contract::abigen;

    abigen!(
        RewardDistributor,
        r#"[
            {"inputs":[{"internalType":"address","name":"_safe","type":"address"},{"internalType":"uint256","name":"_posterFee","type":"uint256"},{"internalType":"address","name":"_rewardToken","type":"address"}],"stateMutability":"nonpayable","type":"constructor"},
            {"anonymous":false,"inputs":[{"indexed":false,"internalType":"uint256","name":"newFee","type":"uint256"},{"indexed":false,"internalType":"uint256","name":"nonce","type":"uint256"}],"name":"PosterFeeUpdated","type":"event"},
            {"anonymous":false,"inputs":[{"indexed":false,"internalType":"address","name":"recipient","type":"address"},{"indexed":false,"internalType":"uint256","name":"amount","type":"uint256"},{"indexed":false,"internalType":"address","name":"claimer","type":"address"}],"name":"RewardClaimed","type":"event"},
            {"anonymous":false,"inputs":[{"indexed":false,"internalType":"bytes32","name":"root","type":"bytes32"},{"indexed":false,"internalType":"uint256","name":"amount","type":"uint256"},{"indexed":false,"internalType":"address","name":"poster","type":"address"}],"name":"RewardPosted","type":"event"},
            {"inputs":[{"internalType":"address","name":"recipient","type":"address"},{"internalType":"uint256","name":"amount","type":"uint256"},{"internalType":"uint256","name":"kwilBlock","type":"uint256"},{"internalType":"bytes32","name":"rewardRoot","type":"bytes32"},{"internalType":"bytes32[]","name":"proofs","type":"bytes32[]"}],"name":"claimReward","outputs":[],"stateMutability":"payable","type":"function"},
            {"inputs":[{"internalType":"bytes32","name":"","type":"bytes32"},{"internalType":"bytes32","name":"","type":"bytes32"}],"name":"isRewardClaimed","outputs":[{"internalType":"bool","name":"","type":"bool"}],"stateMutability":"view","type":"function"},
            {"inputs":[],"name":"nonce","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
            {"inputs":[{"internalType":"bytes32","name":"root","type":"bytes32"},{"internalType":"uint256","name":"amount","type":"uint256"}],"name":"postReward","outputs":[],"stateMutability":"nonpayable","type":"function"},
            {"inputs":[],"name":"posterFee","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
            {"inputs":[{"internalType":"bytes32","name":"","type":"bytes32"}],"name":"rewardPoster","outputs":[{"internalType":"address","name":"","type":"address"}],"stateMutability":"view","type":"function"},
            {"inputs":[],"name":"rewardToken","outputs":[{"internalType":"contract IERC20","name":"","type":"address"}],"stateMutability":"view","type":"function"},
            {"inputs":[],"name":"safe","outputs":[{"internalType":"address","name":"","type":"address"}],"stateMutability":"view","type":"function"},
            {"inputs":[{"internalType":"uint256","name":"newFee","type":"uint256"},{"internalType":"uint256","name":"_nonce","type":"uint256"}],"name":"updatePosterFee","outputs":[],"stateMutability":"nonpayable","type":"function"}
        ]"#,
    );
}

pub mod four_arg_signatures {
    use ethers::contract::abigen;

    abigen!(
        RewardDistributorSigs,
        r#"[
            {"anonymous":false,"inputs":[{"indexed":false,"internalType":"address[]","name":"newSigners","type":"address[]"},{"indexed":false,"internalType":"uint8","name":"newThreshold","type":"uint8"}],"name":"SignersUpdated","type":"event"},
            {"anonymous":false,"inputs":[{"indexed":false,"internalType":"bytes32","name":"root","type":"bytes32"},{"indexed":false,"internalType":"uint256","name":"amount","type":"uint256"},{"indexed":false,"internalType":"address","name":"poster","type":"address"}],"name":"RewardPosted","type":"event"},
            {"inputs":[],"name":"nonce","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
            {"inputs":[{"internalType":"bytes32","name":"root","type":"bytes32"},{"internalType":"uint256","name":"amount","type":"uint256"},{"internalType":"bytes[]","name":"signatures","type":"bytes[]"}],"name":"postReward","outputs":[],"stateMutability":"nonpayable","type":"function"},
            {"inputs":[{"internalType":"bytes32","name":"","type":"bytes32"}],"name":"rewardPoster","outputs":[{"internalType":"address","name":"","type":"address"}],"stateMutability":"view","type":"function"},
            {"inputs":[{"internalType":"address","name":"","type":"address"}],"name":"isSigner","outputs":[{"internalType":"bool","name":"","type":"bool"}],"stateMutability":"view","type":"function"},
            {"inputs":[],"name":"threshold","outputs":[{"internalType":"uint8","name":"","type":"uint8"}],"stateMutability":"view","type":"function"},
            {"inputs":[],"name":"posterFee","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
            {"inputs":[{"internalType":"address","name":"recipient","type":"address"},{"internalType":"uint256","name":"amount","type":"uint256"},{"internalType":"bytes32","name":"rewardRoot","type":"bytes32"},{"internalType":"bytes32[]","name":"proof","type":"bytes32[]"}],"name":"claimReward","outputs":[],"stateMutability":"payable","type":"function"}
        ]"#,
    );
}

pub use four_arg_signatures::RewardDistributorSigs;
pub use two_arg_safe_linked::RewardDistributor;
