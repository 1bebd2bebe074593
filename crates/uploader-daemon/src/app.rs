//! The uploader daemon's orchestration logic, grounded on
//! `goimpl/uploader/uploader.go`'s `EVMUploader`: fetch finalized epochs,
//! skip ones already posted on-chain, post the rest, and follow each
//! posting through inclusion/confirmation/fee-bump/failure.

use crate::error::UploaderError;
use crate::revert::{self, RevertOutcome};
use crate::types::{Reward, TxInfo, UploaderState};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer as EthersSigner};
use ethers::types::{Address, Bytes, Eip1559TransactionRequest, NameOrAddress, H256, U256};
use reward_config::{ContractVariant, UploaderConfig};
use reward_contract::{RewardDistributor, RewardDistributorSigs};
use reward_ledger::{FinalizedReward, LedgerClient};
use reward_state::JsonFileStore;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, info_span, warn};

type Client = Arc<SignerMiddleware<Provider<Http>, LocalWallet>>;

enum ContractBinding {
    TwoArgSafeLinked(RewardDistributor<Client>),
    FourArgSignatures(RewardDistributorSigs<Client>),
}

impl ContractBinding {
    async fn reward_poster(&self, root: [u8; 32]) -> Result<Address, UploaderError> {
        let result = match self {
            Self::TwoArgSafeLinked(c) => c.reward_poster(root).call().await,
            Self::FourArgSignatures(c) => c.reward_poster(root).call().await,
        };
        result.map_err(|e| UploaderError::Provider(e.to_string()))
    }

    /// Raw calldata for `postReward`, for whichever ABI shape is bound.
    fn encode_post_reward(&self, root: [u8; 32], amount: U256, signatures: &[Vec<u8>]) -> Bytes {
        match self {
            Self::TwoArgSafeLinked(c) => c.post_reward(root, amount).calldata().unwrap_or_default(),
            Self::FourArgSignatures(c) => {
                let sigs: Vec<Bytes> = signatures.iter().map(|s| Bytes::from(s.clone())).collect();
                c.post_reward(root, amount, sigs).calldata().unwrap_or_default()
            }
        }
    }

    fn address(&self) -> Address {
        match self {
            Self::TwoArgSafeLinked(c) => c.address(),
            Self::FourArgSignatures(c) => c.address(),
        }
    }
}

pub struct EVMUploader {
    client: Client,
    contract: ContractBinding,
    ledger: LedgerClient,
    state: JsonFileStore<UploaderState>,
    repost_posted_reward: bool,
    max_gas_fee_cap: U256,
    fetch_batch_limit: u64,
    confirmation_depth_blocks: u64,
    pending_too_long_blocks: u64,
}

impl EVMUploader {
    pub async fn new(config: UploaderConfig) -> Result<Self, UploaderError> {
        let provider = Provider::<Http>::try_from(config.chain_rpc.as_str())
            .map_err(|e| UploaderError::Provider(e.to_string()))?;
        let wallet: LocalWallet = config
            .private_key
            .parse::<LocalWallet>()
            .map_err(|e| UploaderError::Provider(e.to_string()))?
            .with_chain_id(config.chain_id);
        let client: Client = Arc::new(SignerMiddleware::new(provider, wallet));

        let contract_address = reward_abi::parse_address(&config.contract_address)?;
        let contract_address = Address::from_slice(&contract_address);
        let contract = match config.contract_variant {
            ContractVariant::TwoArgSafeLinked => {
                ContractBinding::TwoArgSafeLinked(RewardDistributor::new(contract_address, client.clone()))
            }
            ContractVariant::FourArgSignatures => ContractBinding::FourArgSignatures(
                RewardDistributorSigs::new(contract_address, client.clone()),
            ),
        };

        let ledger = LedgerClient::connect(&config.ledger_rpc)?;

        let mut state: JsonFileStore<UploaderState> = JsonFileStore::open(&config.state_file, true)?;
        state.with_mut(UploaderState::rebuild_index)?;

        let max_gas_fee_cap = U256::from_dec_str(&config.max_gas_fee_cap_wei)
            .map_err(|_| UploaderError::Abi(reward_abi::AbiError::InvalidUint256(config.max_gas_fee_cap_wei.clone())))?;

        Ok(Self {
            client,
            contract,
            ledger,
            state,
            repost_posted_reward: config.repost_posted_reward,
            max_gas_fee_cap,
            fetch_batch_limit: config.fetch_batch_limit,
            confirmation_depth_blocks: config.confirmation_depth_blocks,
            pending_too_long_blocks: config.pending_too_long_blocks,
        })
    }

    /// Pulls newly finalized epochs past the watermark into `Pending`.
    pub async fn fetch_pending_rewards(&self) -> Result<(), UploaderError> {
        let span = info_span!("fetch_pending_rewards");
        let _enter = span.enter();

        let last_block = self.state.with(|s| s.last_block);
        let finalized = self.ledger.fetch_latest_rewards(self.fetch_batch_limit as u32).await?;

        // `fetch_latest_rewards` returns newest-first; take the prefix
        // past our watermark, then restore ascending order so blocks are
        // appended to `Pending` in the order they must be posted.
        let mut fresh: Vec<FinalizedReward> =
            finalized.into_iter().take_while(|f| f.epoch.end_height > last_block).collect();
        fresh.reverse();

        if fresh.is_empty() {
            return Ok(());
        }

        for reward in fresh {
            let block = reward.epoch.end_height;
            let root_hex = reward.epoch.reward_root.clone();

            self.state.with_mut(|s| {
                s.add_reward(block, reward);
                s.last_block = s.last_block.max(block);
            })?;

            if !self.repost_posted_reward {
                let root = reward_abi::parse_bytes32(&root_hex)?;
                let poster = self.contract.reward_poster(root).await?;
                if !is_zero_address(poster) {
                    info!(block, poster = %poster, "root already posted on-chain, skipping");
                    self.state.with_mut(|s| s.skip_block(block))?;
                }
            }
        }
        Ok(())
    }

    /// Only the head of `Pending` is ever touched, enforcing strict
    /// FIFO per-account posting.
    pub async fn check_reward_posting_status(&self) -> Result<(), UploaderError> {
        let span = info_span!("check_reward_posting_status");
        let _enter = span.enter();

        let Some(block) = self.state.with(|s| s.pending.first().copied()) else {
            return Ok(());
        };
        let has_result = self.state.with(|s| {
            s.reward_for_block(block).map(|r| r.result.is_some()).unwrap_or(false)
        });

        if has_result {
            self.follow_tx(block).await
        } else {
            self.post_reward(block, 0, false).await
        }
    }

    /// Builds, signs, and broadcasts a `postReward` transaction.
    async fn post_reward(&self, block: u64, extra_tip_gwei: u64, prioritize: bool) -> Result<(), UploaderError> {
        let reward = self
            .state
            .with(|s| s.reward_for_block(block).cloned())
            .ok_or(UploaderError::UnknownBlock(block))?;

        let root = reward_abi::parse_bytes32(&reward.request.epoch.reward_root)?;
        let amount = reward_abi::parse_uint256(&reward.request.epoch.total_amount)?;
        let signatures = decode_signatures(&reward.request.signatures)?;
        let calldata = self.contract.encode_post_reward(root, amount, &signatures);

        let head = self.client.get_block_number().await.map_err(provider_err)?.as_u64();

        let nonce = if prioritize {
            U256::from(reward.result.as_ref().map(|r| r.account_nonce).unwrap_or_default())
        } else {
            self.client
                .get_transaction_count(self.client.address(), None)
                .await
                .map_err(provider_err)?
        };

        let (suggested_max_fee, suggested_priority) =
            self.client.estimate_eip1559_fees(None).await.map_err(provider_err)?;
        let priority = if extra_tip_gwei > 0 {
            suggested_priority + U256::from(extra_tip_gwei) * U256::exp10(9)
        } else {
            suggested_priority
        };
        let bump = priority.saturating_sub(suggested_priority);
        let max_fee = suggested_max_fee.saturating_add(bump);

        if max_fee > self.max_gas_fee_cap {
            return Err(UploaderError::GasFeeCapExceeded {
                wanted: max_fee.to_string(),
                max: self.max_gas_fee_cap.to_string(),
            });
        }

        let tx = Eip1559TransactionRequest {
            from: Some(self.client.address()),
            to: Some(NameOrAddress::Address(self.contract.address())),
            data: Some(calldata),
            value: Some(U256::zero()),
            nonce: Some(nonce),
            max_fee_per_gas: Some(max_fee),
            max_priority_fee_per_gas: Some(priority),
            chain_id: Some(self.client.signer().chain_id().into()),
            ..Default::default()
        };

        let gas_estimate = self.client.estimate_gas(&tx.clone().into(), None).await.map_err(provider_err)?;
        let pending_tx = self.client.send_transaction(tx, None).await.map_err(provider_err)?;
        let tx_hash = *pending_tx;

        info!(block, tx_hash = %tx_hash, nonce = %nonce, max_fee = %max_fee, "posted reward");

        let info = TxInfo {
            tx_hash: format!("{tx_hash:#x}"),
            fee: gas_estimate.saturating_mul(max_fee),
            gas_price: max_fee,
            post_block: head,
            include_block: 0,
            account_nonce: nonce.as_u64(),
        };
        self.state.with_mut(|s| {
            if let Some(reward) = s.reward_for_block_mut(block) {
                reward.result = Some(info);
            }
        })?;
        Ok(())
    }

    /// The transaction lifecycle state machine — pending, resubmit,
    /// included-unconfirmed, confirmed (terminal), or failed.
    async fn follow_tx(&self, block: u64) -> Result<(), UploaderError> {
        let reward = self
            .state
            .with(|s| s.reward_for_block(block).cloned())
            .ok_or(UploaderError::UnknownBlock(block))?;
        let tx_info = reward.result.clone().expect("caller checked result is Some");

        let head = self.client.get_block_number().await.map_err(provider_err)?.as_u64();
        let delta = head.saturating_sub(tx_info.post_block);

        let tx_hash = H256::from_str(&tx_info.tx_hash).map_err(|e| UploaderError::Provider(e.to_string()))?;
        let receipt = self.client.get_transaction_receipt(tx_hash).await.map_err(provider_err)?;

        match receipt {
            None => {
                if delta <= self.pending_too_long_blocks {
                    info!(block, delta, "tx still pending");
                    Ok(())
                } else {
                    warn!(block, delta, "tx pending too long, resubmitting with higher tip");
                    self.post_reward(block, 2, true).await
                }
            }
            Some(receipt) if receipt.status == Some(1.into()) => {
                let include_block = receipt.block_number.map(|b| b.as_u64()).unwrap_or(head);
                let confirmations = head.saturating_sub(include_block);
                if confirmations <= self.confirmation_depth_blocks {
                    info!(block, confirmations, "tx included but not yet confirmed");
                    Ok(())
                } else {
                    self.state.with_mut(|s| {
                        if let Some(reward) = s.reward_for_block_mut(block) {
                            if let Some(info) = reward.result.as_mut() {
                                info.include_block = include_block;
                            }
                        }
                        s.confirm_block(block);
                    })?;
                    info!(block, include_block, "tx confirmed");
                    Ok(())
                }
            }
            Some(_failed) => {
                let reason = self.fetch_revert_reason(&reward, &tx_info).await;
                match revert::classify(&reason) {
                    RevertOutcome::AlreadyPosted => {
                        info!(block, "revert indicates root already posted, treating as success");
                        self.state.with_mut(|s| s.skip_block(block))?;
                        Ok(())
                    }
                    RevertOutcome::Fatal => Err(UploaderError::TxReverted { tx_hash: tx_info.tx_hash.clone(), reason }),
                }
            }
        }
    }

    async fn fetch_revert_reason(&self, reward: &Reward, tx_info: &TxInfo) -> String {
        let root = match reward_abi::parse_bytes32(&reward.request.epoch.reward_root) {
            Ok(r) => r,
            Err(_) => return "unable to replay: malformed reward root".to_string(),
        };
        let amount = match reward_abi::parse_uint256(&reward.request.epoch.total_amount) {
            Ok(a) => a,
            Err(_) => return "unable to replay: malformed amount".to_string(),
        };
        let signatures = match decode_signatures(&reward.request.signatures) {
            Ok(s) => s,
            Err(_) => return "unable to replay: malformed signature".to_string(),
        };
        let calldata = self.contract.encode_post_reward(root, amount, &signatures);

        let tx = Eip1559TransactionRequest {
            from: Some(self.client.address()),
            to: Some(NameOrAddress::Address(self.contract.address())),
            data: Some(calldata),
            nonce: Some(U256::from(tx_info.account_nonce)),
            ..Default::default()
        };
        match self.client.call(&tx.into(), None).await {
            Ok(_) => "replay succeeded; revert reason unavailable".to_string(),
            Err(e) => e.to_string(),
        }
    }
}

fn is_zero_address(addr: Address) -> bool {
    addr == Address::zero()
}

fn provider_err<E: std::fmt::Display>(e: E) -> UploaderError {
    UploaderError::Provider(e.to_string())
}

fn decode_signatures(signatures: &[String]) -> Result<Vec<Vec<u8>>, UploaderError> {
    signatures
        .iter()
        .map(|s| {
            hex::decode(s.trim_start_matches("0x"))
                .map_err(|e| UploaderError::Provider(format!("invalid signature hex {s}: {e}")))
        })
        .collect()
}
