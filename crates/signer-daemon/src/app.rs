//! The signer daemon's single-threaded poll loop: discover → verify →
//! sign → submit vote → persist, grounded on
//! `peripheral/goimpl/signer/signer.go`'s `App`.

use crate::error::SignerDaemonError;
use crate::state::{resume_watermark, SignerState, VoteRecord};
use reward_abi::digest::post_reward_digest;
use reward_abi::parse_bytes32;
use reward_config::SignerConfig;
use reward_crypto::Signer;
use reward_ledger::{EpochReward, LedgerClient, LedgerError};
use reward_state::JsonFileStore;
use std::time::Duration;
use tracing::{info, info_span, warn};

pub struct App {
    ledger: LedgerClient,
    signer: Signer,
    namespace: String,
    state: JsonFileStore<SignerState>,
    poll_interval: Duration,
    /// In-memory resume watermark; the source of truth until the next
    /// successful vote is persisted.
    watermark: u64,
}

impl App {
    /// Resume-watermark startup rule:
    /// 1. If the state file has records, `W := tail.height`.
    /// 2. Else if `syncAfterBlock > 0`, `W := syncAfterBlock`.
    /// 3. Else ask the ledger for the latest finalized reward; `W :=
    ///    that.end_height`, or `0` if none exists.
    pub async fn new(config: SignerConfig) -> Result<Self, SignerDaemonError> {
        let ledger = LedgerClient::connect(&config.ledger_rpc)?;
        let signer = Signer::from_hex(&config.private_key)?;

        let state: JsonFileStore<SignerState> = match &config.state_file {
            Some(path) => JsonFileStore::open(path, false)?,
            None => JsonFileStore::in_memory(SignerState::default()),
        };

        let watermark = if let Some(w) = state.with(resume_watermark) {
            w
        } else if config.sync_after_block > 0 {
            config.sync_after_block
        } else {
            let latest = ledger.fetch_latest_rewards(1).await?;
            latest.first().map(|r| r.epoch.end_height).unwrap_or(0)
        };

        info!(watermark, "signer resuming from watermark");

        Ok(Self {
            ledger,
            signer,
            namespace: config.namespace,
            state,
            poll_interval: Duration::from_secs(config.poll_interval),
            watermark,
        })
    }

    /// A protocol hook: recomputes the expected `SignHash` from the
    /// epoch's own fields and asserts equality. A full implementation
    /// would also recompute `RewardRoot` from ledger-reported leaves;
    /// that requires a leaf-listing RPC the ledger interface does not
    /// expose, so this hook verifies what it can.
    fn verify(&self, epoch: &EpochReward) -> Result<bool, SignerDaemonError> {
        let expected = post_reward_digest(
            &epoch.reward_root,
            &epoch.total_amount,
            &epoch.safe_nonce.to_string(),
            &epoch.contract,
        )?;
        let actual = parse_bytes32(&epoch.sign_hash)?;
        Ok(expected == actual)
    }

    async fn vote(&mut self, epoch: &EpochReward) -> Result<(), SignerDaemonError> {
        let digest = parse_bytes32(&epoch.sign_hash)?;
        let sig = self.signer.gnosis_sign_digest(&digest);
        let sig_hex = format!("0x{}", hex::encode(sig));

        let tx_hash = self.ledger.vote_epoch(&epoch.sign_hash, &sig_hex).await?;

        self.watermark = epoch.end_height;
        self.state.with_mut(|records: &mut SignerState| {
            records.push(VoteRecord {
                height: epoch.end_height,
                sign_hash: digest,
                tx_hash: tx_hash.clone(),
            });
        })?;
        info!(height = epoch.end_height, tx_hash, "vote submitted and persisted");
        Ok(())
    }

    /// One tick: fetch a single epoch past the watermark, verify it,
    /// sign, vote, and advance. Transient ledger errors are swallowed
    /// here — the caller's loop simply retries on the next tick.
    async fn tick(&mut self) {
        let span = info_span!("signer_tick", watermark = self.watermark, namespace = %self.namespace);
        let _enter = span.enter();

        let epochs = match self.ledger.fetch_epoch_rewards(self.watermark, 1).await {
            Ok(epochs) => epochs,
            Err(LedgerError::Transient(msg)) => {
                warn!(error = %msg, "transient ledger error, retrying next tick");
                return;
            }
            Err(LedgerError::Permanent(msg)) => {
                warn!(error = %msg, "permanent ledger error fetching epochs");
                return;
            }
        };

        for epoch in epochs {
            if epoch.voters.iter().any(|v| addresses_match(v, &self.signer.address())) {
                info!(epoch = %epoch.id, "already voted, skipping");
                continue;
            }

            match self.verify(&epoch) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(epoch = %epoch.id, "sign hash mismatch, skipping epoch");
                    continue;
                }
                Err(e) => {
                    warn!(epoch = %epoch.id, error = %e, "verification error, skipping epoch");
                    continue;
                }
            }

            if let Err(e) = self.vote(&epoch).await {
                warn!(epoch = %epoch.id, error = %e, "vote failed, will retry next tick");
                return;
            }
        }
    }

    /// The main poll loop. Runs until `shutdown` resolves; cancellation
    /// is cooperative and only honored at the tick boundary.
    pub async fn run(mut self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("shutdown requested, exiting poll loop");
                        break;
                    }
                }
            }
        }
    }
}

fn addresses_match(hex_addr: &str, raw: &[u8; 20]) -> bool {
    reward_abi::parse_address(hex_addr).map(|a| a == *raw).unwrap_or(false)
}
