//! A thin typed facade over the ledger's generic JSON-RPC surface,
//! grounded on the Go source's `KwilApi` (`list_epochs`, `latest_finalized`,
//! `propose_epoch`, `vote_epoch`, `get_proof`). The ledger's own RPC
//! shape is out of scope — only this interface matters.

mod error;
mod types;

pub use error::LedgerError;
pub use types::{EpochReward, FinalizedReward, PendingReward};

use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::Deserialize;

pub struct LedgerClient {
    rpc: HttpClient,
}

impl LedgerClient {
    pub fn connect(url: &str) -> Result<Self, LedgerError> {
        let rpc = HttpClientBuilder::default()
            .build(url)
            .map_err(|e| LedgerError::Permanent(e.to_string()))?;
        Ok(Self { rpc })
    }

    /// Up to `limit` epochs with `start_height > after_height`, ascending
    /// height order.
    pub async fn fetch_epoch_rewards(
        &self,
        after_height: u64,
        limit: u32,
    ) -> Result<Vec<EpochReward>, LedgerError> {
        self.rpc
            .request("list_epochs", rpc_params![after_height, limit])
            .await
            .map_err(LedgerError::from)
    }

    /// Most recent finalized (quorum-signed) epochs, newest first.
    pub async fn fetch_latest_rewards(&self, limit: u32) -> Result<Vec<FinalizedReward>, LedgerError> {
        self.rpc
            .request("latest_finalized", rpc_params![limit])
            .await
            .map_err(LedgerError::from)
    }

    /// Submits a signer's vote; synchronous broadcast (waits for
    /// acceptance, not for ledger finality). Returns the tx hash.
    pub async fn vote_epoch(&self, sign_hash: &str, signature: &str) -> Result<String, LedgerError> {
        self.rpc
            .request("vote_epoch", rpc_params![sign_hash, signature])
            .await
            .map_err(LedgerError::from)
    }

    /// The Merkle proof a user submits on-chain to claim against
    /// `sign_hash`/`reward_root`.
    pub async fn get_proof(&self, sign_hash: &str, wallet: &str) -> Result<Vec<String>, LedgerError> {
        let response: ProofResponse = self
            .rpc
            .request("get_proof", rpc_params![sign_hash, wallet])
            .await
            .map_err(LedgerError::from)?;
        Ok(response.proof)
    }

    /// Submits a newly-minted epoch for signer attestation. Out-of-band
    /// from the signer/uploader daemons' main loops, but part of the
    /// same RPC surface.
    pub async fn propose_epoch(&self, start_height: u64, end_height: u64) -> Result<String, LedgerError> {
        self.rpc
            .request("propose_epoch", rpc_params![start_height, end_height])
            .await
            .map_err(LedgerError::from)
    }
}

#[derive(Debug, Deserialize)]
struct ProofResponse {
    proof: Vec<String>,
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient").finish_non_exhaustive()
    }
}
