use crate::{balance::BalanceSource, config::WalletConfig, errors::WalletError};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::{str::FromStr as _, time::Duration};

/// Solana JSON-RPC endpoint used as the production balance source.
#[derive(Debug, Clone)]
pub struct SolanaChain {
    pub rpc_url: String,
    pub timeout: Duration,
}

impl SolanaChain {
    pub fn new(rpc_url: &str, timeout: Duration) -> Self {
        Self {
            rpc_url: rpc_url.trim().to_owned(),
            timeout,
        }
    }

    pub fn from_config(cfg: &WalletConfig) -> Self {
        Self::new(&cfg.rpc_url, cfg.rpc_timeout)
    }

    fn rpc(&self) -> RpcClient {
        RpcClient::new_with_timeout_and_commitment(
            self.rpc_url.clone(),
            self.timeout,
            CommitmentConfig::confirmed(),
        )
    }

    pub fn parse_pubkey(s: &str) -> Result<Pubkey, WalletError> {
        Pubkey::from_str(s.trim())
            .map_err(|e| WalletError::InvalidPublicKey(format!("{s} ({e})")))
    }
}

impl BalanceSource for SolanaChain {
    async fn get_lamports(&self, owner: &Pubkey) -> Result<u64, WalletError> {
        tracing::debug!(rpc_url = %self.rpc_url, owner = %owner, "getBalance");
        self.rpc()
            .get_balance(owner)
            .await
            .map_err(|e| WalletError::Network(format!("{}: {e}", self.rpc_url)))
    }
}
