use std::{path::PathBuf, time::Duration};

pub const SOLANA_MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_WALLET_DIR: &str = "./wallets";
pub const WALLET_FILE_PREFIX: &str = "wallet_";
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_RPC_TIMEOUT_SECS: &str = "RPC_TIMEOUT_SECS";
pub const ENV_LOG_DIR: &str = "SOLKEEP_LOG_DIR";

/// Process-wide settings, resolved once at startup and handed to each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Solana JSON-RPC endpoint used for balance lookups and stamped into new records.
    pub rpc_url: String,
    /// Directory holding one JSON file per wallet.
    pub wallet_dir: PathBuf,
    /// Prefix for generated wallet file names.
    pub file_prefix: String,
    pub rpc_timeout: Duration,
    /// Optional directory for a JSON log file in addition to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: SOLANA_MAINNET_RPC_URL.into(),
            wallet_dir: PathBuf::from(DEFAULT_WALLET_DIR),
            file_prefix: WALLET_FILE_PREFIX.into(),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            log_dir: None,
        }
    }
}

impl WalletConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`WalletConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get(ENV_RPC_URL) {
            cfg.rpc_url = url;
        }
        if let Some(n) = get(ENV_RPC_TIMEOUT_SECS).and_then(|v| v.parse::<u64>().ok()) {
            if n > 0 {
                cfg.rpc_timeout = Duration::from_secs(n);
            }
        }
        cfg.log_dir = get(ENV_LOG_DIR).map(PathBuf::from);
        cfg
    }

    /// Apply command-line overrides on top of the environment.
    #[must_use]
    pub fn with_overrides(mut self, rpc_url: Option<String>, wallet_dir: Option<PathBuf>) -> Self {
        if let Some(url) = rpc_url.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty()) {
            self.rpc_url = url;
        }
        if let Some(dir) = wallet_dir {
            self.wallet_dir = dir;
        }
        self
    }
}
