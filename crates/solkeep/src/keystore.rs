use crate::{
    amount::Sol,
    balance::{BalanceLookup, BalanceSource},
    chains::solana::SolanaChain,
    config::WalletConfig,
    errors::WalletError,
    wallet::{WalletRecord, WalletStore, WriteMode},
};
use base64::Engine as _;
use solana_keypair::Keypair;
use solana_signer::Signer as _;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use zeroize::{Zeroize as _, Zeroizing};

/// Raw keypair bytes. Wiped on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct SecretKeyBytes(Zeroizing<Vec<u8>>);

impl SecretKeyBytes {
    fn from_keypair(kp: &Keypair) -> Self {
        let mut bytes = kp.to_bytes();
        let out = Self(Zeroizing::new(bytes.to_vec()));
        bytes.zeroize();
        out
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.as_bytes())
    }
}

impl fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKeyBytes([REDACTED; {}])", self.0.len())
    }
}

#[derive(Debug, Clone)]
pub struct CreatedWallet {
    pub record: WalletRecord,
    pub file_name: String,
    pub file_path: PathBuf,
    pub secret_key: SecretKeyBytes,
    pub balance: Sol,
}

#[derive(Debug, Clone)]
pub struct ImportedWallet {
    pub public_key: String,
    pub secret_key: SecretKeyBytes,
    pub balance: Sol,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct WalletListing {
    pub file_name: String,
    pub path: PathBuf,
    pub public_key: String,
    pub balance: Sol,
    pub created_at: String,
}

/// Wallet operations over a directory of wallet files and a balance source.
#[derive(Debug, Clone)]
pub struct Keystore<S> {
    cfg: WalletConfig,
    wallets: WalletStore,
    balances: BalanceLookup<S>,
}

impl Keystore<SolanaChain> {
    pub fn open(cfg: WalletConfig) -> Self {
        let sol = SolanaChain::from_config(&cfg);
        Self::with_source(cfg, sol)
    }
}

impl<S: BalanceSource> Keystore<S> {
    pub fn with_source(cfg: WalletConfig, source: S) -> Self {
        let wallets = WalletStore::new(cfg.wallet_dir.clone());
        Self {
            cfg,
            wallets,
            balances: BalanceLookup::new(source),
        }
    }

    pub const fn store(&self) -> &WalletStore {
        &self.wallets
    }

    /// Generate a keypair, persist it and report its (fail-soft) balance.
    ///
    /// `name`, trimmed, is the file name when non-empty; otherwise the name is
    /// derived from the public key. Nothing is rolled back if a later step fails.
    pub async fn create_wallet(
        &self,
        name: Option<&str>,
        mode: WriteMode,
    ) -> Result<CreatedWallet, WalletError> {
        self.wallets.ensure_directory()?;

        let kp = Keypair::new();
        let secret_key = SecretKeyBytes::from_keypair(&kp);
        let record = WalletRecord {
            public_key: kp.pubkey().to_string(),
            secret_key_base64: secret_key.to_base64(),
            created_at: utc_now_iso(),
            network: self.cfg.rpc_url.clone(),
        };

        // Surrounding whitespace is stripped from explicit names; a blank name counts as absent.
        let file_name = match name.map(str::trim).filter(|s| !s.is_empty()) {
            Some(n) => n.to_owned(),
            None => record.default_file_name(&self.cfg.file_prefix),
        };
        let file_path = self.wallets.write(&record, &file_name, mode)?;
        tracing::info!(
            file = %file_path.display(),
            public_key = %record.public_key,
            "wallet created"
        );

        let balance = self.balances.get_balance_or_zero(&record.public_key).await;

        Ok(CreatedWallet {
            record,
            file_name,
            file_path,
            secret_key,
            balance,
        })
    }

    /// Load a wallet file, verify its keypair and report its (fail-soft) balance.
    pub async fn import_wallet(&self, path: &Path) -> Result<ImportedWallet, WalletError> {
        let record = WalletStore::read(path)?;
        let (kp, secret_key) = keypair_from_record(&record)?;

        let derived = kp.pubkey().to_string();
        if derived != record.public_key {
            return Err(WalletError::Integrity {
                stored: record.public_key,
                derived,
            });
        }
        tracing::info!(file = %path.display(), public_key = %derived, "wallet imported");

        let balance = self.balances.get_balance_or_zero(&derived).await;

        Ok(ImportedWallet {
            public_key: derived,
            secret_key,
            balance,
            created_at: record.created_at,
        })
    }

    /// Every stored wallet with a live (fail-soft) balance, looked up one at a time.
    pub async fn list_wallets(&self) -> Result<Vec<WalletListing>, WalletError> {
        let stored = self.wallets.list_all()?;
        let mut out = Vec::with_capacity(stored.len());
        for w in stored {
            let balance = self.balances.get_balance_or_zero(&w.record.public_key).await;
            out.push(WalletListing {
                file_name: w.file_name,
                path: w.path,
                public_key: w.record.public_key,
                balance,
                created_at: w.record.created_at,
            });
        }
        tracing::debug!(count = out.len(), dir = %self.wallets.dir().display(), "wallets listed");
        Ok(out)
    }

    /// Strict balance lookup for an arbitrary public key.
    pub async fn balance(&self, public_key: &str) -> Result<Sol, WalletError> {
        self.balances.get_balance(public_key).await
    }
}

fn keypair_from_record(record: &WalletRecord) -> Result<(Keypair, SecretKeyBytes), WalletError> {
    let raw = Zeroizing::new(
        base64::engine::general_purpose::STANDARD
            .decode(record.secret_key_base64.trim())
            .map_err(|e| WalletError::InvalidSecretKey(format!("base64: {e}")))?,
    );
    let kp = Keypair::try_from(raw.as_slice())
        .map_err(|e| WalletError::InvalidSecretKey(format!("keypair bytes: {e}")))?;
    let secret_key = SecretKeyBytes(raw);
    Ok((kp, secret_key))
}

/// Current UTC time, `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn utc_now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::testing::FakeSource;
    use eyre::Context as _;
    use std::collections::BTreeSet;

    fn cfg_in(dir: &Path) -> WalletConfig {
        WalletConfig {
            rpc_url: "http://127.0.0.1:8899".to_owned(),
            wallet_dir: dir.join("wallets"),
            ..WalletConfig::default()
        }
    }

    #[tokio::test]
    async fn create_then_import_round_trips_public_key() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let ks = Keystore::with_source(cfg_in(td.path()), FakeSource::with_lamports(0));

        let created = ks.create_wallet(None, WriteMode::CreateNew).await?;
        assert!(created.file_path.is_file());
        assert!(created.file_name.starts_with("wallet_"));
        assert!(created.file_name.ends_with(".json"));
        assert_eq!(created.secret_key.as_bytes().len(), 64);
        assert_eq!(created.record.network, "http://127.0.0.1:8899");
        assert_eq!(created.balance, Sol::ZERO);

        let imported = ks.import_wallet(&created.file_path).await?;
        assert_eq!(imported.public_key, created.record.public_key);
        assert_eq!(imported.created_at, created.record.created_at);
        assert_eq!(
            imported.secret_key.as_bytes(),
            created.secret_key.as_bytes()
        );
        Ok(())
    }

    #[tokio::test]
    async fn explicit_name_scenario() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let ks = Keystore::with_source(cfg_in(td.path()), FakeSource::with_lamports(0));

        let created = ks.create_wallet(Some("test.json"), WriteMode::CreateNew).await?;
        let expected = td.path().join("wallets").join("test.json");
        assert_eq!(created.file_path, expected);

        let v: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&expected).context("read wallet file")?,
        )
        .context("parse wallet file")?;
        let pk = v
            .get("publicKey")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| eyre::eyre!("missing publicKey"))?;
        assert!((32..=44).contains(&pk.len()), "unexpected length {}", pk.len());
        SolanaChain::parse_pubkey(pk)?;

        let imported = ks.import_wallet(&expected).await?;
        assert_eq!(imported.public_key, pk);
        Ok(())
    }

    #[tokio::test]
    async fn blank_name_falls_back_to_generated_name() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let ks = Keystore::with_source(cfg_in(td.path()), FakeSource::with_lamports(0));
        let created = ks.create_wallet(Some("  "), WriteMode::CreateNew).await?;
        assert_eq!(
            created.file_name,
            created.record.default_file_name("wallet_")
        );
        Ok(())
    }

    #[tokio::test]
    async fn explicit_name_is_trimmed() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let ks = Keystore::with_source(cfg_in(td.path()), FakeSource::with_lamports(0));
        let created = ks.create_wallet(Some(" test.json "), WriteMode::CreateNew).await?;
        assert_eq!(created.file_name, "test.json");
        assert!(td.path().join("wallets").join("test.json").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn create_refuses_to_clobber_existing_file() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let ks = Keystore::with_source(cfg_in(td.path()), FakeSource::with_lamports(0));
        let first = ks.create_wallet(Some("a.json"), WriteMode::CreateNew).await?;

        let err = ks.create_wallet(Some("a.json"), WriteMode::CreateNew).await;
        assert!(matches!(err, Err(WalletError::AlreadyExists(_))));
        let still = ks.import_wallet(&first.file_path).await?;
        assert_eq!(still.public_key, first.record.public_key);

        let second = ks.create_wallet(Some("a.json"), WriteMode::Overwrite).await?;
        let now = ks.import_wallet(&second.file_path).await?;
        assert_eq!(now.public_key, second.record.public_key);
        Ok(())
    }

    #[tokio::test]
    async fn import_detects_public_key_mismatch() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let ks = Keystore::with_source(cfg_in(td.path()), FakeSource::with_lamports(0));
        ks.store().ensure_directory()?;

        let a = Keypair::new();
        let b = Keypair::new();
        let record = WalletRecord {
            public_key: a.pubkey().to_string(),
            secret_key_base64: SecretKeyBytes::from_keypair(&b).to_base64(),
            created_at: utc_now_iso(),
            network: "http://127.0.0.1:8899".to_owned(),
        };
        let path = ks
            .store()
            .write(&record, "tampered.json", WriteMode::CreateNew)?;

        match ks.import_wallet(&path).await {
            Err(WalletError::Integrity { stored, derived }) => {
                assert_eq!(stored, a.pubkey().to_string());
                assert_eq!(derived, b.pubkey().to_string());
            }
            other => eyre::bail!("expected integrity error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn import_rejects_undecodable_secret() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let ks = Keystore::with_source(cfg_in(td.path()), FakeSource::with_lamports(0));
        ks.store().ensure_directory()?;

        let record = WalletRecord {
            public_key: Keypair::new().pubkey().to_string(),
            secret_key_base64: "!!not base64!!".to_owned(),
            created_at: utc_now_iso(),
            network: String::new(),
        };
        let path = ks.store().write(&record, "bad.json", WriteMode::CreateNew)?;
        assert!(matches!(
            ks.import_wallet(&path).await,
            Err(WalletError::InvalidSecretKey(_))
        ));

        let short = WalletRecord {
            secret_key_base64: base64::engine::general_purpose::STANDARD.encode([7_u8; 10]),
            ..record
        };
        let path = ks.store().write(&short, "short.json", WriteMode::CreateNew)?;
        assert!(matches!(
            ks.import_wallet(&path).await,
            Err(WalletError::InvalidSecretKey(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn import_of_missing_file_is_not_found_without_rpc() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let src = FakeSource::with_lamports(0);
        let ks = Keystore::with_source(cfg_in(td.path()), &src);

        let missing = td.path().join("wallets").join("does-not-exist.json");
        assert!(matches!(
            ks.import_wallet(&missing).await,
            Err(WalletError::NotFound(_))
        ));
        assert_eq!(src.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn list_returns_every_created_wallet() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let src = FakeSource::with_lamports(1_250_000_000);
        let ks = Keystore::with_source(cfg_in(td.path()), &src);

        let mut created = BTreeSet::new();
        for i in 0..3 {
            let name = format!("w{i}.json");
            let w = ks
                .create_wallet(Some(name.as_str()), WriteMode::CreateNew)
                .await?;
            created.insert(w.record.public_key);
        }

        let listed = ks.list_wallets().await?;
        assert_eq!(listed.len(), 3);
        let listed_keys: BTreeSet<String> =
            listed.iter().map(|w| w.public_key.clone()).collect();
        assert_eq!(listed_keys, created);
        assert!(listed.iter().all(|w| w.balance.to_string() == "1.25"));
        // 3 lookups while creating, 3 while listing.
        assert_eq!(src.calls(), 6);
        Ok(())
    }

    #[tokio::test]
    async fn balance_failures_do_not_break_create_or_list() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let ks = Keystore::with_source(cfg_in(td.path()), FakeSource::failing());

        let created = ks.create_wallet(None, WriteMode::CreateNew).await?;
        assert_eq!(created.balance, Sol::ZERO);
        let listed = ks.list_wallets().await?;
        assert_eq!(listed.len(), 1);
        assert!(ks.balance(&created.record.public_key).await.is_err());
        Ok(())
    }

    #[test]
    fn secret_bytes_are_redacted_in_debug() {
        let s = SecretKeyBytes::from_keypair(&Keypair::new());
        let dbg = format!("{s:?}");
        assert_eq!(dbg, "SecretKeyBytes([REDACTED; 64])");
    }

    #[test]
    fn timestamps_are_iso_8601_utc() -> eyre::Result<()> {
        let ts = utc_now_iso();
        assert!(ts.ends_with('Z'), "{ts}");
        chrono::DateTime::parse_from_rfc3339(&ts).context("parse timestamp")?;
        Ok(())
    }
}
