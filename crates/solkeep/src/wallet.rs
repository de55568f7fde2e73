use crate::{chains::solana::SolanaChain, errors::WalletError};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const WALLET_FILE_EXT: &str = ".json";
const PUBKEY_PREFIX_LEN: usize = 8;

/// One persisted keypair. Field names match the on-disk JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    /// Base58 public key.
    pub public_key: String,
    /// Standard base64 of the 64-byte Solana keypair bytes.
    pub secret_key_base64: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RPC endpoint active when the wallet was created. Informational only.
    pub network: String,
}

impl WalletRecord {
    /// Generated file name: `<prefix><first 8 chars of the public key>.json`.
    pub fn default_file_name(&self, prefix: &str) -> String {
        let head: String = self.public_key.chars().take(PUBKEY_PREFIX_LEN).collect();
        format!("{prefix}{head}{WALLET_FILE_EXT}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Fail with [`WalletError::AlreadyExists`] if the target exists.
    #[default]
    CreateNew,
    /// Atomically replace any existing file.
    Overwrite,
}

/// A stored record together with the file name it was read from.
#[derive(Debug, Clone)]
pub struct StoredWallet {
    pub file_name: String,
    pub path: PathBuf,
    pub record: WalletRecord,
}

#[derive(Debug, Clone)]
pub struct WalletStore {
    dir: PathBuf,
}

impl WalletStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_directory(&self) -> Result<(), WalletError> {
        crate::fsutil::ensure_dir(&self.dir)
    }

    /// Resolve a bare file name inside the wallet directory.
    pub fn path_for(&self, file_name: &str) -> Result<PathBuf, WalletError> {
        let bad = file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\'])
            || file_name.contains('\0');
        if bad {
            return Err(WalletError::InvalidFileName(file_name.to_owned()));
        }
        Ok(self.dir.join(file_name))
    }

    /// Serialize `record` as pretty JSON into `<dir>/<file_name>`.
    pub fn write(
        &self,
        record: &WalletRecord,
        file_name: &str,
        mode: WriteMode,
    ) -> Result<PathBuf, WalletError> {
        let path = self.path_for(file_name)?;
        let s = serde_json::to_string_pretty(record).map_err(|e| WalletError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        match mode {
            WriteMode::CreateNew => crate::fsutil::write_new_private(&path, s.as_bytes())?,
            WriteMode::Overwrite => crate::fsutil::write_replace_private(&path, s.as_bytes())?,
        }
        tracing::debug!(path = %path.display(), "wallet file written");
        Ok(path)
    }

    /// Read and parse a wallet file. Shared by listing and import.
    pub fn read(path: &Path) -> Result<WalletRecord, WalletError> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WalletError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(WalletError::io("read", path, e)),
        };
        // Bytes that are not UTF-8 are a parse failure, not an IO one.
        let record: WalletRecord =
            serde_json::from_slice(&bytes).map_err(|e| WalletError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        SolanaChain::parse_pubkey(&record.public_key).map_err(|e| WalletError::Parse {
            path: path.to_path_buf(),
            message: format!("publicKey: {e}"),
        })?;
        Ok(record)
    }

    /// Every `*.json` file in the directory, in enumeration order.
    ///
    /// Files that cannot be read or parsed are logged and skipped.
    pub fn list_all(&self) -> Result<Vec<StoredWallet>, WalletError> {
        self.ensure_directory()?;
        let entries =
            fs::read_dir(&self.dir).map_err(|e| WalletError::io("read dir", &self.dir, e))?;

        let mut out = vec![];
        for entry in entries {
            let entry = entry.map_err(|e| WalletError::io("read dir entry", &self.dir, e))?;
            let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if !file_name.ends_with(WALLET_FILE_EXT) {
                continue;
            }
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match Self::read(&path) {
                Ok(record) => out.push(StoredWallet {
                    file_name,
                    path,
                    record,
                }),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable wallet file"),
            }
        }
        Ok(out)
    }
}
