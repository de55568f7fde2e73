use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("wallet file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("invalid wallet file name: {0:?}")]
    InvalidFileName(String),

    #[error("parse wallet file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("public key mismatch: file has {stored}, secret key derives {derived}")]
    Integrity { stored: String, derived: String },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("rpc request failed: {0}")]
    Network(String),

    #[error("{context} {}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WalletError {
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable code, used in JSON output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidFileName(_) => "invalid_file_name",
            Self::Parse { .. } => "parse_error",
            Self::Integrity { .. } => "integrity_error",
            Self::InvalidPublicKey(_) => "invalid_public_key",
            Self::InvalidSecretKey(_) => "invalid_secret_key",
            Self::Network(_) => "network_error",
            Self::Io { .. } => "io_error",
        }
    }
}
