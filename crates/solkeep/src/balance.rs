use crate::{
    amount::{lamports_to_sol, Sol},
    chains::solana::SolanaChain,
    errors::WalletError,
};
use solana_sdk::pubkey::Pubkey;

/// Anything that can report the native lamport balance of an account.
pub trait BalanceSource {
    async fn get_lamports(&self, owner: &Pubkey) -> Result<u64, WalletError>;
}

/// Balance lookup in display units.
///
/// Two entry points make the failure policy explicit at the call site:
/// [`BalanceLookup::get_balance`] surfaces errors, while
/// [`BalanceLookup::get_balance_or_zero`] logs them and reports zero.
#[derive(Debug, Clone)]
pub struct BalanceLookup<S> {
    source: S,
}

impl<S: BalanceSource> BalanceLookup<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn get_balance(&self, public_key: &str) -> Result<Sol, WalletError> {
        let owner = SolanaChain::parse_pubkey(public_key)?;
        let lamports = self.source.get_lamports(&owner).await?;
        Ok(lamports_to_sol(lamports))
    }

    /// Fail-soft lookup: any error (bad key, unreachable node, RPC error) yields zero.
    pub async fn get_balance_or_zero(&self, public_key: &str) -> Sol {
        match self.get_balance(public_key).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    public_key,
                    error = %e,
                    code = e.code(),
                    "balance lookup failed; reporting 0"
                );
                Sol::ZERO
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that counts calls and either returns a fixed balance or fails.
    #[derive(Debug, Default)]
    pub struct FakeSource {
        pub lamports: u64,
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl FakeSource {
        pub fn with_lamports(lamports: u64) -> Self {
            Self {
                lamports,
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl BalanceSource for FakeSource {
        async fn get_lamports(&self, _owner: &Pubkey) -> Result<u64, WalletError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WalletError::Network("connection refused".to_owned()));
            }
            Ok(self.lamports)
        }
    }

    impl<S: BalanceSource> BalanceSource for &S {
        async fn get_lamports(&self, owner: &Pubkey) -> Result<u64, WalletError> {
            (**self).get_lamports(owner).await
        }
    }
}
