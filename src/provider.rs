//! Chain state needed to complete a transaction before signing.

use async_trait::async_trait;

use crate::crypto::Address;
use crate::error::{AccountsError, Result};

/// Source of chain id, gas price and account nonces.
///
/// Implementations typically wrap a JSON-RPC client. Errors should be
/// reported as [`AccountsError::Provider`].
#[async_trait]
pub trait Provider: Send + Sync {
    async fn get_chain_id(&self) -> Result<u64>;

    async fn get_gas_price(&self) -> Result<u128>;

    /// Number of transactions sent from `address`, i.e. its next nonce.
    async fn get_transaction_count(&self, address: &Address) -> Result<u64>;
}

/// A provider with no connection. Every query fails, so only fully
/// populated transactions can be signed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

#[async_trait]
impl Provider for OfflineProvider {
    async fn get_chain_id(&self) -> Result<u64> {
        Err(AccountsError::Provider("offline: chain id unavailable".into()))
    }

    async fn get_gas_price(&self) -> Result<u128> {
        Err(AccountsError::Provider("offline: gas price unavailable".into()))
    }

    async fn get_transaction_count(&self, address: &Address) -> Result<u64> {
        Err(AccountsError::Provider(format!(
            "offline: nonce of {} unavailable",
            address
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_provider_fails() {
        let provider = OfflineProvider;
        assert!(matches!(
            provider.get_chain_id().await,
            Err(AccountsError::Provider(_))
        ));
        assert!(matches!(
            provider.get_gas_price().await,
            Err(AccountsError::Provider(_))
        ));
        assert!(matches!(
            provider
                .get_transaction_count(&Address::from_bytes([1; 20]))
                .await,
            Err(AccountsError::Provider(_))
        ));
    }
}
