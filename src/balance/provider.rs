use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::NetworkError;

/// Balance and activity of one address as reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressBalance {
    pub balance_satoshis: u64,
    pub tx_count: i32,
}

impl AddressBalance {
    pub fn new(balance_satoshis: u64, tx_count: i32) -> Self {
        Self {
            balance_satoshis,
            tx_count,
        }
    }
}

/// A read-only balance lookup service
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Short provider name used in logs and errors
    fn name(&self) -> &str;

    /// Look up one address. Any failure means "try the next provider".
    async fn query(&self, address: &str) -> Result<AddressBalance, NetworkError>;
}
