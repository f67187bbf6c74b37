use serde::{Deserialize, Serialize};

use crate::common::current_timestamp;

/// One recovered private key in one public-key encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredKey {
    pub address: String,
    pub private_key_hex: String,
    pub private_key_wif: String,
    pub public_key_hex: String,
    pub compressed: bool,
    pub label: String,
    /// Set only by the balance verifier
    pub balance_satoshis: u64,
    pub tx_count: i32,
    pub has_balance: bool,
}

impl RecoveredKey {
    pub fn new(
        address: String,
        private_key_hex: String,
        private_key_wif: String,
        public_key_hex: String,
        compressed: bool,
        label: String,
    ) -> Self {
        Self {
            address,
            private_key_hex,
            private_key_wif,
            public_key_hex,
            compressed,
            label,
            balance_satoshis: 0,
            tx_count: 0,
            has_balance: false,
        }
    }

    /// Whether the address has ever been used on chain
    pub fn has_activity(&self) -> bool {
        self.has_balance || self.tx_count > 0
    }
}

/// Outcome of the balance lookup stage of a recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceCheckStatus {
    /// Balance lookups were not requested
    Skipped,
    /// At least one address was resolved by a provider
    Completed,
    /// Every lookup failed; balances are unknown
    Unavailable,
}

/// Result of `recover_wallet`
///
/// `success == true` with `balance_check == Unavailable` is a partial
/// success: keys were recovered but their balances are unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryResult {
    pub success: bool,
    pub password: String,
    pub keys: Vec<RecoveredKey>,
    pub total_balance_satoshis: u64,
    pub total_addresses: usize,
    pub funded_addresses: usize,
    pub timestamp: String,
    pub balance_check: BalanceCheckStatus,
}

impl RecoveryResult {
    /// A failed recovery carries no keys
    pub fn failed(password: &str) -> Self {
        Self {
            success: false,
            password: password.to_string(),
            keys: Vec::new(),
            total_balance_satoshis: 0,
            total_addresses: 0,
            funded_addresses: 0,
            timestamp: current_timestamp(),
            balance_check: BalanceCheckStatus::Skipped,
        }
    }

    pub fn succeeded(password: &str, keys: Vec<RecoveredKey>, balance_check: BalanceCheckStatus) -> Self {
        let stats = WalletStats::from_keys(&keys);
        Self {
            success: true,
            password: password.to_string(),
            total_addresses: keys.len(),
            total_balance_satoshis: stats.total_balance,
            funded_addresses: stats.funded_addresses,
            keys,
            timestamp: current_timestamp(),
            balance_check,
        }
    }
}

/// Aggregate counts over a set of recovered keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletStats {
    pub total_keys: usize,
    pub compressed_keys: usize,
    pub uncompressed_keys: usize,
    pub funded_addresses: usize,
    pub total_balance: u64,
}

impl WalletStats {
    pub fn from_keys(keys: &[RecoveredKey]) -> Self {
        keys.iter().fold(
            Self {
                total_keys: keys.len(),
                ..Default::default()
            },
            |mut stats, key| {
                if key.compressed {
                    stats.compressed_keys += 1;
                } else {
                    stats.uncompressed_keys += 1;
                }
                if key.has_balance {
                    stats.funded_addresses += 1;
                }
                stats.total_balance = stats.total_balance.saturating_add(key.balance_satoshis);
                stats
            },
        )
    }
}
