use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::format::{EncryptionType, WalletFormat};
use crate::{
    container::WalletContainer,
    crypto::{DEFAULT_DERIVE_ITERATIONS, IV_LEN, KEY_LEN},
};

/// Approximate cost of one password trial at the default iteration count
const BASELINE_TEST_TIME: Duration = Duration::from_millis(50);

/// Descriptive information about a loaded wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletMetadata {
    pub format: WalletFormat,
    pub encryption: EncryptionType,
    pub version: String,
    /// Iteration count of the first master key
    pub iterations: u32,
    /// Salt of the first master key, hex encoded
    pub salt: String,
    pub key_length: usize,
    pub iv_length: usize,
    pub master_key_count: usize,
    pub encrypted_key_count: usize,
}

impl WalletMetadata {
    pub fn for_container(container: &WalletContainer) -> Self {
        let first = container.master_keys().next().map(|(_, mk)| mk);
        Self {
            format: WalletFormat::BitcoinCore,
            encryption: EncryptionType::Aes256Cbc,
            version: "Bitcoin Core".to_string(),
            iterations: first.map_or(DEFAULT_DERIVE_ITERATIONS, |mk| mk.iterations),
            salt: first.map(|mk| hex::encode(&mk.salt)).unwrap_or_default(),
            key_length: KEY_LEN,
            iv_length: IV_LEN,
            master_key_count: container.master_key_count(),
            encrypted_key_count: container.encrypted_key_count(),
        }
    }

    /// Rough wall-clock cost of one password trial on one core
    pub fn estimated_test_time(&self) -> Duration {
        estimated_test_time(self.iterations)
    }
}

/// Trial cost scales linearly with the PBKDF2 iteration count
pub fn estimated_test_time(iterations: u32) -> Duration {
    let iterations = if iterations == 0 {
        DEFAULT_DERIVE_ITERATIONS
    } else {
        iterations
    };
    BASELINE_TEST_TIME * iterations / DEFAULT_DERIVE_ITERATIONS
}
