//! Unlock state machine: `LockedWallet -> UnlockedWallet -> ExtractedKeys`
//!
//! Each stage borrows the shared [`WalletContainer`], so any number of
//! sessions can run against one loaded wallet at the same time. The master
//! key and the decrypted private keys are zeroized when dropped.

use zeroize::Zeroizing;

use super::bitcoin_core::decrypt_master_key;
use crate::{
    container::{RecordId, WalletContainer},
    crypto::{decrypt_aes256_cbc, split_iv, KEY_LEN},
    keys::{derive_recovered_keys, DerivedKeyPair, Network, RecoveredKey},
};

/// A loaded wallet whose master key is still encrypted
#[derive(Debug, Clone, Copy)]
pub struct LockedWallet<'a> {
    container: &'a WalletContainer,
}

impl<'a> LockedWallet<'a> {
    pub fn new(container: &'a WalletContainer) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &'a WalletContainer {
        self.container
    }

    /// Try every master-key record in order. A wrong password hands the
    /// locked wallet back unchanged.
    pub fn unlock(self, password: &str) -> Result<UnlockedWallet<'a>, LockedWallet<'a>> {
        for (id, record) in self.container.master_keys() {
            if let Some(master_key) = decrypt_master_key(password, record) {
                tracing::debug!(record = %id, "Master key unlocked");
                return Ok(UnlockedWallet {
                    container: self.container,
                    master_key,
                    master_key_id: id,
                });
            }
        }
        Err(self)
    }
}

/// A wallet with its plaintext master key in hand
pub struct UnlockedWallet<'a> {
    container: &'a WalletContainer,
    master_key: Zeroizing<[u8; KEY_LEN]>,
    master_key_id: RecordId,
}

impl std::fmt::Debug for UnlockedWallet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockedWallet")
            .field("master_key_id", &self.master_key_id)
            .finish_non_exhaustive()
    }
}

impl<'a> UnlockedWallet<'a> {
    /// The master-key record that accepted the password
    pub fn master_key_id(&self) -> RecordId {
        self.master_key_id
    }

    pub fn master_key(&self) -> &[u8; KEY_LEN] {
        &self.master_key
    }

    pub fn extract_keys(self) -> ExtractedKeys<'a> {
        let secrets = extract_private_keys(self.container, self.master_key.as_slice());
        ExtractedKeys {
            container: self.container,
            skipped: self.container.encrypted_key_count() - secrets.len(),
            secrets,
        }
    }
}

/// The decrypted private keys of a wallet
pub struct ExtractedKeys<'a> {
    container: &'a WalletContainer,
    secrets: Vec<(RecordId, Zeroizing<[u8; KEY_LEN]>)>,
    skipped: usize,
}

impl std::fmt::Debug for ExtractedKeys<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractedKeys")
            .field("keys", &self.secrets.len())
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

impl ExtractedKeys<'_> {
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Encrypted-key records that could not be decrypted
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn secrets(&self) -> &[(RecordId, Zeroizing<[u8; KEY_LEN]>)] {
        &self.secrets
    }

    /// Derive the compressed and uncompressed entries of every key, labelled
    /// from the container
    pub fn to_recovered_keys(&self, network: Network) -> Vec<RecoveredKey> {
        let labels = self.container.labels();
        self.secrets
            .iter()
            .flat_map(|(id, secret)| {
                derive_recovered_keys(secret.as_slice(), network, labels).unwrap_or_else(|e| {
                    tracing::warn!(record = %id, "Skipping key: {e}");
                    Vec::new()
                })
            })
            .collect()
    }
}

/// Decrypt every encrypted-key record with `master_key`.
///
/// Records that are too short, fail to decrypt, do not yield exactly 32
/// bytes or are not a valid secp256k1 scalar are skipped. A derived public
/// key that differs from the stored one is reported but kept.
pub fn extract_private_keys(
    container: &WalletContainer,
    master_key: &[u8],
) -> Vec<(RecordId, Zeroizing<[u8; KEY_LEN]>)> {
    if master_key.len() != KEY_LEN {
        tracing::warn!(len = master_key.len(), "Master key has the wrong length");
        return Vec::new();
    }

    let mut secrets = Vec::new();
    for (id, record) in container.encrypted_keys() {
        let Some((iv, ciphertext)) = split_iv(&record.encrypted_private_key) else {
            tracing::debug!(record = %id, "Encrypted key too short");
            continue;
        };

        let plaintext = match decrypt_aes256_cbc(master_key, iv, ciphertext) {
            Ok(plaintext) => Zeroizing::new(plaintext),
            Err(e) => {
                tracing::debug!(record = %id, "Encrypted key did not decrypt: {e}");
                continue;
            }
        };

        let Ok(secret) = <[u8; KEY_LEN]>::try_from(plaintext.as_slice()) else {
            tracing::debug!(record = %id, len = plaintext.len(), "Decrypted key has the wrong length");
            continue;
        };
        let secret = Zeroizing::new(secret);

        match DerivedKeyPair::from_secret(secret.as_slice()) {
            Ok(pair) => {
                if pair.compressed() != &record.public_key {
                    tracing::warn!(
                        record = %id,
                        stored = %hex::encode(record.public_key),
                        derived = %hex::encode(pair.compressed()),
                        "Stored public key does not match the decrypted key"
                    );
                }
            }
            Err(e) => {
                tracing::debug!(record = %id, "Decrypted key is unusable: {e}");
                continue;
            }
        }

        secrets.push((id, secret));
    }

    tracing::debug!(
        decrypted = secrets.len(),
        total = container.encrypted_key_count(),
        "Private keys extracted"
    );
    secrets
}
