use serde::{Deserialize, Serialize};

/// Synthetic sequence id assigned to records in discovery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u32);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The wallet master key, encrypted under a password-derived key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterKeyRecord {
    /// IV (16 bytes) followed by ciphertext
    pub encrypted_key: Vec<u8>,
    pub salt: Vec<u8>,
    pub iterations: u32,
    pub derivation_method: u32,
}

/// A private key encrypted under the master key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKeyRecord {
    pub public_key: [u8; 33],
    /// IV (16 bytes) followed by ciphertext
    pub encrypted_private_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletRecord {
    MasterKey(MasterKeyRecord),
    EncryptedKey(EncryptedKeyRecord),
}
