//! Synthesize container bytes in the layout [`load`](super::load) understands.
//!
//! Used to build fixtures for tests and for exercising the recovery pipeline
//! without a real `wallet.dat`.

use super::parser::{
    ENCRYPTED_BLOB_LEN, ENCRYPTED_KEY_MARKER, LABEL_MARKER, MAGIC_BE, MAGIC_LE, MASTER_KEY_MARKER,
    PAGE_SIZE, PUBLIC_KEY_LEN,
};
use crate::{
    crypto::{derive_key, encrypt_aes256_cbc, IV_LEN},
    errors::{RecoveryError, WalletResult},
    keys::DerivedKeyPair,
};

const HEADER_LEN: usize = 16;
const RECORD_GAP: usize = 4;

#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    magic: u32,
    body: Vec<u8>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            magic: MAGIC_LE,
            body: Vec::new(),
        }
    }

    /// Write the byte-swapped magic variant
    pub fn big_endian(mut self) -> Self {
        self.magic = MAGIC_BE;
        self
    }

    /// Encrypt `master_key` under `password` and append an `mkey` record
    pub fn with_master_key(
        self,
        password: &str,
        salt: [u8; 8],
        iterations: u32,
        master_key: &[u8; 32],
    ) -> WalletResult<Self> {
        let derived = derive_key(password, &salt, iterations);
        let blob = seal(derived.as_slice(), master_key)?;

        let mut record = MASTER_KEY_MARKER.to_vec();
        record.extend_from_slice(&salt);
        record.extend_from_slice(&blob);
        record.extend_from_slice(&0u32.to_le_bytes());
        record.extend_from_slice(&iterations.to_le_bytes());
        Ok(self.push_record(&record))
    }

    /// Encrypt `secret` under `master_key` and append a `ckey` record
    pub fn with_encrypted_key(self, master_key: &[u8; 32], secret: &[u8; 32]) -> WalletResult<Self> {
        let pair = DerivedKeyPair::from_secret(secret)?;
        let blob = seal(master_key, secret)?;
        let blob: [u8; ENCRYPTED_BLOB_LEN] = blob
            .as_slice()
            .try_into()
            .map_err(|_| RecoveryError::InvalidArgument("unexpected ciphertext length".into()))?;
        Ok(self.with_raw_encrypted_key(*pair.compressed(), blob))
    }

    /// Append a `ckey` record with caller-supplied bytes
    pub fn with_raw_encrypted_key(
        self,
        public_key: [u8; PUBLIC_KEY_LEN],
        blob: [u8; ENCRYPTED_BLOB_LEN],
    ) -> Self {
        let mut record = ENCRYPTED_KEY_MARKER.to_vec();
        record.extend_from_slice(&public_key);
        record.extend_from_slice(&blob);
        self.push_record(&record)
    }

    /// Append a `name` record mapping an address to a label
    pub fn with_label(self, address: &str, label: &str) -> WalletResult<Self> {
        let address_len = u8::try_from(address.len())
            .map_err(|_| RecoveryError::InvalidArgument("address too long".into()))?;
        let label_len = u8::try_from(label.len())
            .map_err(|_| RecoveryError::InvalidArgument("label too long".into()))?;

        let mut record = LABEL_MARKER.to_vec();
        record.push(address_len);
        record.extend_from_slice(address.as_bytes());
        record.push(label_len);
        record.extend_from_slice(label.as_bytes());
        Ok(self.push_record(&record))
    }

    /// Append arbitrary bytes, e.g. noise between records
    pub fn with_raw_bytes(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Finish the container, padded to whole pages plus one trailing page
    pub fn build(self) -> Vec<u8> {
        let mut data = self.magic.to_le_bytes().to_vec();
        data.resize(HEADER_LEN, 0);
        data.extend_from_slice(&self.body);

        let pages = data.len().div_ceil(PAGE_SIZE) + 1;
        data.resize(pages * PAGE_SIZE, 0);
        data
    }

    fn push_record(mut self, record: &[u8]) -> Self {
        self.body.extend_from_slice(record);
        self.body.extend_from_slice(&[0u8; RECORD_GAP]);
        self
    }
}

/// `IV ‖ AES-256-CBC(key, IV, plaintext)` with a random IV
fn seal(key: &[u8], plaintext: &[u8]) -> WalletResult<Vec<u8>> {
    let iv: [u8; IV_LEN] = rand::random();
    let mut blob = iv.to_vec();
    blob.extend_from_slice(&encrypt_aes256_cbc(key, &iv, plaintext)?);
    Ok(blob)
}
