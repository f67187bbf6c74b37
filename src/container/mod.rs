//! Wallet container parsing
//!
//! A container is the raw `wallet.dat` byte buffer. [`load`] validates the
//! magic number and scans the buffer for tagged key records, producing an
//! immutable [`WalletContainer`] registry that password trials share.

pub mod builder;
pub mod parser;
pub mod records;

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

pub use builder::ContainerBuilder;
pub use parser::{load, PAGE_SIZE};
pub use records::{EncryptedKeyRecord, MasterKeyRecord, RecordId, WalletRecord};

use crate::errors::{FileAccessError, WalletResult};

/// Parsed, read-only registry of key material
#[derive(Debug, Clone)]
pub struct WalletContainer {
    data: Vec<u8>,
    records: BTreeMap<RecordId, WalletRecord>,
    labels: HashMap<String, String>,
}

impl WalletContainer {
    pub(crate) fn new(
        data: Vec<u8>,
        records: BTreeMap<RecordId, WalletRecord>,
        labels: HashMap<String, String>,
    ) -> Self {
        Self {
            data,
            records,
            labels,
        }
    }

    /// Read a container from disk and parse it
    pub fn from_file(path: impl AsRef<Path>) -> WalletResult<Self> {
        let data = read_container_file(path.as_ref())?;
        Ok(load(data)?)
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn record(&self, id: RecordId) -> Option<&WalletRecord> {
        self.records.get(&id)
    }

    pub fn records(&self) -> impl Iterator<Item = (RecordId, &WalletRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Master-key records in discovery order
    pub fn master_keys(&self) -> impl Iterator<Item = (RecordId, &MasterKeyRecord)> {
        self.records.iter().filter_map(|(id, record)| match record {
            WalletRecord::MasterKey(mk) => Some((*id, mk)),
            WalletRecord::EncryptedKey(_) => None,
        })
    }

    /// Encrypted private-key records in discovery order
    pub fn encrypted_keys(&self) -> impl Iterator<Item = (RecordId, &EncryptedKeyRecord)> {
        self.records.iter().filter_map(|(id, record)| match record {
            WalletRecord::EncryptedKey(ck) => Some((*id, ck)),
            WalletRecord::MasterKey(_) => None,
        })
    }

    pub fn master_key_count(&self) -> usize {
        self.master_keys().count()
    }

    pub fn encrypted_key_count(&self) -> usize {
        self.encrypted_keys().count()
    }

    /// Address labels found in the container, keyed by address
    pub fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }
}

pub(crate) fn read_container_file(path: &Path) -> Result<Vec<u8>, FileAccessError> {
    let data = std::fs::read(path).map_err(|e| FileAccessError::unreadable(path, e))?;
    if data.is_empty() {
        return Err(FileAccessError::empty(path));
    }
    Ok(data)
}
