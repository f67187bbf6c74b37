//! Windowed record scan over the container bytes
//!
//! The buffer is walked in [`PAGE_SIZE`] windows looking for three markers:
//!
//! ```text
//! mkey ‖ salt[8] ‖ blob[64] ‖ method:u32le ‖ iterations:u32le   (trailer optional)
//! ckey ‖ public_key[33] ‖ blob[64]
//! name ‖ len:u8 ‖ address ‖ len:u8 ‖ label
//! ```
//!
//! Every `blob` is `IV[16] ‖ ciphertext[48]`. Truncated or malformed records
//! are skipped and the scan continues.
//!
//! The `mkey` trailer is only honoured when it holds a known method, a
//! bounded iteration count and no record marker. Otherwise the record ends
//! after the blob and the iterations default to 25000.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use super::{
    records::{EncryptedKeyRecord, MasterKeyRecord, RecordId, WalletRecord},
    WalletContainer,
};
use crate::{crypto::DEFAULT_DERIVE_ITERATIONS, errors::FormatError};

/// Scan window size
pub const PAGE_SIZE: usize = 1024;

/// Accepted magic values, read little-endian from offset 0
pub const MAGIC_LE: u32 = 0x0006_1561;
pub const MAGIC_BE: u32 = 0x6115_0600;

pub const MASTER_KEY_MARKER: &[u8; 4] = b"mkey";
pub const ENCRYPTED_KEY_MARKER: &[u8; 4] = b"ckey";
pub const LABEL_MARKER: &[u8; 4] = b"name";

pub const SALT_LEN: usize = 8;
pub const ENCRYPTED_BLOB_LEN: usize = 64;
pub const PUBLIC_KEY_LEN: usize = 33;

const MARKER_LEN: usize = 4;
const MASTER_KEY_BODY_LEN: usize = SALT_LEN + ENCRYPTED_BLOB_LEN;
const MASTER_KEY_TRAILER_LEN: usize = 8;
const ENCRYPTED_KEY_BODY_LEN: usize = PUBLIC_KEY_LEN + ENCRYPTED_BLOB_LEN;
/// Positions this close to the end of the buffer are never scanned
const TAIL_GUARD: usize = 32;
/// Derivation methods this format defines (0 = SHA-512 KDF, 1 = other)
const MAX_DERIVATION_METHOD: u32 = 1;
/// Larger trailer iteration counts are treated as unrelated bytes
const MAX_TRAILER_ITERATIONS: u32 = DEFAULT_DERIVE_ITERATIONS * 1_000;

/// Parse container bytes into a registry.
///
/// Fails only on a bad magic number or when no master-key and no
/// encrypted-key record could be extracted.
pub fn load(data: Vec<u8>) -> Result<WalletContainer, FormatError> {
    check_magic(&data)?;
    debug!(len = data.len(), "Valid container magic detected");

    let (records, labels) = RecordScanner::new(&data).scan();

    let master_keys = records
        .values()
        .filter(|r| matches!(r, WalletRecord::MasterKey(_)))
        .count();
    let encrypted_keys = records.len() - master_keys;

    info!(
        master_keys,
        encrypted_keys,
        labels = labels.len(),
        "Parsed wallet container"
    );

    if records.is_empty() {
        return Err(FormatError::NoRecords);
    }

    Ok(WalletContainer::new(data, records, labels))
}

/// Check the 4-byte magic at the start of the buffer
pub fn check_magic(data: &[u8]) -> Result<(), FormatError> {
    let head: [u8; 4] = data
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(FormatError::TooShort { len: data.len() })?;

    match u32::from_le_bytes(head) {
        MAGIC_LE | MAGIC_BE => Ok(()),
        found => Err(FormatError::BadMagic { found }),
    }
}

enum Parsed {
    Record(WalletRecord, usize),
    Label(String, String, usize),
}

struct RecordScanner<'a> {
    data: &'a [u8],
    records: BTreeMap<RecordId, WalletRecord>,
    labels: HashMap<String, String>,
    next_id: u32,
}

impl<'a> RecordScanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            records: BTreeMap::new(),
            labels: HashMap::new(),
            next_id: 0,
        }
    }

    fn scan(mut self) -> (BTreeMap<RecordId, WalletRecord>, HashMap<String, String>) {
        let len = self.data.len();
        let mut offset = 0;
        // First position not covered by an already captured record
        let mut cursor = 0;

        while offset + PAGE_SIZE <= len {
            let end = (offset + PAGE_SIZE).min(len - TAIL_GUARD);
            let mut i = offset.max(cursor);

            while i < end {
                match self.parse_at(i) {
                    Some(Parsed::Record(record, consumed)) => {
                        let id = RecordId(self.next_id);
                        self.next_id += 1;
                        self.records.insert(id, record);
                        i += consumed;
                    }
                    Some(Parsed::Label(address, label, consumed)) => {
                        self.labels.insert(address, label);
                        i += consumed;
                    }
                    None => i += 1,
                }
            }

            cursor = cursor.max(i);
            offset += PAGE_SIZE;
        }

        (self.records, self.labels)
    }

    fn parse_at(&self, pos: usize) -> Option<Parsed> {
        let marker = self.data.get(pos..pos + MARKER_LEN)?;
        let body = pos + MARKER_LEN;

        let parsed = if marker == MASTER_KEY_MARKER {
            self.parse_master_key(body)
                .map(|(mk, n)| Parsed::Record(WalletRecord::MasterKey(mk), n))
        } else if marker == ENCRYPTED_KEY_MARKER {
            self.parse_encrypted_key(body)
                .map(|(ck, n)| Parsed::Record(WalletRecord::EncryptedKey(ck), n))
        } else if marker == LABEL_MARKER {
            self.parse_label(body)
                .map(|(address, label, n)| Parsed::Label(address, label, n))
        } else {
            return None;
        };

        if parsed.is_none() {
            debug!(offset = pos, "Skipping malformed record");
        }
        parsed.map(|p| match p {
            Parsed::Record(r, n) => Parsed::Record(r, MARKER_LEN + n),
            Parsed::Label(a, l, n) => Parsed::Label(a, l, MARKER_LEN + n),
        })
    }

    fn parse_master_key(&self, start: usize) -> Option<(MasterKeyRecord, usize)> {
        let body = self.data.get(start..start + MASTER_KEY_BODY_LEN)?;
        let (salt, encrypted_key) = body.split_at(SALT_LEN);

        let trailer_start = start + MASTER_KEY_BODY_LEN;
        let trailer = self
            .data
            .get(trailer_start..trailer_start + MASTER_KEY_TRAILER_LEN)
            .map(|t| (read_u32_le(&t[..4]), read_u32_le(&t[4..])))
            .filter(|&(method, iterations)| {
                method <= MAX_DERIVATION_METHOD
                    && (1..=MAX_TRAILER_ITERATIONS).contains(&iterations)
            })
            .filter(|_| !self.marker_within(trailer_start, MASTER_KEY_TRAILER_LEN));

        let (derivation_method, iterations, consumed) = match trailer {
            Some((method, iterations)) => (
                method,
                iterations,
                MASTER_KEY_BODY_LEN + MASTER_KEY_TRAILER_LEN,
            ),
            None => (0, DEFAULT_DERIVE_ITERATIONS, MASTER_KEY_BODY_LEN),
        };

        Some((
            MasterKeyRecord {
                encrypted_key: encrypted_key.to_vec(),
                salt: salt.to_vec(),
                iterations,
                derivation_method,
            },
            consumed,
        ))
    }

    /// Whether a record marker starts anywhere in `start..start + len`
    fn marker_within(&self, start: usize, len: usize) -> bool {
        (start..start + len).any(|pos| {
            self.data.get(pos..pos + MARKER_LEN).is_some_and(|m| {
                m == MASTER_KEY_MARKER || m == ENCRYPTED_KEY_MARKER || m == LABEL_MARKER
            })
        })
    }

    fn parse_encrypted_key(&self, start: usize) -> Option<(EncryptedKeyRecord, usize)> {
        let body = self.data.get(start..start + ENCRYPTED_KEY_BODY_LEN)?;
        let (public_key, blob) = body.split_at(PUBLIC_KEY_LEN);

        if !matches!(public_key[0], 0x02 | 0x03) {
            return None;
        }

        Some((
            EncryptedKeyRecord {
                public_key: public_key.try_into().ok()?,
                encrypted_private_key: blob.to_vec(),
            },
            ENCRYPTED_KEY_BODY_LEN,
        ))
    }

    fn parse_label(&self, start: usize) -> Option<(String, String, usize)> {
        let address_len = *self.data.get(start)? as usize;
        if address_len == 0 {
            return None;
        }
        let address = self.data.get(start + 1..start + 1 + address_len)?;
        if !address.iter().all(u8::is_ascii_alphanumeric) {
            return None;
        }

        let label_start = start + 1 + address_len;
        let label_len = *self.data.get(label_start)? as usize;
        let label = self.data.get(label_start + 1..label_start + 1 + label_len)?;
        let label = std::str::from_utf8(label).ok()?;

        Some((
            String::from_utf8_lossy(address).into_owned(),
            label.to_string(),
            2 + address_len + label_len,
        ))
    }
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}
