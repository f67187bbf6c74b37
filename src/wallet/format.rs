//! Wallet kind detection from file contents

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{container::parser::check_magic, crypto::decode_base58check};

/// Known wallet kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletFormat {
    Unknown,
    BitcoinCore,
    Electrum,
    MultiBit,
    Armory,
    Bip38Key,
}

impl WalletFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletFormat::Unknown => "unknown",
            WalletFormat::BitcoinCore => "bitcoin-core",
            WalletFormat::Electrum => "electrum",
            WalletFormat::MultiBit => "multibit",
            WalletFormat::Armory => "armory",
            WalletFormat::Bip38Key => "bip38",
        }
    }
}

impl fmt::Display for WalletFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symmetric scheme protecting a wallet's secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionType {
    Unknown,
    /// PBKDF2-HMAC-SHA512 key derivation followed by AES-256-CBC
    Aes256Cbc,
    Aes256Ctr,
    Scrypt,
    Pbkdf2,
    Bip38,
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncryptionType::Unknown => "unknown",
            EncryptionType::Aes256Cbc => "AES-256-CBC",
            EncryptionType::Aes256Ctr => "AES-256-CTR",
            EncryptionType::Scrypt => "scrypt",
            EncryptionType::Pbkdf2 => "PBKDF2",
            EncryptionType::Bip38 => "BIP38",
        };
        f.write_str(name)
    }
}

const ARMORY_MAGIC: &[u8] = b"\xbaWALLET\x00";
const OPENSSL_SALTED: &[u8] = b"Salted__";
/// base64 of `Salted__`
const OPENSSL_SALTED_B64: &str = "U2FsdGVkX1";
/// base64 of `BIE1`, Electrum's ECIES envelope
const ELECTRUM_ECIES_B64: &str = "QklFMQ";
const ELECTRUM_JSON_FIELDS: [&str; 3] = ["seed_version", "keystore", "wallet_type"];

const BIP38_KEY_CHARS: usize = 58;
const BIP38_PAYLOAD_LEN: usize = 39;

/// Identify the wallet kind of `data`. Never fails; unrecognised input is
/// [`WalletFormat::Unknown`].
pub fn detect_wallet_format(data: &[u8]) -> WalletFormat {
    if check_magic(data).is_ok() {
        return WalletFormat::BitcoinCore;
    }
    if data.starts_with(ARMORY_MAGIC) {
        return WalletFormat::Armory;
    }
    if data.starts_with(OPENSSL_SALTED) {
        return WalletFormat::MultiBit;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return WalletFormat::Unknown;
    };
    let text = text.trim();

    if is_electrum_json(text) || text.starts_with(ELECTRUM_ECIES_B64) {
        WalletFormat::Electrum
    } else if text.starts_with(OPENSSL_SALTED_B64) {
        WalletFormat::MultiBit
    } else if is_bip38_key(text) {
        WalletFormat::Bip38Key
    } else {
        WalletFormat::Unknown
    }
}

fn is_electrum_json(text: &str) -> bool {
    if !text.starts_with('{') {
        return false;
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => {
            ELECTRUM_JSON_FIELDS.iter().any(|f| map.contains_key(*f))
        }
        _ => false,
    }
}

/// A BIP38 key is 58 base58check characters starting with `6P`
pub fn is_bip38_key(text: &str) -> bool {
    text.len() == BIP38_KEY_CHARS
        && text.starts_with("6P")
        && decode_base58check(text).is_ok_and(|payload| payload.len() == BIP38_PAYLOAD_LEN)
}
