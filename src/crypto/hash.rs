//! Bitcoin hash helpers

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256 applied twice
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}
