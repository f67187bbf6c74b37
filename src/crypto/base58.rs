//! Base58check: `base58(payload ‖ sha256d(payload)[..4])`

use crate::errors::KeyError;

/// Encode a payload (version byte included) with a 4-byte checksum
pub fn encode_base58check(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decode a base58check string, verifying and stripping the checksum
pub fn decode_base58check(encoded: &str) -> Result<Vec<u8>, KeyError> {
    bs58::decode(encoded)
        .with_check(None)
        .into_vec()
        .map_err(|e| KeyError::Base58(e.to_string()))
}
