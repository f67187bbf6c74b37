//! AES-256-CBC with PKCS#7 padding
//!
//! Every encrypted blob in a container is stored as `IV (16 bytes) ‖ ciphertext`.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::errors::CryptoError;

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// AES-256 key length
pub const KEY_LEN: usize = 32;
/// CBC initialization vector length
pub const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Split a stored blob into its leading IV and the remaining ciphertext
pub fn split_iv(blob: &[u8]) -> Option<(&[u8], &[u8])> {
    if blob.len() < IV_LEN {
        return None;
    }
    Some(blob.split_at(IV_LEN))
}

/// Decrypt and strip PKCS#7 padding.
///
/// Returns [`CryptoError::BadPadding`] for an empty or misaligned ciphertext
/// and for invalid padding, which is what a wrong key almost always produces.
pub fn decrypt_aes256_cbc(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_lengths(key, iv)?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::BadPadding);
    }

    Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| CryptoError::invalid_length("key", KEY_LEN, key.len()))?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::BadPadding)
}

/// Encrypt with PKCS#7 padding
pub fn encrypt_aes256_cbc(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_lengths(key, iv)?;
    Ok(Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| CryptoError::invalid_length("key", KEY_LEN, key.len()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn check_lengths(key: &[u8], iv: &[u8]) -> Result<(), CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::invalid_length("key", KEY_LEN, key.len()));
    }
    if iv.len() != IV_LEN {
        return Err(CryptoError::invalid_length("iv", IV_LEN, iv.len()));
    }
    Ok(())
}
