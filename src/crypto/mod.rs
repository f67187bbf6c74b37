//! Cryptographic primitives used by the recovery pipeline
//!
//! - [`kdf`]: PBKDF2-HMAC-SHA512 password key derivation
//! - [`cipher`]: AES-256-CBC with PKCS#7 padding
//! - [`hash`]: SHA-256d and hash160
//! - [`base58`]: base58check encoding and decoding

pub mod base58;
pub mod cipher;
pub mod hash;
pub mod kdf;

pub use base58::{decode_base58check, encode_base58check};
pub use cipher::{decrypt_aes256_cbc, encrypt_aes256_cbc, split_iv, IV_LEN, KEY_LEN};
pub use hash::{hash160, sha256d};
pub use kdf::{derive_key, DEFAULT_DERIVE_ITERATIONS};
