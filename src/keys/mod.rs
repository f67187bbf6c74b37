//! Key and address derivation
//!
//! Turns a raw secp256k1 private scalar into the public key, the P2PKH
//! address and the WIF string for both the compressed and the uncompressed
//! encoding, and defines the [`RecoveredKey`] records the rest of the
//! pipeline fills in.

pub mod derivation;
pub mod network;
pub mod recovered_key;

pub use derivation::{
    address_from_public_key, compress_public_key, decode_address, decode_wif,
    derive_recovered_keys, private_key_to_wif, DecodedWif, DerivedKeyPair,
};
pub use network::Network;
pub use recovered_key::{BalanceCheckStatus, RecoveredKey, RecoveryResult, WalletStats};
