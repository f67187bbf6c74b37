//! Wallet handling
//!
//! [`detect_wallet_format`] identifies a wallet file from its contents and
//! [`create_wallet_handler`] wraps supported kinds in a [`WalletHandler`].
//! Bitcoin Core containers are handled by [`BitcoinCoreWallet`], which is the
//! password oracle and the entry point for key recovery.

pub mod bitcoin_core;
pub mod format;
pub mod handler;
pub mod metadata;
pub mod session;

pub use bitcoin_core::{decrypt_master_key, BitcoinCoreWallet, RecoveryOptions};
pub use format::{detect_wallet_format, EncryptionType, WalletFormat};
pub use handler::{create_wallet_handler, WalletFormatHandler, WalletHandler};
pub use metadata::WalletMetadata;
pub use session::{extract_private_keys, ExtractedKeys, LockedWallet, UnlockedWallet};
