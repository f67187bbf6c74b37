//! Password recovery for encrypted Bitcoin Core wallets
//!
//! This crate tests candidate passwords against a `wallet.dat` container and,
//! once one is accepted, decrypts every private key and derives its
//! addresses. Recovered keys can be checked against public balance services
//! and exported in several formats.
//!
//! ## Pipeline
//!
//! 1. [`container`] parses the raw file into master-key and encrypted-key
//!    records.
//! 2. [`wallet::BitcoinCoreWallet::test_password`] is the password oracle.
//!    It is cheap to share across threads.
//! 3. [`wallet::BitcoinCoreWallet::recover_wallet`] decrypts the keys,
//!    derives addresses and optionally queries balances through [`balance`].
//! 4. [`export`] writes text, JSON, CSV and Electrum import files.
//!
//! Generating password candidates is left to the caller. The
//! `wallet-recover` binary (feature `cli`) shows one way to do it.
//!
//! ## Features
//!
//! - `http` (default): reqwest-backed balance providers
//! - `cli`: the `wallet-recover` binary
//!
//! ```rust,no_run
//! use wallet_recovery_libs::{export::{export_all, ExportOptions}, wallet::BitcoinCoreWallet};
//!
//! # async fn run() {
//! let wallet = BitcoinCoreWallet::open("wallet.dat");
//! let password = ["letmein", "hunter2"]
//!     .into_iter()
//!     .find(|p| wallet.test_password(p));
//!
//! if let Some(password) = password {
//!     let result = wallet.recover_wallet(password).await;
//!     export_all(&result.keys, &ExportOptions::default());
//! }
//! # }
//! ```

pub mod balance;
pub mod common;
pub mod container;
pub mod crypto;
pub mod errors;
pub mod export;
pub mod keys;
pub mod wallet;

pub use errors::*;
pub use keys::{BalanceCheckStatus, Network, RecoveredKey, RecoveryResult, WalletStats};
pub use wallet::{
    create_wallet_handler, detect_wallet_format, BitcoinCoreWallet, RecoveryOptions,
    WalletFormat, WalletFormatHandler, WalletHandler, WalletMetadata,
};
