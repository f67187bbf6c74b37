//! On-chain balance lookups
//!
//! Each address is resolved through an ordered list of [`BalanceProvider`]s.
//! The first provider to return a well-formed answer wins for that address;
//! failures fall through to the next provider and are never fatal.
//!
//! ```rust,no_run
//! use wallet_recovery_libs::balance::{BalanceConfig, BalanceVerifier};
//!
//! async fn check(keys: &mut [wallet_recovery_libs::keys::RecoveredKey]) -> bool {
//!     let config = BalanceConfig::default().with_api_key("blockcypher", "token");
//!     match BalanceVerifier::from_config(&config) {
//!         Ok(verifier) => verifier.check_balances(keys).await,
//!         Err(_) => false,
//!     }
//! }
//! ```

pub mod config;
pub mod mocks;
pub mod provider;
pub mod responses;
pub mod verifier;

#[cfg(feature = "http")]
pub mod http;

pub use config::{BalanceConfig, ProviderKind};
pub use provider::{AddressBalance, BalanceProvider};
pub use verifier::BalanceVerifier;

#[cfg(feature = "http")]
pub use http::HttpBalanceProvider;
