//! Error types for wallet recovery
//!
//! Each pipeline stage has its own error enum. [`RecoveryError`] wraps them
//! so callers can propagate any stage failure with `?`.
//!
//! A wrong password is not an error anywhere in this crate: the oracle
//! reports it as a plain `false`.

use std::path::PathBuf;

use thiserror::Error;

use crate::wallet::format::WalletFormat;

/// Result type used throughout the crate
pub type WalletResult<T> = Result<T, RecoveryError>;

/// Top-level error for the recovery pipeline
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error(transparent)]
    FileAccess(#[from] FileAccessError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// The file was recognised but no handler exists for its format
    #[error("Unsupported wallet format: {0}")]
    UnsupportedFormat(WalletFormat),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// The container file could not be read
#[derive(Debug, Error)]
pub enum FileAccessError {
    #[error("Cannot read wallet file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Wallet file {} is empty", .path.display())]
    Empty { path: PathBuf },
}

impl FileAccessError {
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::Empty { path: path.into() }
    }
}

/// The container bytes are not a usable wallet
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Container too short: {len} bytes")]
    TooShort { len: usize },

    #[error("Invalid container magic number: {found:#010x}")]
    BadMagic { found: u32 },

    #[error("No master-key or encrypted-key records found")]
    NoRecords,
}

/// Symmetric cipher or key-derivation failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Decryption failed: invalid padding or ciphertext length")]
    BadPadding,
}

impl CryptoError {
    pub fn invalid_length(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            what,
            expected,
            actual,
        }
    }
}

/// Key material or encoding failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid secp256k1 private key")]
    InvalidPrivateKey,

    #[error("Base58check decoding failed: {0}")]
    Base58(String),

    #[error("Invalid {kind} payload: {reason}")]
    InvalidPayload { kind: &'static str, reason: String },
}

impl KeyError {
    pub fn invalid_payload(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            kind,
            reason: reason.into(),
        }
    }
}

/// A single balance provider failed for a single address
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("{provider}: request failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("{provider}: HTTP status {status}")]
    Status { provider: String, status: u16 },

    #[error("{provider}: malformed response: {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("{provider}: request timed out")]
    Timeout { provider: String },
}

impl NetworkError {
    pub fn request(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn status(provider: impl Into<String>, status: u16) -> Self {
        Self::Status {
            provider: provider.into(),
            status,
        }
    }

    pub fn malformed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
        }
    }
}

/// Writing one export format failed
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot create output file {}: {source}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {format} export: {reason}")]
    Serialization { format: &'static str, reason: String },
}

impl ExportError {
    pub fn create_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateFile {
            path: path.into(),
            source,
        }
    }

    pub fn serialization(format: &'static str, reason: impl Into<String>) -> Self {
        Self::Serialization {
            format,
            reason: reason.into(),
        }
    }
}
