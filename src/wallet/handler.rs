//! Format-independent wallet capabilities

use std::{path::Path, time::Duration};

use super::{
    bitcoin_core::{BitcoinCoreWallet, RecoveryOptions},
    format::{detect_wallet_format, EncryptionType, WalletFormat},
    metadata::WalletMetadata,
};
use crate::{
    container::read_container_file,
    errors::{RecoveryError, WalletResult},
    keys::RecoveryResult,
};

/// What every supported wallet kind can do
pub trait WalletFormatHandler: Send + Sync {
    /// Parse the wallet. Repeated calls are cheap.
    fn load(&self) -> WalletResult<()>;

    fn test_password(&self, password: &str) -> bool;

    fn get_metadata(&self) -> WalletResult<WalletMetadata>;

    fn is_valid(&self) -> bool;

    fn format(&self) -> WalletFormat;

    fn encryption_type(&self) -> EncryptionType;

    /// Rough cost of one password trial
    fn estimated_test_time(&self) -> Duration;
}

impl WalletFormatHandler for BitcoinCoreWallet {
    fn load(&self) -> WalletResult<()> {
        BitcoinCoreWallet::load(self).map(|_| ())
    }

    fn test_password(&self, password: &str) -> bool {
        BitcoinCoreWallet::test_password(self, password)
    }

    fn get_metadata(&self) -> WalletResult<WalletMetadata> {
        BitcoinCoreWallet::get_metadata(self)
    }

    fn is_valid(&self) -> bool {
        BitcoinCoreWallet::is_valid(self)
    }

    fn format(&self) -> WalletFormat {
        WalletFormat::BitcoinCore
    }

    fn encryption_type(&self) -> EncryptionType {
        EncryptionType::Aes256Cbc
    }

    fn estimated_test_time(&self) -> Duration {
        BitcoinCoreWallet::estimated_test_time(self)
    }
}

/// A wallet of any supported kind
#[derive(Debug)]
pub enum WalletHandler {
    BitcoinCore(BitcoinCoreWallet),
}

impl WalletHandler {
    /// Detect the wallet kind of `data` and wrap it
    pub fn from_bytes(data: Vec<u8>, options: RecoveryOptions) -> WalletResult<Self> {
        match detect_wallet_format(&data) {
            WalletFormat::BitcoinCore => Ok(WalletHandler::BitcoinCore(
                BitcoinCoreWallet::from_bytes(data).with_options(options),
            )),
            other => Err(RecoveryError::UnsupportedFormat(other)),
        }
    }

    fn inner(&self) -> &dyn WalletFormatHandler {
        match self {
            WalletHandler::BitcoinCore(wallet) => wallet,
        }
    }

    pub fn as_bitcoin_core(&self) -> Option<&BitcoinCoreWallet> {
        match self {
            WalletHandler::BitcoinCore(wallet) => Some(wallet),
        }
    }

    pub async fn recover_wallet(&self, password: &str) -> RecoveryResult {
        match self {
            WalletHandler::BitcoinCore(wallet) => wallet.recover_wallet(password).await,
        }
    }

    pub fn recover_wallet_offline(&self, password: &str) -> RecoveryResult {
        match self {
            WalletHandler::BitcoinCore(wallet) => wallet.recover_wallet_offline(password),
        }
    }
}

impl WalletFormatHandler for WalletHandler {
    fn load(&self) -> WalletResult<()> {
        self.inner().load()
    }

    fn test_password(&self, password: &str) -> bool {
        self.inner().test_password(password)
    }

    fn get_metadata(&self) -> WalletResult<WalletMetadata> {
        self.inner().get_metadata()
    }

    fn is_valid(&self) -> bool {
        self.inner().is_valid()
    }

    fn format(&self) -> WalletFormat {
        self.inner().format()
    }

    fn encryption_type(&self) -> EncryptionType {
        self.inner().encryption_type()
    }

    fn estimated_test_time(&self) -> Duration {
        self.inner().estimated_test_time()
    }
}

/// Read `path`, detect its wallet kind and build a handler for it.
///
/// Detected but unsupported kinds fail with
/// [`RecoveryError::UnsupportedFormat`].
pub fn create_wallet_handler(path: impl AsRef<Path>, options: RecoveryOptions) -> WalletResult<WalletHandler> {
    let path = path.as_ref();
    let data = read_container_file(path)?;
    let handler = WalletHandler::from_bytes(data, options)?;
    tracing::info!(path = %path.display(), format = %handler.format(), "Wallet handler created");
    Ok(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{container::ContainerBuilder, errors::FileAccessError};

    fn core_bytes() -> Vec<u8> {
        let master_key = [1u8; 32];
        let mut secret = [0u8; 32];
        secret[31] = 7;
        ContainerBuilder::new()
            .with_master_key("pw", [0; 8], 2, &master_key)
            .unwrap()
            .with_encrypted_key(&master_key, &secret)
            .unwrap()
            .build()
    }

    #[test]
    fn test_handler_dispatch() {
        let handler = WalletHandler::from_bytes(core_bytes(), RecoveryOptions::default()).unwrap();
        assert_eq!(handler.format(), WalletFormat::BitcoinCore);
        assert_eq!(handler.encryption_type(), EncryptionType::Aes256Cbc);
        assert!(handler.load().is_ok());
        assert!(handler.is_valid());
        assert!(handler.test_password("pw"));
        assert!(!handler.test_password("nope"));
        assert_eq!(handler.get_metadata().unwrap().master_key_count, 1);
        assert!(handler.as_bitcoin_core().is_some());
        assert_eq!(handler.recover_wallet_offline("pw").total_addresses, 2);
    }

    #[test]
    fn test_unsupported_formats() {
        let electrum = br#"{"seed_version": 17, "keystore": {}}"#.to_vec();
        assert!(matches!(
            WalletHandler::from_bytes(electrum, RecoveryOptions::default()),
            Err(RecoveryError::UnsupportedFormat(WalletFormat::Electrum))
        ));
        assert!(matches!(
            WalletHandler::from_bytes(b"plain text".to_vec(), RecoveryOptions::default()),
            Err(RecoveryError::UnsupportedFormat(WalletFormat::Unknown))
        ));
    }

    #[test]
    fn test_create_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.dat");
        std::fs::write(&path, core_bytes()).unwrap();

        let handler = create_wallet_handler(&path, RecoveryOptions::default()).unwrap();
        assert!(handler.test_password("pw"));

        let empty = dir.path().join("empty.dat");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(
            create_wallet_handler(&empty, RecoveryOptions::default()),
            Err(RecoveryError::FileAccess(FileAccessError::Empty { .. }))
        ));
    }

    #[test]
    fn test_trait_objects() {
        let handlers: Vec<Box<dyn WalletFormatHandler>> = vec![
            Box::new(BitcoinCoreWallet::from_bytes(core_bytes())),
            Box::new(WalletHandler::from_bytes(core_bytes(), RecoveryOptions::default()).unwrap()),
        ];
        assert!(handlers.iter().all(|h| h.test_password("pw")));
    }
}
