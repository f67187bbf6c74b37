//! Password oracle and key recovery for Bitcoin Core `wallet.dat` containers

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock, PoisonError},
    time::Duration,
};

use tracing::Instrument;
use zeroize::Zeroizing;

use super::{
    metadata::{estimated_test_time, WalletMetadata},
    session::LockedWallet,
};
use crate::{
    balance::{BalanceConfig, BalanceVerifier},
    container::{load, MasterKeyRecord, WalletContainer},
    crypto::{decrypt_aes256_cbc, derive_key, split_iv, DEFAULT_DERIVE_ITERATIONS, KEY_LEN},
    errors::WalletResult,
    keys::{BalanceCheckStatus, Network, RecoveredKey, RecoveryResult},
};

/// Unlock a master-key record with `password`.
///
/// Succeeds only when the padding is valid and the plaintext is exactly 32
/// bytes. A wrong password is `None`, never an error.
pub fn decrypt_master_key(password: &str, record: &MasterKeyRecord) -> Option<Zeroizing<[u8; KEY_LEN]>> {
    let (iv, ciphertext) = split_iv(&record.encrypted_key)?;
    let key = derive_key(password, &record.salt, record.iterations);

    let plaintext = Zeroizing::new(decrypt_aes256_cbc(key.as_slice(), iv, ciphertext).ok()?);
    let master_key: [u8; KEY_LEN] = plaintext.as_slice().try_into().ok()?;
    Some(Zeroizing::new(master_key))
}

/// Options controlling what [`BitcoinCoreWallet::recover_wallet`] does
/// after the password is accepted
#[derive(Debug, Clone)]
pub struct RecoveryOptions {
    pub network: Network,
    /// Query balance providers for every recovered address
    pub check_balances: bool,
    pub balance: BalanceConfig,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            check_balances: true,
            balance: BalanceConfig::default(),
        }
    }
}

impl RecoveryOptions {
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self.balance.network = network;
        self
    }

    pub fn with_balance_check(mut self, enabled: bool) -> Self {
        self.check_balances = enabled;
        self
    }

    pub fn with_balance_config(mut self, config: BalanceConfig) -> Self {
        self.balance = config;
        self
    }
}

#[derive(Debug, Clone)]
enum WalletSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// A Bitcoin Core wallet file.
///
/// The container is parsed on first use and shared by every later call, so
/// one instance can serve password trials from many threads.
///
/// ```rust,no_run
/// use wallet_recovery_libs::wallet::BitcoinCoreWallet;
///
/// let wallet = BitcoinCoreWallet::open("wallet.dat");
/// if wallet.test_password("hunter2") {
///     let result = wallet.recover_wallet_offline("hunter2");
///     println!("{} keys", result.total_addresses);
/// }
/// ```
#[derive(Debug)]
pub struct BitcoinCoreWallet {
    source: WalletSource,
    container: OnceLock<WalletContainer>,
    load_lock: Mutex<()>,
    options: RecoveryOptions,
    verifier: Option<BalanceVerifier>,
}

impl BitcoinCoreWallet {
    /// Refer to a wallet on disk. Nothing is read until [`load`](Self::load).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_source(WalletSource::File(path.into()))
    }

    /// Wrap an in-memory container
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::with_source(WalletSource::Bytes(data))
    }

    fn with_source(source: WalletSource) -> Self {
        Self {
            source,
            container: OnceLock::new(),
            load_lock: Mutex::new(()),
            options: RecoveryOptions::default(),
            verifier: None,
        }
    }

    pub fn with_options(mut self, options: RecoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `verifier` instead of building HTTP providers from the options
    pub fn with_balance_verifier(mut self, verifier: BalanceVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn options(&self) -> &RecoveryOptions {
        &self.options
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            WalletSource::File(path) => Some(path),
            WalletSource::Bytes(_) => None,
        }
    }

    pub fn network(&self) -> Network {
        self.options.network
    }

    /// Derive testnet addresses and use testnet balance endpoints
    pub fn enable_testnet(&mut self, testnet: bool) {
        self.options.network = if testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        };
        self.options.balance.enable_testnet(testnet);
    }

    pub fn set_api_key(&mut self, service: &str, api_key: impl Into<String>) {
        self.options.balance.set_api_key(service, api_key);
    }

    pub fn set_api_endpoint(&mut self, service: &str, endpoint: impl Into<String>) {
        self.options.balance.set_api_endpoint(service, endpoint);
    }

    /// Parse the container once. Later and concurrent calls return the same
    /// registry.
    pub fn load(&self) -> WalletResult<&WalletContainer> {
        if let Some(container) = self.container.get() {
            return Ok(container);
        }

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(container) = self.container.get() {
            return Ok(container);
        }

        let container = match &self.source {
            WalletSource::File(path) => {
                tracing::info!(path = %path.display(), "Loading wallet");
                WalletContainer::from_file(path)?
            }
            WalletSource::Bytes(data) => load(data.clone())?,
        };
        tracing::info!(
            master_keys = container.master_key_count(),
            encrypted_keys = container.encrypted_key_count(),
            labels = container.labels().len(),
            "Wallet loaded"
        );

        Ok(self.container.get_or_init(|| container))
    }

    pub fn is_loaded(&self) -> bool {
        self.container.get().is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.load().is_ok()
    }

    /// Whether `password` unlocks any master key. Load failures are logged
    /// and reported as `false`.
    pub fn test_password(&self, password: &str) -> bool {
        match self.load() {
            Ok(container) => container
                .master_keys()
                .any(|(_, record)| decrypt_master_key(password, record).is_some()),
            Err(e) => {
                tracing::warn!("Cannot test password: {e}");
                false
            }
        }
    }

    pub fn get_metadata(&self) -> WalletResult<WalletMetadata> {
        Ok(WalletMetadata::for_container(self.load()?))
    }

    /// Rough cost of one [`test_password`](Self::test_password) call
    pub fn estimated_test_time(&self) -> Duration {
        let iterations = self
            .container
            .get()
            .and_then(|c| c.master_keys().map(|(_, mk)| mk.iterations).max())
            .unwrap_or(DEFAULT_DERIVE_ITERATIONS);
        estimated_test_time(iterations)
    }

    /// Unlock with `password`, extract and derive every key, then look up
    /// balances when enabled.
    ///
    /// A wrong password, a load failure or a wallet with no decryptable keys
    /// gives `success == false`. Balance failures never fail the recovery.
    pub async fn recover_wallet(&self, password: &str) -> RecoveryResult {
        let span = tracing::info_span!("recovery", network = %self.options.network);
        async {
            let Some(mut keys) = self.recover_keys(password) else {
                return RecoveryResult::failed(password);
            };

            let balance_check = if self.options.check_balances {
                self.check_balances(&mut keys).await
            } else {
                BalanceCheckStatus::Skipped
            };

            let result = RecoveryResult::succeeded(password, keys, balance_check);
            tracing::info!(
                addresses = result.total_addresses,
                funded = result.funded_addresses,
                balance_check = ?result.balance_check,
                "Recovery complete"
            );
            result
        }
        .instrument(span)
        .await
    }

    /// [`recover_wallet`](Self::recover_wallet) without any network access
    pub fn recover_wallet_offline(&self, password: &str) -> RecoveryResult {
        let _span = tracing::info_span!("recovery", network = %self.options.network).entered();
        match self.recover_keys(password) {
            Some(keys) => RecoveryResult::succeeded(password, keys, BalanceCheckStatus::Skipped),
            None => RecoveryResult::failed(password),
        }
    }

    fn recover_keys(&self, password: &str) -> Option<Vec<RecoveredKey>> {
        let container = match self.load() {
            Ok(container) => container,
            Err(e) => {
                tracing::warn!("Cannot recover wallet: {e}");
                return None;
            }
        };

        let Ok(unlocked) = LockedWallet::new(container).unlock(password) else {
            tracing::info!("Password rejected");
            return None;
        };

        let extracted = unlocked.extract_keys();
        if extracted.skipped() > 0 {
            tracing::warn!(skipped = extracted.skipped(), "Some encrypted keys could not be decrypted");
        }

        let keys = extracted.to_recovered_keys(self.options.network);
        if keys.is_empty() {
            tracing::warn!("Password accepted but no private keys could be recovered");
            return None;
        }
        tracing::info!(keys = extracted.len(), addresses = keys.len(), "Private keys recovered");
        Some(keys)
    }

    async fn check_balances(&self, keys: &mut [RecoveredKey]) -> BalanceCheckStatus {
        let resolved = match &self.verifier {
            Some(verifier) => verifier.check_balances(keys).await,
            None => self.check_balances_with_config(keys).await,
        };
        if resolved {
            BalanceCheckStatus::Completed
        } else {
            tracing::warn!("No balance provider answered; balances are unknown");
            BalanceCheckStatus::Unavailable
        }
    }

    #[cfg(feature = "http")]
    async fn check_balances_with_config(&self, keys: &mut [RecoveredKey]) -> bool {
        match BalanceVerifier::from_config(&self.options.balance) {
            Ok(verifier) => verifier.check_balances(keys).await,
            Err(e) => {
                tracing::warn!("Cannot build balance providers: {e}");
                false
            }
        }
    }

    #[cfg(not(feature = "http"))]
    async fn check_balances_with_config(&self, _keys: &mut [RecoveredKey]) -> bool {
        tracing::warn!("Built without the `http` feature; no balance providers configured");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        balance::{mocks::MockBalanceProvider, BalanceProvider},
        container::ContainerBuilder,
        crypto::{encrypt_aes256_cbc, IV_LEN},
        errors::{FormatError, RecoveryError},
    };

    const MASTER_KEY: [u8; 32] = [0x33u8; 32];
    const SALT: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

    fn secret_one() -> [u8; 32] {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        secret
    }

    fn wallet_bytes() -> Vec<u8> {
        ContainerBuilder::new()
            .with_master_key("correct", SALT, 2, &MASTER_KEY)
            .unwrap()
            .with_encrypted_key(&MASTER_KEY, &secret_one())
            .unwrap()
            .with_label("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", "savings")
            .unwrap()
            .build()
    }

    fn offline_wallet() -> BitcoinCoreWallet {
        BitcoinCoreWallet::from_bytes(wallet_bytes())
            .with_options(RecoveryOptions::default().with_balance_check(false))
    }

    #[test]
    fn test_decrypt_master_key() {
        let container = load(wallet_bytes()).unwrap();
        let (_, record) = container.master_keys().next().unwrap();
        assert_eq!(*decrypt_master_key("correct", record).unwrap(), MASTER_KEY);
        assert!(decrypt_master_key("wrong", record).is_none());
    }

    #[test]
    fn test_valid_padding_with_wrong_length_is_rejected() {
        let iv = [9u8; IV_LEN];
        let key = derive_key("correct", &SALT, 2);

        // 47 bytes plus a single 0x01 pad byte: padding checks out, length does not
        let mut blob = iv.to_vec();
        blob.extend_from_slice(&encrypt_aes256_cbc(key.as_slice(), &iv, &[0x5a; 47]).unwrap());
        assert_eq!(blob.len(), IV_LEN + 48);
        let record = MasterKeyRecord {
            encrypted_key: blob,
            salt: SALT.to_vec(),
            iterations: 2,
            derivation_method: 0,
        };
        assert!(decrypt_master_key("correct", &record).is_none());

        // 16-byte plaintext also pads cleanly to a shorter blob
        let mut short = iv.to_vec();
        short.extend_from_slice(&encrypt_aes256_cbc(key.as_slice(), &iv, &[0x5a; 16]).unwrap());
        let record = MasterKeyRecord {
            encrypted_key: short,
            ..record
        };
        assert!(decrypt_master_key("correct", &record).is_none());
    }

    #[test]
    fn test_short_master_key_blob() {
        let record = MasterKeyRecord {
            encrypted_key: vec![0u8; 10],
            salt: SALT.to_vec(),
            iterations: 1,
            derivation_method: 0,
        };
        assert!(decrypt_master_key("any", &record).is_none());
    }

    #[test]
    fn test_password_oracle() {
        let wallet = offline_wallet();
        assert!(!wallet.is_loaded());
        assert!(wallet.test_password("correct"));
        assert!(!wallet.test_password("wrong"));
        assert!(!wallet.test_password(""));
        assert!(wallet.is_loaded());
    }

    #[test]
    fn test_load_is_idempotent() {
        let wallet = offline_wallet();
        let first = wallet.load().unwrap() as *const WalletContainer;
        let second = wallet.load().unwrap() as *const WalletContainer;
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_errors() {
        let wallet = BitcoinCoreWallet::from_bytes(vec![0xde, 0xad, 0xbe, 0xef, 0, 0]);
        assert!(matches!(
            wallet.load(),
            Err(RecoveryError::Format(FormatError::BadMagic { .. }))
        ));
        assert!(!wallet.is_valid());
        assert!(!wallet.test_password("anything"));
        assert!(!wallet.recover_wallet_offline("anything").success);

        let missing = BitcoinCoreWallet::open("/nonexistent/wallet.dat");
        assert!(matches!(missing.load(), Err(RecoveryError::FileAccess(_))));
    }

    #[test]
    fn test_recover_offline() {
        let wallet = offline_wallet();
        let result = wallet.recover_wallet_offline("correct");
        assert!(result.success);
        assert_eq!(result.password, "correct");
        assert_eq!(result.total_addresses, 2);
        assert_eq!(result.balance_check, BalanceCheckStatus::Skipped);
        assert_eq!(result.keys[0].label, "savings");
        assert_eq!(result.keys[1].label, "");

        let failed = wallet.recover_wallet_offline("wrong");
        assert!(!failed.success);
        assert!(failed.keys.is_empty());
    }

    #[test]
    fn test_password_accepted_without_keys_is_failure() {
        let bytes = ContainerBuilder::new()
            .with_master_key("correct", SALT, 2, &MASTER_KEY)
            .unwrap()
            .with_raw_encrypted_key([0x02; 33], [0x11; 64])
            .build();
        let wallet = BitcoinCoreWallet::from_bytes(bytes);
        assert!(wallet.test_password("correct"));
        assert!(!wallet.recover_wallet_offline("correct").success);
    }

    #[test]
    fn test_testnet_addresses() {
        let mut wallet = offline_wallet();
        wallet.enable_testnet(true);
        let result = wallet.recover_wallet_offline("correct");
        assert_eq!(result.keys[0].address, "mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r");
        assert_eq!(wallet.options().balance.network, Network::Testnet);
    }

    #[test]
    fn test_metadata_and_estimate() {
        let wallet = offline_wallet();
        assert_eq!(
            wallet.estimated_test_time(),
            Duration::from_millis(50),
            "default before load"
        );
        let metadata = wallet.get_metadata().unwrap();
        assert_eq!(metadata.iterations, 2);
        assert_eq!(metadata.encrypted_key_count, 1);
        assert!(wallet.estimated_test_time() < Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_recover_with_balances() {
        let provider = MockBalanceProvider::new("mock").with_balance(
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH",
            150_000,
            3,
        );
        let wallet = BitcoinCoreWallet::from_bytes(wallet_bytes()).with_balance_verifier(
            BalanceVerifier::new(
                vec![Box::new(provider.clone()) as Box<dyn BalanceProvider>],
                Duration::ZERO,
            ),
        );

        let result = wallet.recover_wallet("correct").await;
        assert!(result.success);
        assert_eq!(result.balance_check, BalanceCheckStatus::Completed);
        assert_eq!(result.total_balance_satoshis, 150_000);
        assert_eq!(result.funded_addresses, 1);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_recover_with_providers_down() {
        let wallet = BitcoinCoreWallet::from_bytes(wallet_bytes()).with_balance_verifier(
            BalanceVerifier::new(
                vec![Box::new(MockBalanceProvider::failing(
                    "down",
                    crate::errors::NetworkError::timeout("down"),
                ))],
                Duration::ZERO,
            ),
        );

        let result = wallet.recover_wallet("correct").await;
        assert!(result.success);
        assert_eq!(result.balance_check, BalanceCheckStatus::Unavailable);
        assert_eq!(result.total_balance_satoshis, 0);
    }

    #[test]
    fn test_wallet_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BitcoinCoreWallet>();
    }
}
