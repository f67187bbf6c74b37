use std::{collections::HashMap, time::Duration};

use super::provider::{AddressBalance, BalanceProvider};
use crate::{common::format_btc, keys::RecoveredKey};

#[cfg(feature = "http")]
use super::{config::BalanceConfig, http::HttpBalanceProvider};
#[cfg(feature = "http")]
use crate::errors::NetworkError;

/// Annotates recovered keys with on-chain balances using an ordered provider list
pub struct BalanceVerifier {
    providers: Vec<Box<dyn BalanceProvider>>,
    request_delay: Duration,
}

impl std::fmt::Debug for BalanceVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceVerifier")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("request_delay", &self.request_delay)
            .finish()
    }
}

impl BalanceVerifier {
    pub fn new(providers: Vec<Box<dyn BalanceProvider>>, request_delay: Duration) -> Self {
        Self {
            providers,
            request_delay,
        }
    }

    /// HTTP providers in the configured order
    #[cfg(feature = "http")]
    pub fn from_config(config: &BalanceConfig) -> Result<Self, NetworkError> {
        let providers = config
            .providers
            .iter()
            .map(|&kind| {
                HttpBalanceProvider::from_config(kind, config)
                    .map(|p| Box::new(p) as Box<dyn BalanceProvider>)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(providers, config.request_delay))
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Ask each provider in turn; the first well-formed answer wins
    pub async fn query_address(&self, address: &str) -> Option<AddressBalance> {
        for provider in &self.providers {
            match provider.query(address).await {
                Ok(balance) => {
                    tracing::debug!(
                        provider = provider.name(),
                        address,
                        balance = balance.balance_satoshis,
                        tx_count = balance.tx_count,
                        "Balance resolved"
                    );
                    return Some(balance);
                }
                Err(e) => tracing::warn!(address, "Balance provider failed: {e}"),
            }
        }
        None
    }

    /// Fill in balance fields for every key.
    ///
    /// Keys sharing an address are looked up once. Keys whose address no
    /// provider could resolve keep a zero balance. Returns whether at least
    /// one address was resolved.
    pub async fn check_balances(&self, keys: &mut [RecoveredKey]) -> bool {
        if keys.is_empty() || self.providers.is_empty() {
            return false;
        }

        let mut cache: HashMap<String, Option<AddressBalance>> = HashMap::new();
        let mut resolved = 0usize;
        let mut queried = 0usize;

        for key in keys.iter_mut() {
            let balance = match cache.get(&key.address) {
                Some(cached) => *cached,
                None => {
                    if queried > 0 && !self.request_delay.is_zero() {
                        tokio::time::sleep(self.request_delay).await;
                    }
                    queried += 1;

                    let result = self.query_address(&key.address).await;
                    if result.is_some() {
                        resolved += 1;
                    }
                    cache.insert(key.address.clone(), result);
                    result
                }
            };

            if let Some(balance) = balance {
                key.balance_satoshis = balance.balance_satoshis;
                key.tx_count = balance.tx_count;
                key.has_balance = balance.balance_satoshis > 0;
                if key.has_balance {
                    tracing::info!(
                        address = %key.address,
                        "Funded address: {} BTC",
                        format_btc(key.balance_satoshis)
                    );
                }
            } else {
                key.balance_satoshis = 0;
                key.tx_count = 0;
                key.has_balance = false;
            }
        }

        tracing::info!(
            addresses = queried,
            resolved,
            "Balance check finished"
        );
        resolved > 0
    }
}
