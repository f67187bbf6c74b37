//! In-memory balance provider for deterministic testing

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;

use super::provider::{AddressBalance, BalanceProvider};
use crate::errors::NetworkError;

/// A [`BalanceProvider`] answering from a fixed table
///
/// Unknown addresses resolve to an empty balance unless a failure mode is set.
/// Clones share state, so a test can keep a handle after boxing one copy.
#[derive(Debug, Clone)]
pub struct MockBalanceProvider {
    name: String,
    balances: Arc<Mutex<HashMap<String, AddressBalance>>>,
    calls: Arc<Mutex<Vec<String>>>,
    failure_modes: Arc<Mutex<MockProviderFailureModes>>,
    response_delay: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct MockProviderFailureModes {
    /// Every query fails with this error
    pub fail_all: Option<NetworkError>,
    /// Queries for these addresses fail with a request error
    pub fail_addresses: Vec<String>,
}

impl MockBalanceProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            balances: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failure_modes: Arc::new(Mutex::new(MockProviderFailureModes::default())),
            response_delay: Duration::ZERO,
        }
    }

    /// A provider whose every query fails with `error`
    pub fn failing(name: impl Into<String>, error: NetworkError) -> Self {
        let provider = Self::new(name);
        provider.set_failure_modes(MockProviderFailureModes {
            fail_all: Some(error),
            ..Default::default()
        });
        provider
    }

    pub fn with_balance(self, address: &str, balance_satoshis: u64, tx_count: i32) -> Self {
        self.set_balance(address, balance_satoshis, tx_count);
        self
    }

    /// Sleep before answering, to simulate a slow network
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    pub fn set_balance(&self, address: &str, balance_satoshis: u64, tx_count: i32) {
        self.balances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                address.to_string(),
                AddressBalance::new(balance_satoshis, tx_count),
            );
    }

    pub fn set_failure_modes(&self, modes: MockProviderFailureModes) {
        *self
            .failure_modes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = modes;
    }

    /// Addresses queried so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl BalanceProvider for MockBalanceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, address: &str) -> Result<AddressBalance, NetworkError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(address.to_string());

        if !self.response_delay.is_zero() {
            tokio::time::sleep(self.response_delay).await;
        }

        let modes = self
            .failure_modes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(error) = modes.fail_all {
            return Err(error);
        }
        if modes.fail_addresses.iter().any(|a| a == address) {
            return Err(NetworkError::request(&self.name, "simulated failure"));
        }

        Ok(self
            .balances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .copied()
            .unwrap_or_default())
    }
}
