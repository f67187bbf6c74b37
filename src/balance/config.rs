//! Balance lookup configuration

use std::{collections::HashMap, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::keys::Network;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// The supported third-party balance services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Esplora API, `chain_stats` object
    Blockstream,
    /// Dashboard API, `data[address].address` object
    Blockchair,
    /// `balance` / `n_tx` object, optional `token` query parameter
    Blockcypher,
}

impl ProviderKind {
    /// Default lookup order
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Blockstream,
        ProviderKind::Blockchair,
        ProviderKind::Blockcypher,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::Blockstream => "blockstream",
            ProviderKind::Blockchair => "blockchair",
            ProviderKind::Blockcypher => "blockcypher",
        }
    }

    pub fn default_endpoint(self, network: Network) -> &'static str {
        match (self, network) {
            (ProviderKind::Blockstream, Network::Mainnet) => "https://blockstream.info/api",
            (ProviderKind::Blockstream, Network::Testnet) => "https://blockstream.info/testnet/api",
            (ProviderKind::Blockchair, Network::Mainnet) => "https://api.blockchair.com/bitcoin",
            (ProviderKind::Blockchair, Network::Testnet) => {
                "https://api.blockchair.com/bitcoin/testnet"
            }
            (ProviderKind::Blockcypher, Network::Mainnet) => {
                "https://api.blockcypher.com/v1/btc/main"
            }
            (ProviderKind::Blockcypher, Network::Testnet) => {
                "https://api.blockcypher.com/v1/btc/test3"
            }
        }
    }

    /// Whether the service accepts an access token
    pub fn accepts_api_key(self) -> bool {
        matches!(self, ProviderKind::Blockcypher)
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blockstream" => Ok(ProviderKind::Blockstream),
            "blockchair" => Ok(ProviderKind::Blockchair),
            "blockcypher" => Ok(ProviderKind::Blockcypher),
            _ => Err(format!("Unknown balance provider: {s}")),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for balance lookups
#[derive(Debug, Clone)]
pub struct BalanceConfig {
    pub network: Network,
    /// Providers in the order they are tried
    pub providers: Vec<ProviderKind>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Pause between successive address lookups
    pub request_delay: Duration,
    pub user_agent: String,
    /// Endpoint overrides; `None` applies to both networks
    endpoints: HashMap<(ProviderKind, Option<Network>), String>,
    /// Access tokens keyed by provider
    api_keys: HashMap<ProviderKind, String>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            providers: ProviderKind::ALL.to_vec(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
            user_agent: concat!("wallet-recovery/", env!("CARGO_PKG_VERSION")).to_string(),
            endpoints: HashMap::new(),
            api_keys: HashMap::new(),
        }
    }
}

impl BalanceConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Default::default()
        }
    }

    /// Switch between mainnet and testnet endpoints
    pub fn enable_testnet(&mut self, testnet: bool) {
        self.network = if testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        };
        tracing::info!(network = %self.network, "Balance lookup network set");
    }

    /// Store an access token for a provider. Unknown services are ignored.
    pub fn set_api_key(&mut self, service: &str, api_key: impl Into<String>) {
        match service.parse::<ProviderKind>() {
            Ok(kind) => {
                self.api_keys.insert(kind, api_key.into());
                tracing::info!(service = kind.name(), "API key set");
            }
            Err(e) => tracing::warn!("{e}"),
        }
    }

    /// Override a provider's base URL. Unknown services are ignored.
    ///
    /// A plain name such as `blockstream` applies on both networks. A
    /// `_mainnet` or `_testnet` suffix limits the override to that network
    /// and takes precedence over the plain one.
    pub fn set_api_endpoint(&mut self, service: &str, endpoint: impl Into<String>) {
        match parse_service(service) {
            Ok((kind, network)) => {
                let endpoint = endpoint.into();
                tracing::info!(service = kind.name(), ?network, %endpoint, "API endpoint set");
                self.endpoints.insert((kind, network), endpoint);
            }
            Err(e) => tracing::warn!("{e}"),
        }
    }

    pub fn with_api_key(mut self, service: &str, api_key: impl Into<String>) -> Self {
        self.set_api_key(service, api_key);
        self
    }

    pub fn with_api_endpoint(mut self, service: &str, endpoint: impl Into<String>) -> Self {
        self.set_api_endpoint(service, endpoint);
        self
    }

    pub fn with_providers(mut self, providers: Vec<ProviderKind>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Base URL for a provider on the configured network, honouring overrides
    pub fn endpoint(&self, kind: ProviderKind) -> String {
        self.endpoints
            .get(&(kind, Some(self.network)))
            .or_else(|| self.endpoints.get(&(kind, None)))
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_endpoint(self.network))
            .trim_end_matches('/')
            .to_string()
    }

    pub fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        self.api_keys.get(&kind).map(String::as_str)
    }
}

/// Split `blockstream_testnet` style names into provider and network
fn parse_service(service: &str) -> Result<(ProviderKind, Option<Network>), String> {
    let lower = service.to_lowercase();
    let (name, network) = if let Some(name) = lower.strip_suffix("_testnet") {
        (name, Some(Network::Testnet))
    } else if let Some(name) = lower.strip_suffix("_mainnet") {
        (name, Some(Network::Mainnet))
    } else {
        (lower.as_str(), None)
    };
    name.parse::<ProviderKind>()
        .map(|kind| (kind, network))
        .map_err(|_| format!("Unknown balance provider: {service}"))
}
