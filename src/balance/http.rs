//! reqwest-backed balance providers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{
    config::{BalanceConfig, ProviderKind},
    provider::{AddressBalance, BalanceProvider},
    responses::parse_response,
};
use crate::errors::NetworkError;

/// A balance provider speaking one of the [`ProviderKind`] HTTP APIs
#[derive(Debug, Clone)]
pub struct HttpBalanceProvider {
    kind: ProviderKind,
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBalanceProvider {
    pub fn new(
        kind: ProviderKind,
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| NetworkError::request(kind.name(), e.to_string()))?;

        Ok(Self {
            kind,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Build the provider for `kind` from a [`BalanceConfig`]
    pub fn from_config(kind: ProviderKind, config: &BalanceConfig) -> Result<Self, NetworkError> {
        let mut provider = Self::new(
            kind,
            config.endpoint(kind),
            config.request_timeout,
            &config.user_agent,
        )?;
        if kind.accepts_api_key() {
            provider.api_key = config.api_key(kind).map(str::to_string);
        }
        Ok(provider)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Request URL for `address`, with the access token form-encoded
    pub fn url_for(&self, address: &str) -> Result<Url, NetworkError> {
        let raw = match self.kind {
            ProviderKind::Blockstream => format!("{}/address/{address}", self.base_url),
            ProviderKind::Blockchair => {
                format!("{}/dashboards/address/{address}", self.base_url)
            }
            ProviderKind::Blockcypher => format!("{}/addrs/{address}/balance", self.base_url),
        };
        let mut url = Url::parse(&raw)
            .map_err(|e| NetworkError::request(self.kind.name(), format!("invalid URL: {e}")))?;

        if let Some(token) = self.api_key.as_deref().filter(|t| !t.is_empty()) {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }
}

#[async_trait]
impl BalanceProvider for HttpBalanceProvider {
    fn name(&self) -> &str {
        self.kind.name()
    }

    async fn query(&self, address: &str) -> Result<AddressBalance, NetworkError> {
        let provider = self.kind.name();
        tracing::debug!(provider, address, "Querying balance");

        let response = self
            .client
            .get(self.url_for(address)?)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NetworkError::timeout(provider)
                } else {
                    // without_url keeps access tokens out of the message
                    NetworkError::request(provider, e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::status(provider, status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::timeout(provider)
            } else {
                NetworkError::request(provider, e.without_url().to_string())
            }
        })?;

        parse_response(self.kind, address, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";

    fn provider(kind: ProviderKind) -> HttpBalanceProvider {
        HttpBalanceProvider::new(kind, "http://localhost:1/", Duration::from_secs(1), "test")
            .unwrap()
    }

    fn url(provider: &HttpBalanceProvider) -> String {
        provider.url_for(ADDRESS).unwrap().to_string()
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            url(&provider(ProviderKind::Blockstream)),
            format!("http://localhost:1/address/{ADDRESS}")
        );
        assert_eq!(
            url(&provider(ProviderKind::Blockchair)),
            format!("http://localhost:1/dashboards/address/{ADDRESS}")
        );
        assert_eq!(
            url(&provider(ProviderKind::Blockcypher)),
            format!("http://localhost:1/addrs/{ADDRESS}/balance")
        );
        assert_eq!(
            url(&provider(ProviderKind::Blockcypher).with_api_key("abc")),
            format!("http://localhost:1/addrs/{ADDRESS}/balance?token=abc")
        );
    }

    #[test]
    fn test_token_is_encoded() {
        let cypher = provider(ProviderKind::Blockcypher).with_api_key("a b&c=d#e");
        let built = cypher.url_for(ADDRESS).unwrap();
        assert_eq!(built.query(), Some("token=a+b%26c%3Dd%23e"));
        assert_eq!(built.fragment(), None);

        let pairs: Vec<(String, String)> = built.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("token".to_string(), "a b&c=d#e".to_string())]);
    }

    #[test]
    fn test_invalid_base_url() {
        let broken = HttpBalanceProvider::new(
            ProviderKind::Blockstream,
            "not a url",
            Duration::from_secs(1),
            "test",
        )
        .unwrap();
        assert!(matches!(
            broken.url_for(ADDRESS),
            Err(NetworkError::Request { .. })
        ));
    }

    #[test]
    fn test_from_config_only_passes_key_to_blockcypher() {
        let config = BalanceConfig::default().with_api_key("blockcypher", "abc");
        let cypher = HttpBalanceProvider::from_config(ProviderKind::Blockcypher, &config).unwrap();
        assert!(url(&cypher).ends_with("?token=abc"));
        assert!(url(&cypher).starts_with("https://api.blockcypher.com/v1/btc/main"));

        let stream = HttpBalanceProvider::from_config(ProviderKind::Blockstream, &config).unwrap();
        assert!(!url(&stream).contains("token"));
    }
}
