//! Provider-specific JSON response shapes

use std::collections::HashMap;

use serde::Deserialize;

use super::{config::ProviderKind, provider::AddressBalance};
use crate::errors::NetworkError;

/// Esplora `/address/{address}` response
#[derive(Debug, Deserialize)]
pub struct BlockstreamAddressResponse {
    pub chain_stats: BlockstreamChainStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlockstreamChainStats {
    #[serde(default)]
    pub funded_txo_sum: u64,
    #[serde(default)]
    pub spent_txo_sum: u64,
    #[serde(default)]
    pub tx_count: u64,
}

/// Blockchair `/dashboards/address/{address}` response
#[derive(Debug, Deserialize)]
pub struct BlockchairDashboardResponse {
    pub data: HashMap<String, BlockchairAddressEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BlockchairAddressEntry {
    pub address: BlockchairAddress,
}

#[derive(Debug, Deserialize)]
pub struct BlockchairAddress {
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub transaction_count: u64,
}

/// BlockCypher `/addrs/{address}/balance` response
#[derive(Debug, Deserialize)]
pub struct BlockcypherBalanceResponse {
    pub balance: u64,
    #[serde(default)]
    pub n_tx: u64,
}

/// Parse a response body from `kind` into a balance for `address`
pub fn parse_response(
    kind: ProviderKind,
    address: &str,
    body: &str,
) -> Result<AddressBalance, NetworkError> {
    let malformed = |e: serde_json::Error| NetworkError::malformed(kind.name(), e.to_string());

    match kind {
        ProviderKind::Blockstream => {
            let response: BlockstreamAddressResponse =
                serde_json::from_str(body).map_err(malformed)?;
            let stats = response.chain_stats;
            Ok(AddressBalance::new(
                stats.funded_txo_sum.saturating_sub(stats.spent_txo_sum),
                clamp_tx_count(stats.tx_count),
            ))
        }
        ProviderKind::Blockchair => {
            let response: BlockchairDashboardResponse =
                serde_json::from_str(body).map_err(malformed)?;
            let entry = response.data.get(address).ok_or_else(|| {
                NetworkError::malformed(kind.name(), format!("no entry for {address}"))
            })?;
            Ok(AddressBalance::new(
                entry.address.balance,
                clamp_tx_count(entry.address.transaction_count),
            ))
        }
        ProviderKind::Blockcypher => {
            let response: BlockcypherBalanceResponse =
                serde_json::from_str(body).map_err(malformed)?;
            Ok(AddressBalance::new(
                response.balance,
                clamp_tx_count(response.n_tx),
            ))
        }
    }
}

fn clamp_tx_count(count: u64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
