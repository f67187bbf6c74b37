use serde::{Deserialize, Serialize};

/// Bitcoin network selecting address and WIF version bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Version byte for pay-to-pubkey-hash addresses
    pub fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    /// Version byte for WIF private keys
    pub fn wif_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xef,
        }
    }

    pub fn from_p2pkh_version(version: u8) -> Option<Self> {
        match version {
            0x00 => Some(Network::Mainnet),
            0x6f => Some(Network::Testnet),
            _ => None,
        }
    }

    pub fn from_wif_version(version: u8) -> Option<Self> {
        match version {
            0x80 => Some(Network::Mainnet),
            0xef => Some(Network::Testnet),
            _ => None,
        }
    }

    pub fn is_testnet(self) -> bool {
        self == Network::Testnet
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
