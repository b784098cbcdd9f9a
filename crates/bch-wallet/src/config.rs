//! Wallet configuration and per-network parameters.

use serde::{Deserialize, Serialize};

use bch_script::address::{MAINNET_PREFIX, TESTNET_PREFIX};

use crate::bip44::{COIN_TYPE_BCH, COIN_TYPE_BCH_TESTNET, COIN_TYPE_SLP};
use crate::WalletError;

/// The chains a wallet can derive keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    /// Simple Ledger Protocol tokens on mainnet.
    Slp,
}

impl Network {
    pub fn params(self) -> NetworkParams {
        match self {
            Network::Mainnet => NetworkParams {
                name: "mainnet",
                prefix: MAINNET_PREFIX,
                coin_type: COIN_TYPE_BCH,
                hd_private_key_id: [0x04, 0x88, 0xad, 0xe4],
                hd_public_key_id: [0x04, 0x88, 0xb2, 0x1e],
            },
            Network::Testnet => NetworkParams {
                name: "testnet",
                prefix: TESTNET_PREFIX,
                coin_type: COIN_TYPE_BCH_TESTNET,
                hd_private_key_id: [0x04, 0x35, 0x83, 0x94],
                hd_public_key_id: [0x04, 0x35, 0x87, 0xcf],
            },
            Network::Slp => NetworkParams {
                name: "slp",
                prefix: MAINNET_PREFIX,
                coin_type: COIN_TYPE_SLP,
                hd_private_key_id: [0x04, 0x88, 0xad, 0xe4],
                hd_public_key_id: [0x04, 0x88, 0xb2, 0x1e],
            },
        }
    }
}

/// Constants that differ between networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub name: &'static str,
    /// Cashaddr prefix, without the separator.
    pub prefix: &'static str,
    /// BIP44 coin type, before hardening.
    pub coin_type: u32,
    /// Version bytes of a serialized extended private key.
    pub hd_private_key_id: [u8; 4],
    /// Version bytes of a serialized extended public key.
    pub hd_public_key_id: [u8; 4],
}

impl Default for NetworkParams {
    fn default() -> Self {
        Network::Mainnet.params()
    }
}

/// Which network, account and address a wallet derives.
///
/// Missing JSON fields fall back to the defaults: mainnet, account 0,
/// external address 255.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConfig {
    pub network: Network,
    /// BIP44 account, hardened during derivation.
    pub account: u32,
    /// Index of the receiving address on the external chain.
    pub address_index: u32,
}

/// The external address index the wallet has always used.
pub const DEFAULT_ADDRESS_INDEX: u32 = 255;

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            account: 0,
            address_index: DEFAULT_ADDRESS_INDEX,
        }
    }
}

impl WalletConfig {
    /// Parse a configuration override.
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn params(&self) -> NetworkParams {
        self.network.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.account, 0);
        assert_eq!(config.address_index, 255);
        assert_eq!(config.params().prefix, "bitcoincash");
        assert_eq!(config.params().coin_type, 145);
    }

    #[test]
    fn test_from_json_partial() {
        let config = WalletConfig::from_json(r#"{"network":"testnet"}"#).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.address_index, 255);
        assert_eq!(config.params().prefix, "bchtest");

        let config = WalletConfig::from_json(r#"{"network":"slp","addressIndex":3}"#).unwrap();
        assert_eq!(config.params().coin_type, 245);
        assert_eq!(config.address_index, 3);
    }

    #[test]
    fn test_from_json_rejects_unknown_network() {
        assert!(WalletConfig::from_json(r#"{"network":"regtest"}"#).is_err());
    }
}
