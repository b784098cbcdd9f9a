//! An initialized wallet: mnemonic, network and receiving address.

use log::info;
use zeroize::Zeroizing;

use bch_primitives::ec::PrivateKey;

use crate::bip44::{AccountKey, Address, ChangeType, ExtendedKey, PURPOSE_BIP44};
use crate::config::{NetworkParams, WalletConfig};
use crate::mnemonic::{generate_mnemonic, seed_from_mnemonic};
use crate::{DerivationError, WalletError};

/// A wallet derived from one mnemonic.
///
/// Only the mnemonic, the configuration and the rendered address are kept.
/// Signing re-derives the key from a mnemonic each time.
#[derive(Clone)]
pub struct WalletContext {
    mnemonic: Zeroizing<String>,
    config: WalletConfig,
    network: NetworkParams,
    address: String,
}

impl WalletContext {
    /// Build a wallet from `mnemonic`, or from a fresh 24-word mnemonic
    /// when it is empty.
    ///
    /// # Returns
    /// `InvalidMnemonic` for a phrase that fails the BIP39 word list or
    /// checksum.
    pub fn initialize(mnemonic: &str, config: WalletConfig) -> Result<Self, WalletError> {
        let mnemonic = if mnemonic.trim().is_empty() {
            info!("no mnemonic supplied, generating a new one");
            Zeroizing::new(generate_mnemonic()?)
        } else {
            Zeroizing::new(mnemonic.trim().to_string())
        };

        let address = derive_address(&mnemonic, &config)?;
        info!(
            "wallet initialized on {} with address {}",
            config.params().name,
            address.value
        );

        Ok(WalletContext {
            network: config.params(),
            address: address.value,
            mnemonic,
            config,
        })
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// The receiving address, `prefix:payload`.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn network(&self) -> &NetworkParams {
        &self.network
    }
}

impl std::fmt::Debug for WalletContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletContext")
            .field("network", &self.network.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Derive the configured receiving address of `mnemonic`, private key
/// included.
pub fn derive_address(mnemonic: &str, config: &WalletConfig) -> Result<Address, DerivationError> {
    let params = config.params();
    let seed = seed_from_mnemonic(mnemonic)?;
    let master = ExtendedKey::new_master(seed.as_slice(), &params)?;
    let account = AccountKey::new(&master, PURPOSE_BIP44, params.coin_type, config.account, true)?;
    account.derive_address(ChangeType::External, config.address_index, &params)
}

/// The private key behind the configured receiving address of `mnemonic`.
pub fn signing_key(mnemonic: &str, config: &WalletConfig) -> Result<PrivateKey, WalletError> {
    let address = derive_address(mnemonic, config)?;
    address
        .private_key()
        .cloned()
        .ok_or_else(|| WalletError::InvalidTransaction("derived address has no private key".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;

    const PHRASE: &str = "caught before prosper fiscal glimpse verb badge animal dress property kiss analyst wrist bachelor panda view range either develop advice hidden impulse tail volcano";

    #[test]
    fn test_initialize_from_mnemonic() {
        let ctx = WalletContext::initialize(PHRASE, WalletConfig::default()).unwrap();
        assert_eq!(ctx.mnemonic(), PHRASE);
        assert_eq!(ctx.address(), "bitcoincash:qpjwu6kg8ud8pk9r32u63kprpd2quykzj5l4l7hwmq");
        assert_eq!(ctx.network().coin_type, 145);
    }

    #[test]
    fn test_initialize_generates_mnemonic() {
        let ctx = WalletContext::initialize("", WalletConfig::default()).unwrap();
        assert_eq!(ctx.mnemonic().split_whitespace().count(), 24);
        assert!(ctx.address().starts_with("bitcoincash:q"));

        let again = WalletContext::initialize(ctx.mnemonic(), WalletConfig::default()).unwrap();
        assert_eq!(again.address(), ctx.address());
    }

    #[test]
    fn test_initialize_rejects_bad_mnemonic() {
        let err = WalletContext::initialize("one two three", WalletConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            WalletError::Derivation(DerivationError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_config_changes_address() {
        let config = WalletConfig {
            address_index: 0,
            ..WalletConfig::default()
        };
        let ctx = WalletContext::initialize(PHRASE, config).unwrap();
        assert_eq!(ctx.address(), "bitcoincash:qrvgxjqjftd9afenp30hcwcap0ywzpm3ucuvl6azsv");

        let config = WalletConfig {
            network: Network::Slp,
            ..WalletConfig::default()
        };
        let ctx = WalletContext::initialize(PHRASE, config).unwrap();
        assert_eq!(ctx.address(), "bitcoincash:qzlhsc9sldqytcgr6gdmp6hd4nem27ddgyywe0h0rl");
    }

    #[test]
    fn test_out_of_range_account_is_an_error() {
        let config = WalletConfig::from_json(r#"{"account":2147483648}"#).unwrap();
        let err = WalletContext::initialize(PHRASE, config).unwrap_err();
        assert!(matches!(
            err,
            WalletError::Derivation(DerivationError::InvalidChild(2_147_483_648))
        ));
    }

    #[test]
    fn test_signing_key_matches_address() {
        let key = signing_key(PHRASE, &WalletConfig::default()).unwrap();
        assert_eq!(
            key.to_hex(),
            "200e0098ae0e5a0615e385b8cac90aa95698f3d3fd985e3d5f3a3efb711d96f6"
        );
    }
}
