//! BIP32 extended keys and the BIP44 account/address tree.
//!
//! The wallet walks `m / purpose' / coin' / account' / change / index`.
//! The first three levels are hardened whenever the parent holds a private
//! key; the last two are always normal so that an account's public key can
//! derive its receiving addresses on its own.
//!
//! See <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>
//! and <https://github.com/bitcoin/bips/blob/master/bip-0044.mediawiki>.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use bch_primitives::ec::{PrivateKey, PublicKey};
use bch_primitives::hash::{hash160, sha512_hmac};
use bch_script::CashAddress;

use crate::config::NetworkParams;
use crate::DerivationError;

/// First hardened child index.
pub const HARDENED_KEY_START: u32 = 0x8000_0000;

pub const PURPOSE_BIP44: u32 = 44;
pub const COIN_TYPE_BCH: u32 = 145;
pub const COIN_TYPE_SLP: u32 = 245;
pub const COIN_TYPE_BCH_TESTNET: u32 = 145;

pub const MIN_SEED_BYTES: usize = 16;
pub const MAX_SEED_BYTES: usize = 64;

/// HMAC key of the master node.
const MASTER_KEY: &[u8] = b"Bitcoin seed";

/// The BIP44 change level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ChangeType {
    /// Receiving addresses.
    External = 0,
    /// Change addresses.
    Internal = 1,
}

impl ChangeType {
    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Path from the master to an account node. Indices are stored as derived,
/// so hardened levels carry the `0x8000_0000` offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HdStartPath {
    #[serde(rename = "purpose_index")]
    pub purpose: u32,
    pub coin_type: u32,
    #[serde(rename = "account_index")]
    pub account: u32,
}

/// Path from an account node to one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HdEndPath {
    #[serde(rename = "change_index")]
    pub change: u32,
    #[serde(rename = "address_index")]
    pub index: u32,
}

#[derive(Clone)]
enum KeyMaterial {
    Private(PrivateKey),
    Public(PublicKey),
}

/// A node of the BIP32 tree.
///
/// Private nodes can derive both hardened and normal children; public
/// nodes only normal ones. The chain code is wiped on drop and the private
/// key wipes itself.
#[derive(Clone)]
pub struct ExtendedKey {
    key: KeyMaterial,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    network: NetworkParams,
}

impl ExtendedKey {
    /// Derive the master node from a BIP39 seed.
    ///
    /// # Arguments
    /// * `seed`    - 16 to 64 bytes of seed material.
    /// * `network` - Parameters recorded on the node and all its children.
    ///
    /// # Returns
    /// `InvalidSeed` for a seed of the wrong length, or one whose left HMAC
    /// half is not a valid private key.
    pub fn new_master(seed: &[u8], network: &NetworkParams) -> Result<Self, DerivationError> {
        if !(MIN_SEED_BYTES..=MAX_SEED_BYTES).contains(&seed.len()) {
            return Err(DerivationError::InvalidSeed(format!(
                "seed is {} bytes, want {} to {}",
                seed.len(),
                MIN_SEED_BYTES,
                MAX_SEED_BYTES
            )));
        }

        let mut lr = sha512_hmac(MASTER_KEY, seed);
        let key = PrivateKey::from_bytes(&lr[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&lr[32..]);
        lr.zeroize();

        let key = match key {
            Ok(key) => key,
            Err(e) => {
                chain_code.zeroize();
                return Err(DerivationError::InvalidSeed(e.to_string()));
            }
        };

        Ok(ExtendedKey {
            key: KeyMaterial::Private(key),
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            network: *network,
        })
    }

    /// Derive child `index`. Indices from [`HARDENED_KEY_START`] up are
    /// hardened.
    ///
    /// # Returns
    /// `DeriveHardenedFromPublic` when a public node is asked for a hardened
    /// child, `InvalidChild` when the index yields no valid key (about 1 in
    /// 2^127) or the tree is already 255 levels deep.
    pub fn child(&self, index: u32) -> Result<ExtendedKey, DerivationError> {
        let hardened = index >= HARDENED_KEY_START;
        let depth = self.depth.checked_add(1).ok_or(DerivationError::InvalidChild(index))?;

        let mut data = Vec::with_capacity(37);
        match &self.key {
            KeyMaterial::Public(_) if hardened => {
                return Err(DerivationError::DeriveHardenedFromPublic(index));
            }
            KeyMaterial::Private(key) if hardened => {
                data.push(0x00);
                data.extend_from_slice(&key.to_bytes());
            }
            _ => data.extend_from_slice(&self.public_key().to_compressed()),
        }
        data.extend_from_slice(&index.to_be_bytes());

        let mut ilr = sha512_hmac(&self.chain_code, &data);
        data.zeroize();
        let mut tweak = [0u8; 32];
        tweak.copy_from_slice(&ilr[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&ilr[32..]);
        ilr.zeroize();

        let key = match &self.key {
            KeyMaterial::Private(key) => key.tweak_add(&tweak).map(KeyMaterial::Private),
            KeyMaterial::Public(key) => key.tweak_add(&tweak).map(KeyMaterial::Public),
        };
        tweak.zeroize();

        let key = match key {
            Ok(key) => key,
            Err(e) => {
                debug!("child {} at depth {} is unusable: {}", index, depth, e);
                chain_code.zeroize();
                return Err(DerivationError::InvalidChild(index));
            }
        };

        Ok(ExtendedKey {
            key,
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            network: self.network,
        })
    }

    /// Walk `path` from this node.
    pub fn derive_path(&self, path: &[u32]) -> Result<ExtendedKey, DerivationError> {
        let mut node = self.clone();
        for &index in path {
            node = node.child(index)?;
        }
        Ok(node)
    }

    /// The public-only copy of this node.
    pub fn neuter(&self) -> ExtendedKey {
        ExtendedKey {
            key: KeyMaterial::Public(self.public_key()),
            chain_code: self.chain_code,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            network: self.network,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, KeyMaterial::Private(_))
    }

    /// The private key, if this node holds one.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        match &self.key {
            KeyMaterial::Private(key) => Some(key),
            KeyMaterial::Public(_) => None,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match &self.key {
            KeyMaterial::Private(key) => key.pub_key(),
            KeyMaterial::Public(key) => key.clone(),
        }
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// First four bytes of the Hash160 of the compressed public key.
    pub fn fingerprint(&self) -> [u8; 4] {
        let id = hash160(&self.public_key().to_compressed());
        [id[0], id[1], id[2], id[3]]
    }

    /// Version bytes of this node's serialized form on its network.
    pub fn version(&self) -> [u8; 4] {
        if self.is_private() {
            self.network.hd_private_key_id
        } else {
            self.network.hd_public_key_id
        }
    }

    pub fn network(&self) -> &NetworkParams {
        &self.network
    }

    /// The P2PKH cashaddr of this node's compressed public key.
    pub fn address(&self, prefix: &str) -> CashAddress {
        CashAddress::p2pkh(prefix, self.public_key().hash160())
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.chain_code.zeroize();
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("is_private", &self.is_private())
            .field("public_key", &self.public_key().to_hex())
            .field("depth", &self.depth)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("child_number", &self.child_number)
            .field("network", &self.network.name)
            .finish()
    }
}

/// An account node plus the path that reached it.
#[derive(Clone, Debug)]
pub struct AccountKey {
    key: ExtendedKey,
    start_path: HdStartPath,
}

fn harden(index: u32) -> Result<u32, DerivationError> {
    index
        .checked_add(HARDENED_KEY_START)
        .ok_or(DerivationError::InvalidChild(index))
}

impl AccountKey {
    /// Derive `purpose / coin_type / account` below `master`.
    ///
    /// From a private master each level is hardened. With
    /// `include_private == false` the account node is neutered, so it can
    /// only produce addresses, never signatures.
    ///
    /// # Returns
    /// `InvalidChild` when a level to be hardened already has the hardened
    /// bit set.
    pub fn new(
        master: &ExtendedKey,
        purpose: u32,
        coin_type: u32,
        account: u32,
        include_private: bool,
    ) -> Result<Self, DerivationError> {
        let (purpose, coin_type, account) = if master.is_private() {
            (harden(purpose)?, harden(coin_type)?, harden(account)?)
        } else {
            (purpose, coin_type, account)
        };

        let key = master.derive_path(&[purpose, coin_type, account])?;
        let key = if include_private { key } else { key.neuter() };

        Ok(AccountKey {
            key,
            start_path: HdStartPath {
                purpose,
                coin_type,
                account,
            },
        })
    }

    /// Wrap an account-level node obtained elsewhere.
    pub fn from_extended_key(key: ExtendedKey, start_path: HdStartPath) -> Self {
        AccountKey { key, start_path }
    }

    /// Derive the address at `change / index` and render it under the
    /// network's cashaddr prefix.
    ///
    /// # Returns
    /// `InvalidChild` for a hardened `index`; both levels below an account
    /// are normal derivations.
    pub fn derive_address(
        &self,
        change: ChangeType,
        index: u32,
        network: &NetworkParams,
    ) -> Result<Address, DerivationError> {
        if index >= HARDENED_KEY_START {
            return Err(DerivationError::InvalidChild(index));
        }
        let key = self.key.derive_path(&[change.index(), index])?;
        let cash_address = key.address(network.prefix);
        let value = cash_address.encode()?;

        Ok(Address {
            start_path: self.start_path,
            end_path: HdEndPath {
                change: change.index(),
                index,
            },
            value,
            cash_address,
            key,
        })
    }

    pub fn key(&self) -> &ExtendedKey {
        &self.key
    }

    pub fn start_path(&self) -> HdStartPath {
        self.start_path
    }
}

/// A derived address and the key that can spend from it.
#[derive(Clone, Debug)]
pub struct Address {
    pub start_path: HdStartPath,
    pub end_path: HdEndPath,
    /// Text form, `prefix:payload`.
    pub value: String,
    pub cash_address: CashAddress,
    key: ExtendedKey,
}

impl Address {
    pub fn key(&self) -> &ExtendedKey {
        &self.key
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.key.private_key()
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// Full path from the master, hardened levels included.
    pub fn path(&self) -> [u32; 5] {
        [
            self.start_path.purpose,
            self.start_path.coin_type,
            self.start_path.account,
            self.end_path.change,
            self.end_path.index,
        ]
    }
}
