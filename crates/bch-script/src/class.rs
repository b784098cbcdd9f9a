//! Standard script classification.
//!
//! Tags a locking script with its standard shape and pulls out the
//! addresses it pays to. Transaction decoding uses this for best-effort
//! address display, and the signer uses it to decide which inputs it can
//! satisfy.

use std::fmt;

use crate::address::CashAddress;
use crate::opcodes::PREFIX_TOKEN;
use crate::script::Script;

/// The standard shape of a locking script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptClass {
    PubKeyHash,
    PubKey,
    ScriptHash,
    MultiSig,
    NullData,
    NonStandard,
}

impl fmt::Display for ScriptClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScriptClass::PubKeyHash => "pubkeyhash",
            ScriptClass::PubKey => "pubkey",
            ScriptClass::ScriptHash => "scripthash",
            ScriptClass::MultiSig => "multisig",
            ScriptClass::NullData => "nulldata",
            ScriptClass::NonStandard => "nonstandard",
        })
    }
}

/// Classify a locking script.
///
/// Scripts carrying a CashToken prefix are non-standard here; strip the
/// prefix first and classify the spending condition that follows it.
pub fn classify(script: &Script) -> ScriptClass {
    if script.to_bytes().first() == Some(&PREFIX_TOKEN) {
        ScriptClass::NonStandard
    } else if script.is_p2pkh() {
        ScriptClass::PubKeyHash
    } else if script.is_p2pk() {
        ScriptClass::PubKey
    } else if script.is_p2sh() {
        ScriptClass::ScriptHash
    } else if script.is_multisig() {
        ScriptClass::MultiSig
    } else if script.is_null_data() {
        ScriptClass::NullData
    } else {
        ScriptClass::NonStandard
    }
}

/// Classify `script` and list the addresses it pays to under `prefix`.
///
/// Pubkey and multisig scripts yield the P2PKH address of each embedded
/// key; null-data and non-standard scripts yield none.
pub fn extract_addresses(script: &Script, prefix: &str) -> (ScriptClass, Vec<CashAddress>) {
    let class = classify(script);
    let bytes = script.to_bytes();
    let addresses = match class {
        ScriptClass::PubKeyHash => {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&bytes[3..23]);
            vec![CashAddress::p2pkh(prefix, hash)]
        }
        ScriptClass::ScriptHash => {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&bytes[2..22]);
            vec![CashAddress::p2sh(prefix, hash)]
        }
        ScriptClass::PubKey | ScriptClass::MultiSig => script
            .chunks()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.data)
            .filter(|d| d.len() == 33 || d.len() == 65)
            .map(|key| CashAddress::from_public_key_bytes(prefix, &key))
            .collect(),
        ScriptClass::NullData | ScriptClass::NonStandard => Vec::new(),
    };
    (class, addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::MAINNET_PREFIX;

    const PUBKEY_HEX: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn script(hex_str: &str) -> Script {
        Script::from_hex(hex_str).unwrap()
    }

    #[test]
    fn test_classify_standard_shapes() {
        assert_eq!(
            classify(&script("76a914eeed96fd3e0806986e8d19acfee0053b0366601188ac")),
            ScriptClass::PubKeyHash
        );
        assert_eq!(
            classify(&script("a9149a1c78a507689f6f54b847ad1cef1e614ee23f1e87")),
            ScriptClass::ScriptHash
        );
        assert_eq!(classify(&script(&format!("21{}ac", PUBKEY_HEX))), ScriptClass::PubKey);
        assert_eq!(
            classify(&script(&format!("5121{k}21{k}52ae", k = PUBKEY_HEX))),
            ScriptClass::MultiSig
        );
        assert_eq!(classify(&script("6a0568656c6c6f")), ScriptClass::NullData);
        assert_eq!(classify(&script("51")), ScriptClass::NonStandard);
        assert_eq!(classify(&Script::new()), ScriptClass::NonStandard);
    }

    #[test]
    fn test_token_prefixed_script_is_nonstandard() {
        let mut bytes = vec![PREFIX_TOKEN];
        bytes.extend_from_slice(&[0u8; 32]);
        bytes.push(0x20);
        bytes.extend_from_slice(&hex::decode("76a914eeed96fd3e0806986e8d19acfee0053b0366601188ac").unwrap());
        assert_eq!(classify(&Script::from_bytes(&bytes)), ScriptClass::NonStandard);
    }

    #[test]
    fn test_extract_p2pkh_address() {
        let (class, addrs) = extract_addresses(
            &script("76a91476a04053bda0a88bda5177b86a15c3b29f55987388ac"),
            MAINNET_PREFIX,
        );
        assert_eq!(class, ScriptClass::PubKeyHash);
        assert_eq!(
            addrs[0].to_string(),
            "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"
        );
    }

    #[test]
    fn test_extract_p2sh_address() {
        let (class, addrs) = extract_addresses(
            &script("a91476a04053bda0a88bda5177b86a15c3b29f55987387"),
            MAINNET_PREFIX,
        );
        assert_eq!(class, ScriptClass::ScriptHash);
        assert_eq!(
            addrs[0].to_string(),
            "bitcoincash:ppm2qsznhks23z7629mms6s4cwef74vcwvn0h829pq"
        );
    }

    #[test]
    fn test_extract_multisig_addresses() {
        let (class, addrs) = extract_addresses(
            &script(&format!("5121{k}21{k}52ae", k = PUBKEY_HEX)),
            MAINNET_PREFIX,
        );
        assert_eq!(class, ScriptClass::MultiSig);
        assert_eq!(addrs.len(), 2);
        assert_eq!(
            addrs[0].to_string(),
            "bitcoincash:qp63uahgrxged4z5jswyt5dn5v3lzsem6cy4spdc2h"
        );
    }

    #[test]
    fn test_extract_null_data_has_no_address() {
        let (class, addrs) = extract_addresses(&script("6a0568656c6c6f"), MAINNET_PREFIX);
        assert_eq!(class, ScriptClass::NullData);
        assert!(addrs.is_empty());
    }
}
