//! Application-level transaction records.
//!
//! These are the JSON shapes the wallet exchanges with its front end and
//! backend: hex scripts, display-order hashes and signed amounts. They
//! convert to and from the wire [`bch_wire::Tx`] for signing and display.

use serde::{Deserialize, Serialize};

use bch_primitives::chainhash::Hash;
use bch_script::Script;
use bch_wire::input::{address_from_unlocking_script, DEFAULT_SEQUENCE_NUMBER};
use bch_wire::{TxInput, TxOutput};

use crate::WalletError;

/// Version given to transactions that do not name one.
pub const DEFAULT_TX_VERSION: i32 = 1;

/// A transaction input as the front end sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxIn {
    pub sequence: u32,
    /// Satoshis held by the spent output; the signature commits to it.
    pub value: i64,
    /// Spent transaction id, display-order hex.
    pub prev_hash: String,
    pub prev_index: u32,
    /// Hex locking script of the spent output.
    pub pub_script: String,
    /// Hex unlocking script; empty until signed.
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxOut {
    pub value: i64,
    pub spent: bool,
    /// Hex locking script.
    pub pk_script: String,
    pub address: String,
}

/// A transaction with the bookkeeping fields the wallet displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tx {
    pub hash: String,
    /// Unix seconds of the block or of first sight in the mempool.
    pub date_time: i64,
    pub size: i32,
    pub height: i32,
    pub index: i32,
    pub version: i32,
    pub lock_time: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub input_val: i64,
    pub output_val: i64,
    pub cash_back: i64,
    pub network_fee: i64,
}

impl Default for Tx {
    fn default() -> Self {
        Tx {
            hash: String::new(),
            date_time: 0,
            size: 0,
            height: 0,
            index: 0,
            version: DEFAULT_TX_VERSION,
            lock_time: 0,
            inputs: Vec::new(),
            outputs: Vec::new(),
            input_val: 0,
            output_val: 0,
            cash_back: 0,
            network_fee: 0,
        }
    }
}

impl Tx {
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build the wire transaction.
    ///
    /// Each input's `signature` hex becomes its unlocking script and each
    /// output's `pk_script` hex its locking script. Addresses on the wire
    /// form are derived under `prefix`.
    ///
    /// # Returns
    /// An error for malformed hex or hashes and for negative amounts.
    pub fn to_wire(&self, prefix: &str) -> Result<bch_wire::Tx, WalletError> {
        let mut inputs = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let unlocking_script = Script::from_hex(&input.signature)?;
            inputs.push(TxInput {
                prev_hash: Hash::from_hex(&input.prev_hash)?,
                prev_index: input.prev_index,
                address: address_from_unlocking_script(&unlocking_script, prefix),
                unlocking_script,
                sequence: input.sequence,
            });
        }

        let mut outputs = Vec::with_capacity(self.outputs.len());
        for output in &self.outputs {
            let value = u64::try_from(output.value).map_err(|_| {
                WalletError::InvalidTransaction(format!("negative output value {}", output.value))
            })?;
            outputs.push(TxOutput::new(value, Script::from_hex(&output.pk_script)?, prefix));
        }

        Ok(bch_wire::Tx::with_prefix(
            prefix,
            self.version as u32,
            inputs,
            outputs,
            self.lock_time,
        ))
    }

    /// Convert a decoded wire transaction for display.
    ///
    /// Spent values and locking scripts of the inputs are not part of the
    /// wire form and are left empty.
    ///
    /// # Returns
    /// `InvalidTransaction` when an output value or the totals do not fit
    /// an `i64`.
    pub fn from_wire(tx: &bch_wire::Tx) -> Result<Self, WalletError> {
        let inputs = tx
            .inputs()
            .iter()
            .map(|input| TxIn {
                sequence: input.sequence,
                value: 0,
                prev_hash: input.prev_hash.to_string(),
                prev_index: input.prev_index,
                pub_script: String::new(),
                signature: input.unlocking_script.to_hex(),
                address: input.address.as_ref().and_then(|a| a.encode().ok()),
            })
            .collect();

        let outputs = tx
            .outputs()
            .iter()
            .map(|output| {
                let value = i64::try_from(output.value).map_err(|_| {
                    WalletError::InvalidTransaction(format!("output value {} out of range", output.value))
                })?;
                Ok(TxOut {
                    value,
                    spent: false,
                    pk_script: output.locking_script.to_hex(),
                    address: output
                        .address
                        .as_ref()
                        .and_then(|a| a.encode().ok())
                        .unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, WalletError>>()?;

        let mut model = Tx {
            hash: tx.tx_id(),
            size: tx.size() as i32,
            version: tx.version() as i32,
            lock_time: tx.lock_time(),
            inputs,
            outputs,
            ..Tx::default()
        };
        model.update_totals()?;
        Ok(model)
    }

    /// Recompute `input_val`, `output_val` and `network_fee` from the
    /// inputs and outputs.
    ///
    /// # Returns
    /// `InvalidTransaction` when a sum overflows; the fields are left
    /// untouched then.
    pub fn update_totals(&mut self) -> Result<(), WalletError> {
        let input_val = checked_total(self.inputs.iter().map(|i| i.value), "input")?;
        let output_val = checked_total(self.outputs.iter().map(|o| o.value), "output")?;
        let network_fee = if input_val > 0 {
            input_val.checked_sub(output_val).ok_or_else(|| {
                WalletError::InvalidTransaction("network fee out of range".to_string())
            })?
        } else {
            0
        };
        self.input_val = input_val;
        self.output_val = output_val;
        self.network_fee = network_fee;
        Ok(())
    }
}

fn checked_total(mut values: impl Iterator<Item = i64>, side: &str) -> Result<i64, WalletError> {
    values.try_fold(0i64, |acc, v| {
        acc.checked_add(v)
            .ok_or_else(|| WalletError::InvalidTransaction(format!("{} total out of range", side)))
    })
}

/// An unspent output the wallet can fund a transaction with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Utxo {
    pub hash: String,
    pub index: i32,
    pub pk_script: String,
    pub value: i64,
}

impl Utxo {
    /// An unsigned input spending this output.
    ///
    /// # Returns
    /// `InvalidTransaction` for a negative output index.
    pub fn to_input(&self) -> Result<TxIn, WalletError> {
        let prev_index = u32::try_from(self.index).map_err(|_| {
            WalletError::InvalidTransaction(format!("negative output index {}", self.index))
        })?;
        Ok(TxIn {
            sequence: DEFAULT_SEQUENCE_NUMBER,
            value: self.value,
            prev_hash: self.hash.clone(),
            prev_index,
            pub_script: self.pk_script.clone(),
            signature: String::new(),
            address: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREV_HASH: &str = "bc27832feb4f34e174d7c1bea0a4e4490b30ab222356c829f6649497c2970e68";
    const PAY_SCRIPT: &str = "76a914eeed96fd3e0806986e8d19acfee0053b0366601188ac";
    const CHANGE_SCRIPT: &str = "76a91464ee6ac83f1a70d8a38ab9a8d8230b540e12c29588ac";

    fn sample() -> Tx {
        Tx {
            inputs: vec![TxIn {
                value: 100_000,
                prev_hash: PREV_HASH.to_string(),
                pub_script: CHANGE_SCRIPT.to_string(),
                ..TxIn::default()
            }],
            outputs: vec![
                TxOut {
                    value: 2_000,
                    pk_script: PAY_SCRIPT.to_string(),
                    ..TxOut::default()
                },
                TxOut {
                    value: 97_881,
                    pk_script: CHANGE_SCRIPT.to_string(),
                    ..TxOut::default()
                },
            ],
            ..Tx::default()
        }
    }

    #[test]
    fn test_json_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["lockTime"], 0);
        assert_eq!(json["version"], 1);
        assert_eq!(json["inputs"][0]["prevHash"], PREV_HASH);
        assert_eq!(json["inputs"][0]["pubScript"], CHANGE_SCRIPT);
        assert_eq!(json["outputs"][1]["pkScript"], CHANGE_SCRIPT);
        assert!(json["inputs"][0].get("address").is_none());
        assert!(json.get("networkFee").is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let tx = Tx::from_json(r#"{"inputs":[{"prevHash":"00","value":5}]}"#).unwrap();
        assert_eq!(tx.version, 1);
        assert_eq!(tx.inputs[0].value, 5);
        assert_eq!(tx.inputs[0].sequence, 0);
        assert!(tx.outputs.is_empty());
    }

    #[test]
    fn test_to_wire() {
        let wire = sample().to_wire("bitcoincash").unwrap();
        assert_eq!(wire.version(), 1);
        assert_eq!(wire.inputs()[0].prev_hash.to_string(), PREV_HASH);
        assert!(wire.inputs()[0].unlocking_script.is_empty());
        assert_eq!(wire.outputs()[0].value, 2_000);
        assert_eq!(
            wire.outputs()[1].address.as_ref().unwrap().encode().unwrap(),
            "bitcoincash:qpjwu6kg8ud8pk9r32u63kprpd2quykzj5l4l7hwmq"
        );
    }

    #[test]
    fn test_to_wire_rejects_bad_fields() {
        let mut tx = sample();
        tx.outputs[0].value = -1;
        assert!(matches!(
            tx.to_wire("bitcoincash"),
            Err(WalletError::InvalidTransaction(_))
        ));

        let mut tx = sample();
        tx.inputs[0].prev_hash = "zz".to_string();
        assert!(tx.to_wire("bitcoincash").is_err());

        let mut tx = sample();
        tx.outputs[0].pk_script = "abc".to_string();
        assert!(tx.to_wire("bitcoincash").is_err());
    }

    #[test]
    fn test_from_wire() {
        let wire = sample().to_wire("bitcoincash").unwrap();
        let model = Tx::from_wire(&wire).unwrap();
        assert_eq!(model.hash, wire.tx_id());
        assert_eq!(model.size as usize, wire.size());
        assert_eq!(model.inputs[0].prev_hash, PREV_HASH);
        assert_eq!(model.outputs[1].pk_script, CHANGE_SCRIPT);
        assert_eq!(
            model.outputs[1].address,
            "bitcoincash:qpjwu6kg8ud8pk9r32u63kprpd2quykzj5l4l7hwmq"
        );
        assert_eq!(model.output_val, 99_881);
        assert_eq!(model.network_fee, 0);
    }

    #[test]
    fn test_totals_and_utxo_input() {
        let mut tx = sample();
        tx.update_totals().unwrap();
        assert_eq!(tx.input_val, 100_000);
        assert_eq!(tx.network_fee, 119);

        let utxo = Utxo {
            hash: PREV_HASH.to_string(),
            index: 2,
            pk_script: CHANGE_SCRIPT.to_string(),
            value: 42,
        };
        let input = utxo.to_input().unwrap();
        assert_eq!(input.prev_index, 2);
        assert_eq!(input.sequence, 0xFFFF_FFFF);
        assert_eq!(input.pub_script, CHANGE_SCRIPT);
        assert!(input.signature.is_empty());

        let negative = Utxo { index: -1, ..utxo };
        assert!(matches!(
            negative.to_input(),
            Err(WalletError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_from_wire_rejects_overflowing_totals() {
        let lock = Script::from_hex(PAY_SCRIPT).unwrap();
        let wire = bch_wire::Tx::new(
            1,
            vec![TxInput::new(Hash::from_hex(PREV_HASH).unwrap(), 0)],
            vec![
                TxOutput::new(u64::MAX / 2, lock.clone(), "bitcoincash"),
                TxOutput::new(u64::MAX / 2, lock.clone(), "bitcoincash"),
            ],
            0,
        );
        let decoded = bch_wire::Tx::from_bytes(&wire.pack()).unwrap();
        assert!(matches!(
            Tx::from_wire(&decoded),
            Err(WalletError::InvalidTransaction(_))
        ));

        let wire = bch_wire::Tx::new(
            1,
            vec![TxInput::new(Hash::from_hex(PREV_HASH).unwrap(), 0)],
            vec![TxOutput::new(u64::MAX, lock, "bitcoincash")],
            0,
        );
        assert!(matches!(
            Tx::from_wire(&wire),
            Err(WalletError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_update_totals_overflow_leaves_fields() {
        let mut tx = sample();
        tx.update_totals().unwrap();
        tx.inputs.push(TxIn {
            value: i64::MAX,
            ..TxIn::default()
        });
        assert!(tx.update_totals().is_err());
        assert_eq!(tx.input_val, 100_000);
    }
}
