//! Signing and validating application transactions.

use log::{debug, warn};

use bch_script::address::MAINNET_PREFIX;
use bch_script::chunk::encode_push_datas;
use bch_script::{classify, Script, ScriptClass, ScriptExecutor, VerifyFlags};
use bch_wire::sighash::{signature_hash, SIGHASH_ALL_FORKID};

use crate::config::WalletConfig;
use crate::context::signing_key;
use crate::model::{Tx, TxIn};
use crate::WalletError;

/// Sign every input of `tx` with the receiving key of `mnemonic`.
///
/// The key is derived from `mnemonic` on every call. P2PKH and P2PK inputs
/// are signed with `ALL|FORKID` over the input's `value` and `pub_script`.
/// Inputs of any other class are skipped and logged; their `signature`
/// stays as it was.
///
/// # Returns
/// * `EmptyScript` as soon as an input has no `pub_script`.
/// * `PartiallySigned` when any input was skipped. Signatures already
///   made are kept on the transaction.
/// * Otherwise the result of [`validate_tx`].
pub fn sign_transaction(
    mnemonic: &str,
    config: &WalletConfig,
    tx: &mut Tx,
    executor: &dyn ScriptExecutor,
) -> Result<(), WalletError> {
    let key = signing_key(mnemonic, config)?;
    let pub_key = key.pub_key().to_compressed();
    let prefix = config.params().prefix;
    let mut wire = tx.to_wire(prefix)?;

    let mut all_signed = true;
    for (idx, input) in tx.inputs.iter_mut().enumerate() {
        if input.pub_script.is_empty() {
            return Err(WalletError::EmptyScript(idx));
        }
        let locking = Script::from_hex(&input.pub_script)?;
        let class = classify(&locking);
        if !matches!(class, ScriptClass::PubKeyHash | ScriptClass::PubKey) {
            warn!("input {} locked by a {} script, leaving it unsigned", idx, class);
            all_signed = false;
            continue;
        }

        let value = spent_value(idx, input)?;
        let digest = signature_hash(&wire, idx, locking.to_bytes(), SIGHASH_ALL_FORKID, value)?;
        let mut sig = key.sign(&digest)?.to_der();
        sig.push(SIGHASH_ALL_FORKID as u8);

        let unlocking = if class == ScriptClass::PubKeyHash {
            encode_push_datas(&[sig.as_slice(), pub_key.as_slice()])?
        } else {
            encode_push_datas(&[sig.as_slice()])?
        };
        input.signature = hex::encode(&unlocking);
        wire.set_unlocking_script(idx, Script::from_bytes(&unlocking));
        debug!("signed input {} ({})", idx, class);
    }

    if !all_signed {
        return Err(WalletError::PartiallySigned);
    }

    tx.hash = wire.tx_id();
    tx.size = wire.size() as i32;
    validate_tx(tx, executor)
}

/// Run every input's spending condition with the standard flags.
///
/// # Returns
/// `ValidationFailed` on the first failing input; which input and why is
/// only logged.
pub fn validate_tx(tx: &Tx, executor: &dyn ScriptExecutor) -> Result<(), WalletError> {
    let wire = tx.to_wire(MAINNET_PREFIX)?;
    for (idx, input) in tx.inputs.iter().enumerate() {
        let locking = Script::from_hex(&input.pub_script)?;
        let value = spent_value(idx, input)?;
        if let Err(e) = executor.execute(&locking, &wire, idx, value, VerifyFlags::STANDARD) {
            warn!("input {} of {} failed validation: {}", idx, wire.tx_id(), e);
            return Err(WalletError::ValidationFailed);
        }
    }
    Ok(())
}

fn spent_value(idx: usize, input: &TxIn) -> Result<u64, WalletError> {
    u64::try_from(input.value).map_err(|_| {
        WalletError::InvalidTransaction(format!("input {} spends negative value {}", idx, input.value))
    })
}
