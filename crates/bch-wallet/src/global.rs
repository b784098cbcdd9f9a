//! The process-wide wallet.
//!
//! The first successful initialize wins. Later calls, with any mnemonic,
//! return the wallet already in place. Concurrent initializers block on
//! the same cell, so exactly one mnemonic is ever installed. There is no
//! teardown.

use log::info;
use once_cell::sync::OnceCell;

use bch_script::ScriptExecutor;

use crate::config::WalletConfig;
use crate::context::WalletContext;
use crate::model::Tx;
use crate::{signer, WalletError};

static WALLET: OnceCell<WalletContext> = OnceCell::new();

/// Initialize the wallet with the default configuration.
pub fn initialize(mnemonic: &str) -> Result<&'static WalletContext, WalletError> {
    initialize_with_config(mnemonic, WalletConfig::default())
}

pub fn initialize_with_config(
    mnemonic: &str,
    config: WalletConfig,
) -> Result<&'static WalletContext, WalletError> {
    init_slot(&WALLET, mnemonic, config)
}

pub fn get() -> Option<&'static WalletContext> {
    WALLET.get()
}

pub fn is_initialized() -> bool {
    WALLET.get().is_some()
}

pub fn mnemonic() -> Result<&'static str, WalletError> {
    Ok(get().ok_or(WalletError::NotInitialized)?.mnemonic())
}

pub fn address() -> Result<&'static str, WalletError> {
    Ok(get().ok_or(WalletError::NotInitialized)?.address())
}

/// Sign `tx` with the installed wallet's mnemonic.
pub fn sign_transaction(tx: &mut Tx, executor: &dyn ScriptExecutor) -> Result<(), WalletError> {
    let ctx = get().ok_or(WalletError::NotInitialized)?;
    signer::sign_transaction(ctx.mnemonic(), ctx.config(), tx, executor)
}

pub(crate) fn slot() -> &'static OnceCell<WalletContext> {
    &WALLET
}

/// Install a wallet into `slot` unless one is already there.
pub(crate) fn init_slot<'a>(
    slot: &'a OnceCell<WalletContext>,
    mnemonic: &str,
    config: WalletConfig,
) -> Result<&'a WalletContext, WalletError> {
    if let Some(existing) = slot.get() {
        info!("wallet already initialized, keeping {}", existing.address());
        return Ok(existing);
    }
    slot.get_or_try_init(|| WalletContext::initialize(mnemonic, config))
}
