//! String-in, string-out entry points for a foreign front end.
//!
//! Every call returns an [`ApiReturn`] serialized as JSON. `errorId` 0
//! means success and `content` carries the result.

use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use bch_script::StandardExecutor;

use crate::config::WalletConfig;
use crate::context::WalletContext;
use crate::global::{init_slot, slot};
use crate::model::Tx;
use crate::{signer, WalletError};

pub const ERR_NO_METHOD: i32 = 1;
/// Also returned for unknown method names.
pub const ERR_NOT_INITIALIZED: i32 = 2;
pub const ERR_BAD_TX_JSON: i32 = 3;
pub const ERR_SIGN_FAILED: i32 = 4;
pub const ERR_SERIALIZATION: i32 = 5;
pub const ERR_INIT_FAILED: i32 = 6;

/// The result envelope of every API call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiReturn {
    pub error_id: i32,
    pub error_description: String,
    pub content: String,
}

impl ApiReturn {
    pub fn success(content: impl Into<String>) -> Self {
        ApiReturn {
            error_id: 0,
            error_description: String::new(),
            content: content.into(),
        }
    }

    pub fn error(error_id: i32, description: impl Into<String>) -> Self {
        ApiReturn {
            error_id,
            error_description: description.into(),
            content: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_id == 0
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json(&self) -> String {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        match self.serialize(&mut ser) {
            Ok(()) => String::from_utf8(out).unwrap_or_default(),
            Err(e) => fallback_json(&e),
        }
    }

    /// Single-line JSON.
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| fallback_json(&e))
    }

    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn fallback_json(e: &serde_json::Error) -> String {
    warn!("failed to serialize api result: {}", e);
    "{\"errorId\":9999,\"errorDescription\":\"Failed to marshal ApiReturn to json\",\"content\":\"\"}"
        .to_string()
}

/// Positional string parameters of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendParams {
    pub param1: String,
    pub param2: String,
    pub param3: String,
    pub param4: String,
}

impl BackendParams {
    /// Parse a call payload. Blank text means no parameters.
    pub fn parse(payload: &str) -> Result<Self, WalletError> {
        if payload.trim().is_empty() {
            return Ok(BackendParams::default());
        }
        Ok(serde_json::from_str(payload)?)
    }
}

/// The methods a front end can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `M1`: param1 is the mnemonic, empty to generate one.
    Initialize,
    /// `M2`
    Mnemonic,
    /// `M3`
    Address,
    /// `M4`: param1 is the transaction JSON.
    Sign,
}

impl Method {
    /// Look up a method by its short code or its name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "M1" | "initialize" => Some(Method::Initialize),
            "M2" | "mnemonic" => Some(Method::Mnemonic),
            "M3" | "address" => Some(Method::Address),
            "M4" | "sign" => Some(Method::Sign),
            _ => None,
        }
    }
}

/// Dispatch `method` with its JSON `payload` against the process-wide
/// wallet and return the serialized [`ApiReturn`].
pub fn call(method: &str, payload: &str) -> String {
    dispatch(slot(), method, payload)
}

/// Install the process-wide wallet. A second call is a no-op.
pub fn initialize_wallet(mnemonic: &str) -> ApiReturn {
    initialize_in(slot(), mnemonic)
}

pub fn wallet_mnemonic() -> ApiReturn {
    with_wallet(slot(), |ctx| ApiReturn::success(ctx.mnemonic()))
}

pub fn wallet_address() -> ApiReturn {
    with_wallet(slot(), |ctx| ApiReturn::success(ctx.address()))
}

/// Sign the transaction JSON in `tx_json` with the process-wide wallet.
/// On success `content` is the signed transaction JSON.
pub fn sign_transaction(tx_json: &str) -> ApiReturn {
    sign_in(slot(), tx_json)
}

fn dispatch(slot: &OnceCell<WalletContext>, method: &str, payload: &str) -> String {
    if method.is_empty() {
        return ApiReturn::error(ERR_NO_METHOD, "Error: No method name provided").to_json_compact();
    }
    let Some(method_id) = Method::from_name(method) else {
        return ApiReturn::error(
            ERR_NOT_INITIALIZED,
            format!("Error: Unknown method name:{} (Not implemented))", method),
        )
        .to_json_compact();
    };
    debug!("api call {:?}", method_id);

    let result = match method_id {
        Method::Initialize => match BackendParams::parse(payload) {
            Ok(params) => initialize_in(slot, &params.param1),
            Err(e) => ApiReturn::error(ERR_INIT_FAILED, format!("Cannot parse parameters due to:{}", e)),
        },
        Method::Mnemonic => with_wallet(slot, |ctx| ApiReturn::success(ctx.mnemonic())),
        Method::Address => with_wallet(slot, |ctx| ApiReturn::success(ctx.address())),
        Method::Sign => match BackendParams::parse(payload) {
            Ok(params) => sign_in(slot, &params.param1),
            Err(e) => ApiReturn::error(ERR_BAD_TX_JSON, format!("Cannot parse parameters due to:{}", e)),
        },
    };
    result.to_json()
}

fn initialize_in(slot: &OnceCell<WalletContext>, mnemonic: &str) -> ApiReturn {
    match init_slot(slot, mnemonic, WalletConfig::default()) {
        Ok(_) => ApiReturn::success(""),
        Err(e) => ApiReturn::error(ERR_INIT_FAILED, e.to_string()),
    }
}

fn with_wallet(
    slot: &OnceCell<WalletContext>,
    f: impl FnOnce(&WalletContext) -> ApiReturn,
) -> ApiReturn {
    match slot.get() {
        Some(ctx) => f(ctx),
        None => ApiReturn::error(ERR_NOT_INITIALIZED, "Wallet not initialized"),
    }
}

fn sign_in(slot: &OnceCell<WalletContext>, tx_json: &str) -> ApiReturn {
    with_wallet(slot, |ctx| {
        let mut tx = match Tx::from_json(tx_json) {
            Ok(tx) => tx,
            Err(e) => {
                return ApiReturn::error(ERR_BAD_TX_JSON, format!("Cannot deserialize tx request due to:{}", e))
            }
        };
        if let Err(e) = signer::sign_transaction(ctx.mnemonic(), ctx.config(), &mut tx, &StandardExecutor::new()) {
            return ApiReturn::error(ERR_SIGN_FAILED, format!("Cannot sign tx due to:{}", e));
        }
        match tx.to_json() {
            Ok(json) => ApiReturn::success(json),
            Err(e) => ApiReturn::error(ERR_SERIALIZATION, format!("Cannot serialize signed tx due to:{}", e)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "caught before prosper fiscal glimpse verb badge animal dress property kiss analyst wrist bachelor panda view range either develop advice hidden impulse tail volcano";
    const ADDRESS: &str = "bitcoincash:qpjwu6kg8ud8pk9r32u63kprpd2quykzj5l4l7hwmq";

    fn parse(json: &str) -> ApiReturn {
        ApiReturn::from_json(json).unwrap()
    }

    fn params(param1: &str) -> String {
        serde_json::to_string(&BackendParams {
            param1: param1.to_string(),
            ..BackendParams::default()
        })
        .unwrap()
    }

    #[test]
    fn test_api_return_camel_case() {
        let json = ApiReturn::error(3, "bad").to_json();
        assert!(json.contains("\"errorId\": 3"));
        assert!(json.contains("\"errorDescription\": \"bad\""));
        assert!(json.contains("\n    \"content\": \"\""));
        assert!(!parse(&json).is_success());
        assert!(ApiReturn::success("x").is_success());
    }

    #[test]
    fn test_missing_and_unknown_method() {
        let cell = OnceCell::new();
        let result = parse(&dispatch(&cell, "", ""));
        assert_eq!(result.error_id, ERR_NO_METHOD);
        assert_eq!(result.error_description, "Error: No method name provided");

        let result = parse(&dispatch(&cell, "M5", "{}"));
        assert_eq!(result.error_id, 2);
        assert_eq!(result.error_description, "Error: Unknown method name:M5 (Not implemented))");
    }

    #[test]
    fn test_calls_before_initialize() {
        let cell = OnceCell::new();
        for method in ["M2", "M3", "M4"] {
            let result = parse(&dispatch(&cell, method, &params("{}")));
            assert_eq!(result.error_id, ERR_NOT_INITIALIZED, "{}", method);
            assert_eq!(result.error_description, "Wallet not initialized");
        }
    }

    #[test]
    fn test_initialize_then_query() {
        let cell = OnceCell::new();
        let result = parse(&dispatch(&cell, "M1", &params(PHRASE)));
        assert!(result.is_success());
        assert!(result.content.is_empty());

        assert_eq!(parse(&dispatch(&cell, "M2", "")).content, PHRASE);
        assert_eq!(parse(&dispatch(&cell, "address", "")).content, ADDRESS);

        // a second initialize keeps the first wallet
        assert!(parse(&dispatch(&cell, "M1", &params(""))).is_success());
        assert_eq!(parse(&dispatch(&cell, "M3", "")).content, ADDRESS);
    }

    #[test]
    fn test_initialize_failure() {
        let cell = OnceCell::new();
        let result = parse(&dispatch(&cell, "M1", &params("definitely not words")));
        assert_eq!(result.error_id, ERR_INIT_FAILED);
        assert!(!result.error_description.is_empty());

        let result = parse(&dispatch(&cell, "M1", "{not json"));
        assert_eq!(result.error_id, ERR_INIT_FAILED);
        assert!(cell.get().is_none());
    }

    #[test]
    fn test_sign_errors() {
        let cell = OnceCell::new();
        dispatch(&cell, "M1", &params(PHRASE));

        let result = parse(&dispatch(&cell, "M4", &params("{\"inputs\": 5}")));
        assert_eq!(result.error_id, ERR_BAD_TX_JSON);
        assert!(result.error_description.starts_with("Cannot deserialize tx request due to:"));

        let tx = r#"{"inputs":[{"value":1000,"prevHash":"00","pubScript":""}]}"#;
        let result = parse(&dispatch(&cell, "M4", &params(tx)));
        assert_eq!(result.error_id, ERR_SIGN_FAILED);
        assert!(result.error_description.starts_with("Cannot sign tx due to:"));
    }

    #[test]
    fn test_sign_success() {
        let cell = OnceCell::new();
        dispatch(&cell, "M1", &params(PHRASE));

        let tx = r#"{
            "version": 1,
            "inputs": [{
                "value": 100000,
                "prevHash": "bc27832feb4f34e174d7c1bea0a4e4490b30ab222356c829f6649497c2970e68",
                "prevIndex": 0,
                "pubScript": "76a91464ee6ac83f1a70d8a38ab9a8d8230b540e12c29588ac"
            }],
            "outputs": [
                {"value": 2000, "pkScript": "76a914eeed96fd3e0806986e8d19acfee0053b0366601188ac"},
                {"value": 97881, "pkScript": "76a91464ee6ac83f1a70d8a38ab9a8d8230b540e12c29588ac"}
            ],
            "inputVal": 100000,
            "outputVal": 99881
        }"#;
        let result = parse(&dispatch(&cell, "sign", &params(tx)));
        assert!(result.is_success(), "{}", result.error_description);

        let signed = Tx::from_json(&result.content).unwrap();
        assert!(!signed.inputs[0].signature.is_empty());
        assert_eq!(signed.hash.len(), 64);
        assert_eq!(signed.output_val, 99_881);
    }
}
