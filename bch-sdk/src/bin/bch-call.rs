//! Run one wallet API call from the command line.
//!
//! ```text
//! bch-call <method> [payload-json]
//! ```
//!
//! Prints the JSON result envelope. Set `RUST_LOG` for engine logs.

use std::process::ExitCode;

use bch_sdk::wallet::{api, ApiReturn};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let method = args.next().unwrap_or_default();
    let payload = args.next().unwrap_or_default();

    let mnemonic = std::env::var("BCH_MNEMONIC").unwrap_or_default();
    if method != "M1" && !mnemonic.is_empty() {
        let init = api::initialize_wallet(&mnemonic);
        if !init.is_success() {
            eprintln!("{}", init.to_json());
            return ExitCode::FAILURE;
        }
    }

    let reply = api::call(&method, &payload);
    println!("{}", reply);
    match ApiReturn::from_json(&reply) {
        Ok(result) if result.is_success() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
