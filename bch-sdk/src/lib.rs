#![deny(missing_docs)]

//! Bitcoin Cash SDK - Light-client engine.
//!
//! Re-exports the SDK components for convenient single-crate usage.

pub use bch_primitives as primitives;
pub use bch_script as script;
pub use bch_wire as wire;
pub use bch_wallet as wallet;
