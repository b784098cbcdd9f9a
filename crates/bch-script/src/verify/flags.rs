//! Script verification flags (bitmask).

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Verification flags handed to a [`ScriptExecutor`](super::ScriptExecutor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifyFlags(pub u32);

impl VerifyFlags {
    pub const NONE: VerifyFlags = VerifyFlags(0);
    pub const P2SH: VerifyFlags = VerifyFlags(1 << 0);
    pub const STRICT_ENCODING: VerifyFlags = VerifyFlags(1 << 1);
    pub const DER_SIGNATURES: VerifyFlags = VerifyFlags(1 << 2);
    pub const LOW_S: VerifyFlags = VerifyFlags(1 << 3);
    pub const SIG_PUSH_ONLY: VerifyFlags = VerifyFlags(1 << 5);
    pub const MINIMAL_DATA: VerifyFlags = VerifyFlags(1 << 6);
    pub const CLEAN_STACK: VerifyFlags = VerifyFlags(1 << 8);
    pub const CHECKLOCKTIMEVERIFY: VerifyFlags = VerifyFlags(1 << 9);
    pub const CHECKSEQUENCEVERIFY: VerifyFlags = VerifyFlags(1 << 10);
    pub const NULL_FAIL: VerifyFlags = VerifyFlags(1 << 14);
    pub const ENABLE_SIGHASH_FORKID: VerifyFlags = VerifyFlags(1 << 16);

    /// Flags for relaying and mining standard transactions.
    pub const STANDARD: VerifyFlags = VerifyFlags(
        Self::P2SH.0
            | Self::STRICT_ENCODING.0
            | Self::DER_SIGNATURES.0
            | Self::LOW_S.0
            | Self::SIG_PUSH_ONLY.0
            | Self::MINIMAL_DATA.0
            | Self::CLEAN_STACK.0
            | Self::CHECKLOCKTIMEVERIFY.0
            | Self::CHECKSEQUENCEVERIFY.0
            | Self::NULL_FAIL.0
            | Self::ENABLE_SIGHASH_FORKID.0,
    );

    pub fn has_flag(self, flag: VerifyFlags) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl BitOr for VerifyFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        VerifyFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for VerifyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for VerifyFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        VerifyFlags(self.0 & rhs.0)
    }
}
