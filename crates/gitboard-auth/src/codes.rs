//! Verification-code key layout and generation.
//!
//! Codes live in the key-value store under `verify:<scene>:<email>` with a
//! 5 minute TTL. A separate cooldown marker `limit:<scene>:<email>` (60 s,
//! set-if-absent) throttles re-issuance. At most one code is active per
//! (scene, email) pair; consuming a code deletes it.

use gitboard_core::VerificationScene;
use rand::Rng;

/// How long an issued code stays valid.
pub const CODE_TTL_SECS: u64 = 300;

/// Minimum interval between two code issuances for the same (scene, email).
pub const CODE_COOLDOWN_SECS: u64 = 60;

pub fn verify_key(scene: VerificationScene, email: &str) -> String {
    format!("verify:{scene}:{email}")
}

pub fn limit_key(scene: VerificationScene, email: &str) -> String {
    format!("limit:{scene}:{email}")
}

/// Generate a 6-digit numeric code, zero-padded.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}
