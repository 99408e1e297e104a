use rand::Rng;
use sha2::{Digest, Sha256};

pub const CODE_LEN: usize = 6;

/// Six decimal digits, zero padded.
pub fn generate() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

/// Only the digest of a code is ever stored.
pub fn hash(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.trim().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn is_well_formed(code: &str) -> bool {
    let code = code.trim();
    code.len() == CODE_LEN && code.chars().all(|c| c.is_ascii_digit())
}
