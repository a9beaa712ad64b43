//! Cryptographic primitives for Ethereum accounts.
//!
//! This module provides:
//! - Keccak-256 hashing
//! - secp256k1 key generation, signing and public key recovery
//! - Ethereum address derivation and EIP-55 formatting
//! - The `{r, s, v}` signature value type

mod address;
mod keys;
pub(crate) mod serde_hex;
mod signature;

pub use address::Address;
pub use keys::{
    address_of, parse_secret_key, random_secret_key, recover_address, secret_key_from_entropy,
    sign_hash,
};
pub(crate) use keys::recover_with_id;
pub use signature::{RecoverableSignature, Signature};

use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 of arbitrary bytes (output 32 bytes).
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(input);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Keccak-256 over several slices, as if they were concatenated.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Strips a leading `0x`/`0X` if present.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// True for `0x`-prefixed strings made only of hex digits (`"0x"` included).
pub fn is_hex_strict(s: &str) -> bool {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Decodes hex with an optional `0x` prefix. Odd-length input is left-padded
/// with a zero nibble.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits = strip_hex_prefix(s);
    if digits.len() % 2 == 1 {
        hex::decode(format!("0{}", digits))
    } else {
        hex::decode(digits)
    }
}
