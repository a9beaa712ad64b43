//! secp256k1 key handling: generation, signing and recovery.

use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::ecdsa::{self, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use super::{keccak256, Address, RecoverableSignature, Signature};
use crate::error::{AccountsError, Result};

/// Draws a random private key from the OS RNG.
///
/// Draws that are zero or not below the curve order are discarded and
/// redrawn.
pub fn random_secret_key() -> SecretKey {
    let mut bytes = [0u8; 32];
    loop {
        OsRng.fill_bytes(&mut bytes);
        if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
            return secret_key;
        }
    }
}

/// Derives a private key deterministically from caller-supplied entropy.
///
/// The key is `keccak256(entropy)`, re-hashed until it is a valid scalar.
pub fn secret_key_from_entropy(entropy: &[u8]) -> SecretKey {
    let mut candidate = keccak256(entropy);
    loop {
        if let Ok(secret_key) = SecretKey::from_slice(&candidate) {
            return secret_key;
        }
        candidate = keccak256(&candidate);
    }
}

/// Parses 32 raw bytes into a private key.
pub fn parse_secret_key(bytes: &[u8]) -> Result<SecretKey> {
    if bytes.len() != 32 {
        return Err(AccountsError::InvalidKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    SecretKey::from_slice(bytes)
        .map_err(|_| AccountsError::InvalidKey("not a valid secp256k1 scalar".into()))
}

/// Returns the Ethereum address controlled by `secret_key`.
pub fn address_of(secret_key: &SecretKey) -> Address {
    let secp = Secp256k1::signing_only();
    let public_key = PublicKey::from_secret_key(&secp, secret_key);
    Address::from_public_key(&public_key)
}

/// Signs a 32-byte digest with deterministic (RFC6979) ECDSA.
pub fn sign_hash(secret_key: &SecretKey, hash: &[u8; 32]) -> RecoverableSignature {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest(*hash);
    let signature = secp.sign_ecdsa_recoverable(&message, secret_key);
    let (recovery_id, compact) = signature.serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[..32]);
    s.copy_from_slice(&compact[32..]);

    RecoverableSignature {
        r,
        s,
        recovery_id: recovery_id.to_i32() as u8,
    }
}

/// Recovers the signer's address from a digest and signature.
pub fn recover_address(hash: &[u8; 32], signature: &Signature) -> Result<Address> {
    let recovery_id = signature.recovery_id()?;
    recover_with_id(hash, &signature.r, &signature.s, recovery_id)
}

pub(crate) fn recover_with_id(
    hash: &[u8; 32],
    r: &[u8; 32],
    s: &[u8; 32],
    recovery_id: u8,
) -> Result<Address> {
    let recovery_id = RecoveryId::from_i32(recovery_id as i32)
        .map_err(|_| AccountsError::InvalidSignature(format!("recovery id {}", recovery_id)))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(r);
    compact[32..].copy_from_slice(s);
    let signature = ecdsa::RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| AccountsError::InvalidSignature(e.to_string()))?;

    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(*hash);
    let public_key = secp
        .recover_ecdsa(&message, &signature)
        .map_err(|e| AccountsError::InvalidSignature(e.to_string()))?;

    Ok(Address::from_public_key(&public_key))
}
