//! Personal message signing and signer recovery.
//!
//! Messages are hashed as
//! `keccak256("\x19Ethereum Signed Message:\n" ‖ len(message) ‖ message)`
//! where `len` is the decimal byte length. Signing and the default recovery
//! path both use this digest.

use serde::Serialize;

use crate::account::Account;
use crate::crypto::{self, decode_hex, is_hex_strict, keccak256_concat, Address, Signature};
use crate::error::{AccountsError, Result};

/// Prefix mixed into every personal-message digest.
pub const MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Converts user input into message bytes: strict hex (`0x…`) is decoded,
/// anything else is taken as UTF-8 text.
pub fn to_message_bytes(data: &str) -> Vec<u8> {
    if is_hex_strict(data) {
        if let Ok(bytes) = decode_hex(data) {
            return bytes;
        }
    }
    data.as_bytes().to_vec()
}

/// Digest of `message` under the personal-message convention.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let length = message.len().to_string();
    keccak256_concat(&[MESSAGE_PREFIX.as_bytes(), length.as_bytes(), message])
}

/// Result of signing a personal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedMessage {
    pub message: String,
    #[serde(with = "crate::crypto::serde_hex::bytes32")]
    pub message_hash: [u8; 32],
    pub v: u64,
    #[serde(with = "crate::crypto::serde_hex::bytes32")]
    pub r: [u8; 32],
    #[serde(with = "crate::crypto::serde_hex::bytes32")]
    pub s: [u8; 32],
    /// 0x-prefixed `r ‖ s ‖ v`.
    pub signature: String,
}

impl SignedMessage {
    pub fn to_signature(&self) -> Signature {
        Signature::new(self.r, self.s, self.v)
    }
}

/// Signs `data` with `account`.
pub fn sign(data: &str, account: &Account) -> Result<SignedMessage> {
    let message_hash = hash_message(&to_message_bytes(data));
    let signature = account.sign_hash(&message_hash)?;

    Ok(SignedMessage {
        message: data.to_string(),
        message_hash,
        v: signature.v,
        r: signature.r,
        s: signature.s,
        signature: signature.to_hex(),
    })
}

/// The shapes a recovery request can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverInput {
    /// A message with a full signature. When `prefixed` is set, `message` is
    /// already the 32-byte digest in hex.
    Signed {
        message: String,
        signature: Signature,
        prefixed: bool,
    },
    /// A digest with its signature, e.g. the output of [`sign`]. No prefix
    /// step is applied.
    SignedHash {
        message_hash: [u8; 32],
        signature: Signature,
    },
    /// A message with separately supplied `v`, `r`, `s`.
    Components {
        message: String,
        v: u64,
        r: [u8; 32],
        s: [u8; 32],
        prefixed: bool,
    },
}

impl RecoverInput {
    /// Reduces any input shape to the digest and signature to recover from.
    pub fn resolve(&self) -> Result<([u8; 32], Signature)> {
        match self {
            RecoverInput::Signed {
                message,
                signature,
                prefixed,
            } => Ok((message_digest(message, *prefixed)?, *signature)),
            RecoverInput::SignedHash {
                message_hash,
                signature,
            } => Ok((*message_hash, *signature)),
            RecoverInput::Components {
                message,
                v,
                r,
                s,
                prefixed,
            } => Ok((message_digest(message, *prefixed)?, Signature::new(*r, *s, *v))),
        }
    }
}

impl From<&SignedMessage> for RecoverInput {
    fn from(signed: &SignedMessage) -> Self {
        RecoverInput::SignedHash {
            message_hash: signed.message_hash,
            signature: signed.to_signature(),
        }
    }
}

fn message_digest(message: &str, prefixed: bool) -> Result<[u8; 32]> {
    if prefixed {
        let bytes = to_message_bytes(message);
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| AccountsError::InvalidMessageHash(len))
    } else {
        Ok(hash_message(&to_message_bytes(message)))
    }
}

/// Recovers the address that produced the signature in `input`.
pub fn recover(input: &RecoverInput) -> Result<Address> {
    let (digest, signature) = input.resolve()?;
    crypto::recover_address(&digest, &signature)
}
