//! Error types shared by every module of the crate.

use thiserror::Error;

use crate::rlp::RlpError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AccountsError>;

#[derive(Debug, Error)]
pub enum AccountsError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Malformed RLP encoding: {0}")]
    MalformedEncoding(#[from] RlpError),

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("Sender address is required to fetch the nonce")]
    MissingSender,

    #[error("Transaction field is missing: {0}")]
    MissingField(&'static str),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Message hash must be 32 bytes, got {0}")]
    InvalidMessageHash(usize),

    /// MAC mismatch. Wrong passwords and corrupted files look the same.
    #[error("Key derivation failed - possibly wrong password")]
    KeystoreIntegrity,

    #[error("Keystore address mismatch: expected {expected}, derived {actual}")]
    AddressMismatch { expected: String, actual: String },

    #[error("Unsupported keystore: {0}")]
    UnsupportedKeystore(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
