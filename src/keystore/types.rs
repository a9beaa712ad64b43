//! V3 keystore JSON document and encryption options.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Keystore format version this crate reads and writes.
pub const KEYSTORE_VERSION: u32 = 3;

/// A Web3 Secret Storage (V3) document.
///
/// Hex fields are lowercase without the 0x prefix; `address` likewise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreV3 {
    pub version: u32,
    pub id: String,
    pub address: String,
    #[serde(alias = "Crypto")]
    pub crypto: CryptoSection,
}

impl KeystoreV3 {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoSection {
    pub ciphertext: String,
    pub cipherparams: CipherParams,
    pub cipher: String,
    pub kdf: String,
    pub kdfparams: KdfParams,
    pub mac: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

/// KDF parameters. The variant is told apart by its fields; the sibling
/// `kdf` name must agree with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KdfParams {
    Scrypt {
        dklen: u32,
        salt: String,
        n: u32,
        r: u32,
        p: u32,
    },
    Pbkdf2 {
        dklen: u32,
        salt: String,
        c: u32,
        prf: String,
    },
}

impl KdfParams {
    pub fn name(&self) -> &'static str {
        match self {
            KdfParams::Scrypt { .. } => "scrypt",
            KdfParams::Pbkdf2 { .. } => "pbkdf2",
        }
    }
}

/// Key derivation function selection for [`KeystoreOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    Scrypt { n: u32, r: u32, p: u32 },
    Pbkdf2 { c: u32 },
}

impl Kdf {
    pub const DEFAULT_SCRYPT_N: u32 = 8192;
    pub const DEFAULT_PBKDF2_C: u32 = 262_144;

    /// scrypt with the given cost and `r = 8, p = 1`.
    pub fn scrypt(n: u32) -> Self {
        Kdf::Scrypt { n, r: 8, p: 1 }
    }

    pub fn pbkdf2(c: u32) -> Self {
        Kdf::Pbkdf2 { c }
    }
}

impl Default for Kdf {
    fn default() -> Self {
        Kdf::scrypt(Self::DEFAULT_SCRYPT_N)
    }
}

/// Options for [`encrypt`](super::encrypt).
///
/// `salt`, `iv` and `id` are random unless pinned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreOptions {
    pub kdf: Kdf,
    pub dklen: u32,
    pub salt: Option<Vec<u8>>,
    pub iv: Option<[u8; 16]>,
    pub id: Option<Uuid>,
}

impl KeystoreOptions {
    pub fn with_kdf(kdf: Kdf) -> Self {
        Self {
            kdf,
            ..Self::default()
        }
    }
}

impl Default for KeystoreOptions {
    fn default() -> Self {
        Self {
            kdf: Kdf::default(),
            dklen: 32,
            salt: None,
            iv: None,
            id: None,
        }
    }
}
