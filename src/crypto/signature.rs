//! ECDSA signature values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::decode_hex;
use crate::error::{AccountsError, Result};

/// Output of the signing primitive before any `v` convention is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 0 or 1.
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// `v = recovery_id + 27`, the plain message convention.
    pub fn into_message_signature(self) -> Signature {
        Signature::new(self.r, self.s, self.recovery_id as u64 + 27)
    }

    /// `v = recovery_id + chain_id * 2 + 35` (EIP-155).
    pub fn into_eip155_signature(self, chain_id: u64) -> Result<Signature> {
        let v = chain_id
            .checked_mul(2)
            .and_then(|v| v.checked_add(35 + self.recovery_id as u64))
            .ok_or_else(|| AccountsError::Signing(format!("chain id {} is too large", chain_id)))?;
        Ok(Signature::new(self.r, self.s, v))
    }
}

/// A `{r, s, v}` signature.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(with = "super::serde_hex::bytes32")]
    pub r: [u8; 32],
    #[serde(with = "super::serde_hex::bytes32")]
    pub s: [u8; 32],
    pub v: u64,
}

impl Signature {
    pub fn new(r: [u8; 32], s: [u8; 32], v: u64) -> Self {
        Self { r, s, v }
    }

    /// Assembles a signature from separately supplied components. `r` and
    /// `s` may be shorter than 32 bytes and are left-padded.
    pub fn from_components(v: u64, r: &[u8], s: &[u8]) -> Result<Self> {
        Ok(Self::new(pad32(r, "r")?, pad32(s, "s")?, v))
    }

    /// Parses hex `v`, `r`, `s` components (0x prefix optional).
    pub fn from_hex_components(v: &str, r: &str, s: &str) -> Result<Self> {
        let v_bytes = decode_hex(v)
            .map_err(|e| AccountsError::InvalidSignature(format!("v: {}", e)))?;
        if v_bytes.len() > 8 {
            return Err(AccountsError::InvalidSignature("v is too wide".into()));
        }
        let v = v_bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
        let r = decode_hex(r).map_err(|e| AccountsError::InvalidSignature(format!("r: {}", e)))?;
        let s = decode_hex(s).map_err(|e| AccountsError::InvalidSignature(format!("s: {}", e)))?;
        Self::from_components(v, &r, &s)
    }

    /// The 0/1 recovery id encoded in `v`.
    ///
    /// Accepts raw ids (0, 1), the message convention (27, 28) and EIP-155
    /// values (35 and above).
    pub fn recovery_id(&self) -> Result<u8> {
        match self.v {
            0 | 1 => Ok(self.v as u8),
            27 | 28 => Ok((self.v - 27) as u8),
            v if v >= 35 => Ok(((v - 35) % 2) as u8),
            v => Err(AccountsError::InvalidSignature(format!("invalid v value {}", v))),
        }
    }

    /// The chain id embedded in an EIP-155 `v`, if any.
    pub fn chain_id(&self) -> Option<u64> {
        if self.v >= 35 {
            Some((self.v - 35) / 2)
        } else {
            None
        }
    }

    /// `r ‖ s ‖ v`, with `v` in minimal big-endian form (65 bytes whenever
    /// `v` fits in one byte).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.s);
        let v_bytes = self.v.to_be_bytes();
        let first = v_bytes.iter().position(|b| *b != 0).unwrap_or(7);
        out.extend_from_slice(&v_bytes[first..]);
        out
    }

    /// 0x-prefixed hex of [`Signature::to_bytes`].
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl FromStr for Signature {
    type Err = AccountsError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_hex(s.trim())
            .map_err(|e| AccountsError::InvalidSignature(e.to_string()))?;
        if bytes.len() < 65 || bytes.len() > 72 {
            return Err(AccountsError::InvalidSignature(format!(
                "expected at least 65 bytes, got {}",
                bytes.len()
            )));
        }
        let v = bytes[64..].iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
        Self::from_components(v, &bytes[..32], &bytes[32..64])
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("r", &hex::encode(self.r))
            .field("s", &hex::encode(self.s))
            .field("v", &self.v)
            .finish()
    }
}

fn pad32(bytes: &[u8], name: &str) -> Result<[u8; 32]> {
    if bytes.len() > 32 {
        return Err(AccountsError::InvalidSignature(format!(
            "{} is {} bytes",
            name,
            bytes.len()
        )));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}
