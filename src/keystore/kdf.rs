//! Password-based key derivation for V3 keystores.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{AccountsError, Result};

/// Longest derived key a keystore may ask for.
pub const MAX_DKLEN: usize = 64;

/// Upper bound on scrypt working memory, `128 * r * n` bytes.
pub const MAX_SCRYPT_MEMORY: u64 = 1 << 30;

/// Upper bound on PBKDF2 rounds.
pub const MAX_PBKDF2_ROUNDS: u32 = 10_000_000;

fn check_dklen(dklen: usize) -> Result<()> {
    if dklen == 0 || dklen > MAX_DKLEN {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "dklen {} is outside 1..={}",
            dklen, MAX_DKLEN
        )));
    }
    Ok(())
}

/// Derives `dklen` bytes with scrypt. `n` must be a power of two.
///
/// Parameters whose working memory would exceed [`MAX_SCRYPT_MEMORY`] are
/// rejected before anything is allocated.
pub fn scrypt_derive_key(
    password: &[u8],
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
    dklen: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    if n < 2 || !n.is_power_of_two() {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "scrypt n must be a power of two, got {}",
            n
        )));
    }
    if r == 0 || p == 0 {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "scrypt r and p must be positive, got r={} p={}",
            r, p
        )));
    }
    let block = 128 * r as u64;
    if block.saturating_mul(n as u64) > MAX_SCRYPT_MEMORY
        || block.saturating_mul(p as u64) > MAX_SCRYPT_MEMORY
    {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "scrypt n={} r={} p={} exceeds {} bytes of memory",
            n, r, p, MAX_SCRYPT_MEMORY
        )));
    }
    check_dklen(dklen)?;
    let log_n = n.trailing_zeros() as u8;
    let params = scrypt::Params::new(log_n, r, p, dklen)
        .map_err(|e| AccountsError::UnsupportedKeystore(format!("scrypt params: {}", e)))?;

    let mut key = Zeroizing::new(vec![0u8; dklen]);
    scrypt::scrypt(password, salt, &params, &mut key)
        .map_err(|e| AccountsError::UnsupportedKeystore(format!("scrypt output: {}", e)))?;
    Ok(key)
}

/// Derives `dklen` bytes with PBKDF2-HMAC-SHA256 over `c` rounds.
pub fn pbkdf2_derive_key(password: &[u8], salt: &[u8], c: u32, dklen: usize) -> Result<Zeroizing<Vec<u8>>> {
    if c == 0 || c > MAX_PBKDF2_ROUNDS {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "pbkdf2 iteration count {} is outside 1..={}",
            c, MAX_PBKDF2_ROUNDS
        )));
    }
    check_dklen(dklen)?;
    let mut key = Zeroizing::new(vec![0u8; dklen]);
    pbkdf2::<Hmac<Sha256>>(password, salt, c, &mut key);
    Ok(key)
}
