//! AES-128-CTR, the only cipher V3 keystores use.

use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::error::{AccountsError, Result};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Name stored in the keystore `cipher` field.
pub const CIPHER_NAME: &str = "aes-128-ctr";

/// Applies the AES-128-CTR keystream. Encryption and decryption are the
/// same operation.
pub fn aes_128_ctr(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut cipher = Aes128Ctr::new_from_slices(key, iv).map_err(|_| {
        AccountsError::UnsupportedKeystore(format!(
            "aes-128-ctr needs a 16-byte key and iv, got {} and {}",
            key.len(),
            iv.len()
        ))
    })?;
    let mut buf = data.to_vec();
    cipher.apply_keystream(&mut buf);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nist_sp800_38a_ctr_vector() {
        // F.5.1 CTR-AES128.Encrypt, first block.
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let iv = hex::decode("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff").unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let ciphertext = aes_128_ctr(&key, &iv, &plaintext).unwrap();
        assert_eq!(hex::encode(&ciphertext), "874d6191b620e3261bef6864990db6ce");
        assert_eq!(aes_128_ctr(&key, &iv, &ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn test_rejects_bad_iv() {
        assert!(aes_128_ctr(&[0u8; 16], &[0u8; 12], b"data").is_err());
    }
}
