//! Web3 Secret Storage (V3) keystores.
//!
//! A password is stretched with scrypt or PBKDF2 into a derived key `dk`.
//! The private key is encrypted with AES-128-CTR under `dk[0..16]`, and
//! `keccak256(dk[16..32] ‖ ciphertext)` is stored as the MAC. Decryption
//! verifies the MAC before the ciphertext is touched.

mod cipher;
mod kdf;
mod types;

pub use cipher::{aes_128_ctr, CIPHER_NAME};
pub use kdf::{pbkdf2_derive_key, scrypt_derive_key, MAX_DKLEN};
pub use types::{
    CipherParams, CryptoSection, Kdf, KdfParams, KeystoreOptions, KeystoreV3, KEYSTORE_VERSION,
};

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::{keccak256_concat, Address};
use crate::error::{AccountsError, Result};

const PBKDF2_PRF: &str = "hmac-sha256";

/// Encrypts `private_key` under `password`.
pub fn encrypt(
    private_key: &[u8; 32],
    address: &Address,
    password: &str,
    options: &KeystoreOptions,
) -> Result<KeystoreV3> {
    let salt = match &options.salt {
        Some(salt) => salt.clone(),
        None => random_bytes::<32>().to_vec(),
    };
    let iv = options.iv.unwrap_or_else(random_bytes::<16>);

    let kdfparams = match options.kdf {
        Kdf::Scrypt { n, r, p } => KdfParams::Scrypt {
            dklen: options.dklen,
            salt: hex::encode(&salt),
            n,
            r,
            p,
        },
        Kdf::Pbkdf2 { c } => KdfParams::Pbkdf2 {
            dklen: options.dklen,
            salt: hex::encode(&salt),
            c,
            prf: PBKDF2_PRF.to_string(),
        },
    };

    debug!(kdf = kdfparams.name(), address = %address, "encrypting keystore");
    let derived_key = derive_key(password, &kdfparams)?;
    let ciphertext = aes_128_ctr(&derived_key[..16], &iv, private_key)?;
    let mac = keccak256_concat(&[&derived_key[16..32], &ciphertext[..]]);

    Ok(KeystoreV3 {
        version: KEYSTORE_VERSION,
        id: options.id.unwrap_or_else(Uuid::new_v4).to_string(),
        address: address.to_hex(),
        crypto: CryptoSection {
            ciphertext: hex::encode(&ciphertext),
            cipherparams: CipherParams { iv: hex::encode(iv) },
            cipher: CIPHER_NAME.to_string(),
            kdf: kdfparams.name().to_string(),
            kdfparams,
            mac: hex::encode(mac),
        },
    })
}

/// Decrypts the private key held in `keystore`.
///
/// Fails with [`AccountsError::KeystoreIntegrity`] when the MAC does not
/// match; nothing is decrypted in that case.
pub fn decrypt(keystore: &KeystoreV3, password: &str) -> Result<Zeroizing<Vec<u8>>> {
    if keystore.version != KEYSTORE_VERSION {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "version {}",
            keystore.version
        )));
    }
    let crypto = &keystore.crypto;
    if !crypto.cipher.eq_ignore_ascii_case(CIPHER_NAME) {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "cipher {}",
            crypto.cipher
        )));
    }
    if !crypto.kdf.eq_ignore_ascii_case(crypto.kdfparams.name()) {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "kdf {} with {} parameters",
            crypto.kdf,
            crypto.kdfparams.name()
        )));
    }

    let derived_key = derive_key(password, &crypto.kdfparams)?;
    let ciphertext = hex::decode(&crypto.ciphertext)?;
    let expected_mac = hex::decode(&crypto.mac)?;
    let mac = keccak256_concat(&[&derived_key[16..32], &ciphertext[..]]);
    if !constant_time_eq(&mac, &expected_mac) {
        return Err(AccountsError::KeystoreIntegrity);
    }

    let iv = hex::decode(&crypto.cipherparams.iv)?;
    let plaintext = aes_128_ctr(&derived_key[..16], &iv, &ciphertext)?;
    Ok(Zeroizing::new(plaintext))
}

fn derive_key(password: &str, params: &KdfParams) -> Result<Zeroizing<Vec<u8>>> {
    match params {
        KdfParams::Scrypt {
            dklen,
            salt,
            n,
            r,
            p,
        } => {
            let dklen = checked_dklen(*dklen)?;
            scrypt_derive_key(password.as_bytes(), &hex::decode(salt)?, *n, *r, *p, dklen)
        }
        KdfParams::Pbkdf2 { dklen, salt, c, prf } => {
            if prf != PBKDF2_PRF {
                return Err(AccountsError::UnsupportedKeystore(format!("prf {}", prf)));
            }
            let dklen = checked_dklen(*dklen)?;
            pbkdf2_derive_key(password.as_bytes(), &hex::decode(salt)?, *c, dklen)
        }
    }
}

/// The cipher key and MAC key together need 32 bytes.
fn checked_dklen(dklen: u32) -> Result<usize> {
    let dklen = dklen as usize;
    if !(32..=MAX_DKLEN).contains(&dklen) {
        return Err(AccountsError::UnsupportedKeystore(format!(
            "dklen {} is outside 32..={}",
            dklen, MAX_DKLEN
        )));
    }
    Ok(dklen)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;

    fn cheap_options() -> KeystoreOptions {
        KeystoreOptions::with_kdf(Kdf::scrypt(1024))
    }

    #[test]
    fn test_round_trip_scrypt() {
        let account = Account::generate(None);
        let keystore = account.to_keystore("hunter2", &cheap_options()).unwrap();
        assert_eq!(keystore.version, 3);
        assert_eq!(keystore.crypto.kdf, "scrypt");
        assert_eq!(keystore.crypto.cipher, "aes-128-ctr");
        assert_eq!(keystore.address, account.address().to_hex());

        let restored = Account::from_keystore(&keystore, "hunter2", false).unwrap();
        assert_eq!(restored, account);
    }

    #[test]
    fn test_round_trip_pbkdf2() {
        let account = Account::generate(None);
        let options = KeystoreOptions::with_kdf(Kdf::pbkdf2(1000));
        let keystore = account.to_keystore("hunter2", &options).unwrap();
        assert!(matches!(keystore.crypto.kdfparams, KdfParams::Pbkdf2 { c: 1000, .. }));

        let json = keystore.to_json().unwrap();
        let parsed = KeystoreV3::from_json(&json).unwrap();
        assert_eq!(parsed, keystore);
        assert_eq!(
            Account::from_keystore(&parsed, "hunter2", false).unwrap(),
            account
        );
    }

    #[test]
    fn test_wrong_password() {
        let account = Account::generate(None);
        let keystore = account.to_keystore("right", &cheap_options()).unwrap();
        assert!(matches!(
            Account::from_keystore(&keystore, "wrong", false),
            Err(AccountsError::KeystoreIntegrity)
        ));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let account = Account::generate(None);
        let mut keystore = account.to_keystore("pw", &cheap_options()).unwrap();
        let mut ciphertext = hex::decode(&keystore.crypto.ciphertext).unwrap();
        ciphertext[0] ^= 0x01;
        keystore.crypto.ciphertext = hex::encode(ciphertext);
        assert!(matches!(
            decrypt(&keystore, "pw"),
            Err(AccountsError::KeystoreIntegrity)
        ));
    }

    #[test]
    fn test_address_mismatch() {
        let account = Account::generate(None);
        let mut keystore = account.to_keystore("pw", &cheap_options()).unwrap();
        keystore.address = "0000000000000000000000000000000000000000".into();
        assert!(matches!(
            Account::from_keystore(&keystore, "pw", false),
            Err(AccountsError::AddressMismatch { .. })
        ));
        assert_eq!(
            Account::from_keystore(&keystore, "pw", true).unwrap(),
            account
        );
    }

    #[test]
    fn test_address_check_ignores_case_and_prefix() {
        let account = Account::generate(None);
        let mut keystore = account.to_keystore("pw", &cheap_options()).unwrap();
        keystore.address = account.address().to_checksum();
        assert!(Account::from_keystore(&keystore, "pw", false).is_ok());
    }

    #[test]
    fn test_unsupported_documents() {
        let account = Account::generate(None);
        let keystore = account.to_keystore("pw", &cheap_options()).unwrap();

        let mut wrong_version = keystore.clone();
        wrong_version.version = 1;
        let mut wrong_cipher = keystore.clone();
        wrong_cipher.crypto.cipher = "aes-256-gcm".into();
        let mut wrong_kdf = keystore.clone();
        wrong_kdf.crypto.kdf = "pbkdf2".into();

        for ks in [wrong_version, wrong_cipher, wrong_kdf] {
            assert!(matches!(
                decrypt(&ks, "pw"),
                Err(AccountsError::UnsupportedKeystore(_))
            ));
        }
    }

    #[test]
    fn test_rejects_oversized_kdf_params() {
        let account = Account::generate(None);
        let keystore = account.to_keystore("pw", &cheap_options()).unwrap();

        let mut huge_n = keystore.clone();
        if let KdfParams::Scrypt { n, .. } = &mut huge_n.crypto.kdfparams {
            *n = 1 << 31;
        }
        let mut huge_dklen = keystore.clone();
        if let KdfParams::Scrypt { dklen, .. } = &mut huge_dklen.crypto.kdfparams {
            *dklen = u32::MAX;
        }
        let mut short_dklen = keystore.clone();
        if let KdfParams::Scrypt { dklen, .. } = &mut short_dklen.crypto.kdfparams {
            *dklen = 16;
        }

        for ks in [huge_n, huge_dklen, short_dklen] {
            assert!(matches!(
                Account::from_keystore(&ks, "pw", false),
                Err(AccountsError::UnsupportedKeystore(_))
            ));
        }
    }

    #[test]
    fn test_pinned_options_are_deterministic() {
        let account = Account::generate(None);
        let options = KeystoreOptions {
            salt: Some(vec![7u8; 32]),
            iv: Some([9u8; 16]),
            id: Some(Uuid::nil()),
            ..cheap_options()
        };
        let a = account.to_keystore("pw", &options).unwrap();
        let b = account.to_keystore("pw", &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id, "00000000-0000-0000-0000-000000000000");
        assert_eq!(a.crypto.cipherparams.iv, "09".repeat(16));
    }

    #[test]
    fn test_secret_storage_pbkdf2_vector() {
        // Test vector from the Web3 Secret Storage definition.
        let json = r#"{
            "crypto": {
                "cipher": "aes-128-ctr",
                "cipherparams": { "iv": "6087dab2f9fdbbfaddc31a909735c1e6" },
                "ciphertext": "5318b4d5bcd28de64ee5559e671353e16f075ecae9f99c7a79a38af5f869aa46",
                "kdf": "pbkdf2",
                "kdfparams": {
                    "c": 262144,
                    "dklen": 32,
                    "prf": "hmac-sha256",
                    "salt": "ae3cd4e7013836a3df6bd7241b12db061dbe2c6785853cce422d148a624ce0bd"
                },
                "mac": "517ead924a9d0dc3124507e3393d175ce3ff7c1e96529c6c555ce9e51205e9b2"
            },
            "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
            "version": 3,
            "address": "008aeeda4d805471df9b2a5b0f38a0c3bcba786b"
        }"#;
        let keystore = KeystoreV3::from_json(json).unwrap();
        let account = Account::from_keystore(&keystore, "testpassword", true).unwrap();
        assert_eq!(
            account.private_key_hex(),
            "0x7a28b5ba57c53603b0b07b56bba752f7784bf506fa95edc395f5cf6c7514fe9d"
        );
    }

    #[test]
    fn test_capitalized_crypto_key() {
        let account = Account::generate(None);
        let keystore = account.to_keystore("pw", &cheap_options()).unwrap();
        let json = keystore.to_json().unwrap().replace("\"crypto\"", "\"Crypto\"");
        let parsed = KeystoreV3::from_json(&json).unwrap();
        assert_eq!(parsed, keystore);
    }
}
