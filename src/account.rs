//! Externally-owned accounts: an address and the private key that controls it.

use std::fmt;

use zeroize::Zeroize;

use crate::crypto::{
    self, address_of, parse_secret_key, random_secret_key, secret_key_from_entropy, Address,
    RecoverableSignature, Signature,
};
use crate::error::{AccountsError, Result};
use crate::keystore::{self, KeystoreOptions, KeystoreV3};
use crate::message::{self, SignedMessage};
use crate::transaction::{self, SignedTransaction, Transaction};

/// An address together with its 32-byte private key.
///
/// The address is always derived from the key, never supplied separately.
/// Key bytes are zeroed when the value is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    address: Address,
    private_key: [u8; 32],
}

impl Account {
    /// Creates a new account.
    ///
    /// With `entropy` the key is derived deterministically from it; without,
    /// a fresh key is drawn from the OS RNG.
    pub fn generate(entropy: Option<&[u8]>) -> Self {
        let secret_key = match entropy {
            Some(entropy) => secret_key_from_entropy(entropy),
            None => random_secret_key(),
        };
        Self {
            address: address_of(&secret_key),
            private_key: secret_key.secret_bytes(),
        }
    }

    /// Imports a hex private key (64 hex digits, 0x prefix optional).
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let digits = crypto::strip_hex_prefix(private_key.trim());
        if digits.len() != 64 {
            return Err(AccountsError::InvalidKey(format!(
                "expected 64 hex digits, got {}",
                digits.len()
            )));
        }
        let mut bytes = hex::decode(digits)
            .map_err(|e| AccountsError::InvalidKey(e.to_string()))?;
        let account = Self::from_private_key_bytes(&bytes);
        bytes.zeroize();
        account
    }

    /// Imports a raw 32-byte private key.
    pub fn from_private_key_bytes(private_key: &[u8]) -> Result<Self> {
        let secret_key = parse_secret_key(private_key)?;
        Ok(Self {
            address: address_of(&secret_key),
            private_key: secret_key.secret_bytes(),
        })
    }

    /// Decrypts a V3 keystore.
    ///
    /// Unless `non_strict` is set, the address derived from the decrypted
    /// key must equal the address the keystore declares.
    pub fn from_keystore(keystore: &KeystoreV3, password: &str, non_strict: bool) -> Result<Self> {
        let private_key = keystore::decrypt(keystore, password)?;
        let account = Self::from_private_key_bytes(&private_key[..])?;

        if !non_strict && !account.address.matches_str(&keystore.address) {
            return Err(AccountsError::AddressMismatch {
                expected: keystore.address.clone(),
                actual: account.address.to_hex(),
            });
        }
        Ok(account)
    }

    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// Returns the private key as 0x-prefixed hex.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.private_key))
    }

    /// Signs a 32-byte digest; `v` follows the message convention (27/28).
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<Signature> {
        Ok(self.sign_hash_recoverable(hash)?.into_message_signature())
    }

    pub(crate) fn sign_hash_recoverable(&self, hash: &[u8; 32]) -> Result<RecoverableSignature> {
        let secret_key = parse_secret_key(&self.private_key)
            .map_err(|e| AccountsError::Signing(e.to_string()))?;
        Ok(crypto::sign_hash(&secret_key, hash))
    }

    /// Signs `data` as a personal message (hex or UTF-8 text).
    pub fn sign(&self, data: &str) -> Result<SignedMessage> {
        message::sign(data, self)
    }

    /// Signs a transaction whose nonce, gas price, gas and chain id are all set.
    pub fn sign_transaction(&self, tx: &Transaction) -> Result<SignedTransaction> {
        transaction::sign_transaction(tx, self)
    }

    /// Encrypts this account into a V3 keystore.
    pub fn to_keystore(&self, password: &str, options: &KeystoreOptions) -> Result<KeystoreV3> {
        keystore::encrypt(&self.private_key, &self.address, password, options)
    }
}

impl Drop for Account {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
