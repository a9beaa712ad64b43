//! An indexed collection of accounts with encrypted persistence.
//!
//! Accounts live in an arena of optional slots. Indices are handed out in
//! increasing order and never reused, so removing one account leaves every
//! other index valid. A side map finds an account's slot by address.

mod storage;

pub use storage::{FileStore, KeyValueStore, MemoryStore};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::account::Account;
use crate::crypto::Address;
use crate::error::{AccountsError, Result};
use crate::keystore::{KeystoreOptions, KeystoreV3};

/// Storage key used when none is given.
pub const DEFAULT_WALLET_KEY: &str = "web3js_wallet";

/// Seed for the `index`-th key drawn from `entropy`: `entropy ‖ index`
/// with the index as a big-endian u64. The fixed-width suffix keeps
/// `("e", 1)` and `("e1", 0)` apart.
pub fn indexed_seed(entropy: &[u8], index: usize) -> Vec<u8> {
    let mut seed = Vec::with_capacity(entropy.len() + 8);
    seed.extend_from_slice(entropy);
    seed.extend_from_slice(&(index as u64).to_be_bytes());
    seed
}

/// What can be added to a wallet.
#[derive(Debug, Clone)]
pub enum AccountSource {
    PrivateKey(String),
    Account(Account),
}

impl From<Account> for AccountSource {
    fn from(account: Account) -> Self {
        AccountSource::Account(account)
    }
}

impl From<&str> for AccountSource {
    fn from(private_key: &str) -> Self {
        AccountSource::PrivateKey(private_key.to_string())
    }
}

/// How an account in the wallet is referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressOrIndex {
    Address(Address),
    Index(usize),
}

impl From<Address> for AddressOrIndex {
    fn from(address: Address) -> Self {
        AddressOrIndex::Address(address)
    }
}

impl From<usize> for AddressOrIndex {
    fn from(index: usize) -> Self {
        AddressOrIndex::Index(index)
    }
}

pub struct Wallet {
    slots: Vec<Option<Account>>,
    by_address: HashMap<Address, usize>,
    storage: Option<Arc<dyn KeyValueStore>>,
    default_key_name: String,
    keystore_options: KeystoreOptions,
}

impl Wallet {
    /// An empty wallet without storage.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_address: HashMap::new(),
            storage: None,
            default_key_name: DEFAULT_WALLET_KEY.to_string(),
            keystore_options: KeystoreOptions::default(),
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_default_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.default_key_name = key_name.into();
        self
    }

    /// Options used by [`Wallet::save`].
    pub fn with_keystore_options(mut self, options: KeystoreOptions) -> Self {
        self.keystore_options = options;
        self
    }

    pub fn set_storage(&mut self, storage: Option<Arc<dyn KeyValueStore>>) {
        self.storage = storage;
    }

    pub fn default_key_name(&self) -> &str {
        &self.default_key_name
    }

    /// Appends `count` new accounts and returns their indices.
    ///
    /// With `entropy`, the account at index `i` is derived from
    /// `entropy ‖ i` (big-endian u64), so each slot gets a distinct key.
    pub fn create(&mut self, count: usize, entropy: Option<&[u8]>) -> Vec<usize> {
        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            let index = self.slots.len();
            let account = match entropy {
                Some(entropy) => Account::generate(Some(&indexed_seed(entropy, index))),
                None => Account::generate(None),
            };
            // Entropy-derived keys can collide with imported ones.
            if !self.by_address.contains_key(account.address()) {
                indices.push(self.insert(account));
            }
        }
        debug!("created {} wallet accounts", indices.len());
        indices
    }

    /// Adds an account, or returns the one already held for its address.
    pub fn add(&mut self, source: impl Into<AccountSource>) -> Result<&Account> {
        let account = match source.into() {
            AccountSource::PrivateKey(key) => Account::from_private_key(&key)?,
            AccountSource::Account(account) => account,
        };
        let index = match self.by_address.get(account.address()) {
            Some(&index) => index,
            None => self.insert(account),
        };
        self.slots[index]
            .as_ref()
            .ok_or_else(|| AccountsError::Storage(format!("wallet slot {} is empty", index)))
    }

    fn insert(&mut self, account: Account) -> usize {
        let index = self.slots.len();
        self.by_address.insert(*account.address(), index);
        self.slots.push(Some(account));
        index
    }

    /// Clears the slot of an account. Returns whether one was removed.
    pub fn remove(&mut self, target: impl Into<AddressOrIndex>) -> bool {
        let index = match target.into() {
            AddressOrIndex::Address(address) => match self.by_address.get(&address) {
                Some(&index) => index,
                None => return false,
            },
            AddressOrIndex::Index(index) => index,
        };
        match self.slots.get_mut(index).and_then(Option::take) {
            Some(account) => {
                self.by_address.remove(account.address());
                true
            }
            None => false,
        }
    }

    /// Removes every account. Index assignment restarts from zero.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.by_address.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Account> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_by_address(&self, address: &Address) -> Option<&Account> {
        self.by_address.get(address).and_then(|&i| self.get(i))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    /// Index the next created account will receive.
    pub fn next_index(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Account)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|account| (i, account)))
    }

    /// Encrypts every account, in index order.
    pub fn encrypt(&self, password: &str, options: &KeystoreOptions) -> Result<Vec<KeystoreV3>> {
        let accounts: Vec<&Account> = self.iter().map(|(_, account)| account).collect();
        accounts
            .par_iter()
            .map(|account| account.to_keystore(password, options))
            .collect()
    }

    /// Decrypts and adds every keystore. Fails without adding anything if
    /// any entry fails. Returns the number of accounts that were new.
    pub fn decrypt(&mut self, keystores: &[KeystoreV3], password: &str) -> Result<usize> {
        let accounts = keystores
            .par_iter()
            .map(|keystore| Account::from_keystore(keystore, password, false))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.add_all(accounts))
    }

    fn add_all(&mut self, accounts: Vec<Account>) -> usize {
        let before = self.len();
        for account in accounts {
            if !self.by_address.contains_key(account.address()) {
                self.insert(account);
            }
        }
        self.len() - before
    }

    /// Encrypts the wallet and stores it as a JSON array under `key_name`.
    ///
    /// Returns `Ok(false)` when no storage is attached.
    pub fn save(&self, password: &str, key_name: Option<&str>) -> Result<bool> {
        let storage = match &self.storage {
            Some(storage) => storage,
            None => {
                debug!("wallet has no storage attached, not saving");
                return Ok(false);
            }
        };
        let key_name = key_name.unwrap_or(&self.default_key_name);
        let keystores = self.encrypt(password, &self.keystore_options)?;
        storage.set_item(key_name, &serde_json::to_string(&keystores)?)?;
        info!("saved {} wallet accounts under '{}'", keystores.len(), key_name);
        Ok(true)
    }

    /// Restores accounts stored under `key_name`.
    ///
    /// A missing key loads nothing. Entries that fail to parse or decrypt
    /// are skipped and logged.
    pub fn load(&mut self, password: &str, key_name: Option<&str>) -> Result<&mut Self> {
        let storage = match &self.storage {
            Some(storage) => Arc::clone(storage),
            None => {
                debug!("wallet has no storage attached, nothing to load");
                return Ok(self);
            }
        };
        let key_name = key_name.unwrap_or(&self.default_key_name).to_string();
        let document = match storage.get_item(&key_name)? {
            Some(document) => document,
            None => {
                debug!("no wallet stored under '{}'", key_name);
                return Ok(self);
            }
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(&document)?;
        let results: Vec<Result<Account>> = entries
            .into_par_iter()
            .map(|entry| -> Result<Account> {
                let keystore: KeystoreV3 = serde_json::from_value(entry)?;
                Account::from_keystore(&keystore, password, false)
            })
            .collect();

        let mut accounts = Vec::with_capacity(results.len());
        for (position, result) in results.into_iter().enumerate() {
            match result {
                Ok(account) => accounts.push(account),
                Err(e) => warn!("skipping wallet entry {} under '{}': {}", position, key_name, e),
            }
        }
        let added = self.add_all(accounts);
        info!("loaded {} wallet accounts from '{}'", added, key_name);
        Ok(self)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("accounts", &self.iter().map(|(i, a)| (i, *a.address())).collect::<Vec<_>>())
            .field("has_storage", &self.storage.is_some())
            .field("default_key_name", &self.default_key_name)
            .finish()
    }
}
