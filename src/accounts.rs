//! The public entry point.
//!
//! [`Accounts`] ties the primitives to a chain [`Provider`]: transactions
//! with missing nonce, gas price or chain id are completed from the provider
//! before signing. Each instance carries its own provider, signer, wallet and
//! configuration, so several can coexist in one process.

use std::sync::Arc;

use tracing::debug;

use crate::account::Account;
use crate::config::AccountsConfig;
use crate::crypto::{decode_hex, Address};
use crate::error::{AccountsError, Result};
use crate::keystore::{KeystoreOptions, KeystoreV3};
use crate::message::{self, RecoverInput, SignedMessage};
use crate::provider::Provider;
use crate::transaction::{self, LocalSigner, SignedTransaction, Transaction, TransactionSigner};
use crate::wallet::{KeyValueStore, Wallet};

pub struct Accounts {
    provider: Arc<dyn Provider>,
    signer: Option<Arc<dyn TransactionSigner>>,
    config: AccountsConfig,
    wallet: Wallet,
}

impl Accounts {
    pub fn new(provider: Arc<dyn Provider>, config: AccountsConfig) -> Self {
        let wallet = Wallet::new()
            .with_default_key_name(config.default_key_name.clone())
            .with_keystore_options(config.keystore.clone());
        Self {
            provider,
            signer: None,
            config,
            wallet,
        }
    }

    /// Installs the signer used by [`Accounts::sign_with_signer`].
    pub fn with_signer(mut self, signer: Arc<dyn TransactionSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Attaches storage for wallet save/load.
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.wallet.set_storage(Some(storage));
        self
    }

    pub fn config(&self) -> &AccountsConfig {
        &self.config
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut Wallet {
        &mut self.wallet
    }

    /// Creates a random account, or a deterministic one from `entropy`.
    pub fn create(&self, entropy: Option<&[u8]>) -> Account {
        Account::generate(entropy)
    }

    pub fn private_key_to_account(&self, private_key: &str) -> Result<Account> {
        Account::from_private_key(private_key)
    }

    /// Fills in nonce, gas price and chain id when absent or zero.
    ///
    /// The nonce is fetched for `tx.from`, falling back to `default_from`.
    /// Only the needed queries are issued and they run concurrently.
    pub async fn complete_transaction(
        &self,
        tx: &Transaction,
        default_from: Option<Address>,
    ) -> Result<Transaction> {
        if tx.gas.is_none() {
            return Err(AccountsError::MissingField("gas"));
        }

        let need_chain_id = Transaction::is_unset(tx.chain_id);
        let need_gas_price = Transaction::is_unset(tx.gas_price);
        let need_nonce = Transaction::is_unset(tx.nonce);

        let from = tx.from.or(default_from);
        let nonce_sender = match (need_nonce, from) {
            (true, None) => return Err(AccountsError::MissingSender),
            (true, Some(from)) => Some(from),
            (false, _) => None,
        };

        let provider = &self.provider;
        let (chain_id, gas_price, nonce) = tokio::try_join!(
            async {
                if need_chain_id {
                    debug!("fetching chain id");
                    provider.get_chain_id().await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if need_gas_price {
                    debug!("fetching gas price");
                    provider.get_gas_price().await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                match nonce_sender {
                    Some(sender) => {
                        debug!("fetching nonce of {}", sender);
                        provider.get_transaction_count(&sender).await.map(Some)
                    }
                    None => Ok(None),
                }
            },
        )?;

        Ok(Transaction {
            from,
            chain_id: chain_id.or(tx.chain_id),
            gas_price: gas_price.or(tx.gas_price),
            nonce: nonce.or(tx.nonce),
            ..tx.clone()
        })
    }

    /// Completes `tx` from the provider and signs it with `private_key`.
    pub async fn sign_transaction(
        &self,
        tx: &Transaction,
        private_key: &str,
    ) -> Result<SignedTransaction> {
        let signer = LocalSigner::new(Account::from_private_key(private_key)?);
        self.sign_transaction_with(tx, &signer).await
    }

    /// Completes `tx` from the provider and signs it with `signer`.
    pub async fn sign_transaction_with(
        &self,
        tx: &Transaction,
        signer: &dyn TransactionSigner,
    ) -> Result<SignedTransaction> {
        let complete = self.complete_transaction(tx, Some(signer.address())).await?;
        signer.sign_transaction(&complete).await
    }

    /// Signs with the signer installed by [`Accounts::with_signer`].
    pub async fn sign_with_signer(&self, tx: &Transaction) -> Result<SignedTransaction> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| AccountsError::Signing("no transaction signer configured".into()))?;
        self.sign_transaction_with(tx, signer.as_ref()).await
    }

    /// Like [`Accounts::sign_transaction`], and also reports the outcome to
    /// `callback` exactly once.
    pub async fn sign_transaction_with_callback<F>(
        &self,
        tx: &Transaction,
        private_key: &str,
        callback: F,
    ) -> Result<SignedTransaction>
    where
        F: FnOnce(std::result::Result<&SignedTransaction, &AccountsError>),
    {
        let result = self.sign_transaction(tx, private_key).await;
        callback(result.as_ref());
        result
    }

    /// Recovers the sender of a hex-encoded raw transaction.
    pub fn recover_transaction(&self, raw_transaction: &str) -> Result<Address> {
        let raw = decode_hex(raw_transaction)
            .map_err(|e| AccountsError::MalformedTransaction(e.to_string()))?;
        transaction::recover_transaction(&raw)
    }

    /// Personal-message digest of `data` (strict hex is decoded first).
    pub fn hash_message(&self, data: &str) -> [u8; 32] {
        message::hash_message(&message::to_message_bytes(data))
    }

    pub fn sign(&self, data: &str, private_key: &str) -> Result<SignedMessage> {
        message::sign(data, &Account::from_private_key(private_key)?)
    }

    pub fn recover(&self, input: &RecoverInput) -> Result<Address> {
        message::recover(input)
    }

    /// Encrypts a private key. `options` defaults to the configured ones.
    pub fn encrypt(
        &self,
        private_key: &str,
        password: &str,
        options: Option<&KeystoreOptions>,
    ) -> Result<KeystoreV3> {
        let account = Account::from_private_key(private_key)?;
        account.to_keystore(password, options.unwrap_or(&self.config.keystore))
    }

    pub fn decrypt(&self, keystore: &KeystoreV3, password: &str, non_strict: bool) -> Result<Account> {
        Account::from_keystore(keystore, password, non_strict)
    }
}
