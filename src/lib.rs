//! # eth_accounts
//!
//! Ethereum account management: keys, addresses, transaction and message
//! signing, encrypted keystores and wallets.
//!
//! ## Architecture
//!
//! - `rlp`: Recursive Length Prefix encoding
//! - `crypto`: Keccak-256, secp256k1 signing and recovery, addresses
//! - `account`: Address plus private key
//! - `transaction`: EIP-155 signing and sender recovery
//! - `message`: Personal message signing and recovery
//! - `keystore`: Web3 Secret Storage (V3) encryption
//! - `wallet`: Indexed account collection with persistence
//! - `provider`: Chain queries used to complete transactions
//! - `accounts`: The facade tying the above together
//! - `config`: Facade settings and the CLI configuration

pub mod account;
pub mod accounts;
pub mod config;
pub mod crypto;
pub mod error;
pub mod keystore;
pub mod message;
pub mod provider;
pub mod rlp;
pub mod transaction;
pub mod wallet;

pub use account::Account;
pub use accounts::Accounts;
pub use config::{AccountsConfig, Config};
pub use crypto::{Address, Signature};
pub use error::{AccountsError, Result};
pub use keystore::{Kdf, KeystoreOptions, KeystoreV3};
pub use message::{RecoverInput, SignedMessage};
pub use provider::{OfflineProvider, Provider};
pub use transaction::{LocalSigner, SignedTransaction, Transaction, TransactionSigner};
pub use wallet::{AddressOrIndex, FileStore, KeyValueStore, MemoryStore, Wallet};
