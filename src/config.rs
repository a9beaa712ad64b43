//! Configuration for the accounts facade and the command-line front end.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::keystore::{Kdf, KeystoreOptions};
use crate::wallet::DEFAULT_WALLET_KEY;

/// Settings carried by an [`Accounts`](crate::Accounts) instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountsConfig {
    /// Storage key used by wallet save/load when none is given.
    pub default_key_name: String,
    /// Options for keystores produced by `encrypt` and wallet `save`.
    pub keystore: KeystoreOptions,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            default_key_name: DEFAULT_WALLET_KEY.to_string(),
            keystore: KeystoreOptions::default(),
        }
    }
}

/// Key derivation function selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KdfKind {
    #[default]
    Scrypt,
    Pbkdf2,
}

impl FromStr for KdfKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scrypt" => Ok(KdfKind::Scrypt),
            "pbkdf2" | "pbkdf2-sha256" => Ok(KdfKind::Pbkdf2),
            _ => Err(format!("Unknown kdf: {}", s)),
        }
    }
}

impl fmt::Display for KdfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KdfKind::Scrypt => write!(f, "scrypt"),
            KdfKind::Pbkdf2 => write!(f, "pbkdf2"),
        }
    }
}

/// Ethereum account tool: keys, signatures, keystores and wallets
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Number of worker threads for keystore encryption (default: number of CPU cores)
    #[arg(short = 'w', long, global = true)]
    pub workers: Option<usize>,

    /// Keystore key derivation function: scrypt or pbkdf2
    #[arg(long, default_value = "scrypt", global = true)]
    pub kdf: KdfKind,

    /// scrypt cost parameter N (power of two)
    #[arg(long, default_value_t = Kdf::DEFAULT_SCRYPT_N, global = true)]
    pub scrypt_n: u32,

    /// PBKDF2 iteration count
    #[arg(long, default_value_t = Kdf::DEFAULT_PBKDF2_C, global = true)]
    pub pbkdf2_c: u32,

    /// Directory holding persisted wallets
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Storage key of the wallet
    #[arg(long, default_value = DEFAULT_WALLET_KEY, global = true)]
    pub key_name: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate new accounts
    Generate {
        /// Number of accounts
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
        /// Derive keys deterministically from this text
        #[arg(short = 'e', long)]
        entropy: Option<String>,
    },
    /// Sign a personal message
    SignMessage {
        #[arg(short = 'k', long)]
        private_key: String,
        /// UTF-8 text, or 0x-prefixed hex bytes
        message: String,
    },
    /// Recover the signer of a personal message
    RecoverMessage {
        message: String,
        /// 0x-prefixed r ‖ s ‖ v
        signature: String,
        /// The message is already the 32-byte prefixed hash
        #[arg(long, default_value = "false")]
        prefixed: bool,
    },
    /// Encrypt a private key into a V3 keystore
    Encrypt {
        #[arg(short = 'k', long)]
        private_key: String,
        #[arg(short = 'p', long)]
        password: String,
        /// Write the keystore here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Decrypt a V3 keystore file
    Decrypt {
        keystore: PathBuf,
        #[arg(short = 'p', long)]
        password: String,
        /// Skip the address check
        #[arg(long, default_value = "false")]
        non_strict: bool,
    },
    /// Sign a transaction offline (every field must be given)
    SignTx {
        #[arg(short = 'k', long)]
        private_key: String,
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        gas_price: u128,
        #[arg(long)]
        gas: u64,
        /// Recipient; omit to deploy a contract
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value = "0")]
        value: u128,
        /// 0x-prefixed call data
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        chain_id: u64,
    },
    /// Recover the sender of a raw signed transaction
    RecoverTx {
        /// 0x-prefixed raw transaction
        raw: String,
    },
    /// Add accounts to the stored wallet
    WalletCreate {
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
        #[arg(short = 'p', long)]
        password: String,
    },
    /// List the addresses in the stored wallet
    WalletList {
        #[arg(short = 'p', long)]
        password: String,
    },
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers);
        }

        match self.kdf {
            KdfKind::Scrypt if self.scrypt_n < 2 || !self.scrypt_n.is_power_of_two() => {
                return Err(ConfigError::InvalidKdf(format!(
                    "scrypt N must be a power of two greater than 1, got {}",
                    self.scrypt_n
                )));
            }
            KdfKind::Pbkdf2 if self.pbkdf2_c == 0 => {
                return Err(ConfigError::InvalidKdf(
                    "PBKDF2 iteration count cannot be zero".into(),
                ));
            }
            _ => {}
        }

        if self.key_name.is_empty() {
            return Err(ConfigError::InvalidKeyName("Key name cannot be empty".into()));
        }

        let needs_store = matches!(
            self.command,
            Command::WalletCreate { .. } | Command::WalletList { .. }
        );
        if needs_store && self.store_dir.is_none() {
            return Err(ConfigError::MissingStoreDir);
        }

        Ok(())
    }

    /// Keystore options selected by `--kdf` and its cost flag.
    pub fn keystore_options(&self) -> KeystoreOptions {
        let kdf = match self.kdf {
            KdfKind::Scrypt => Kdf::scrypt(self.scrypt_n),
            KdfKind::Pbkdf2 => Kdf::pbkdf2(self.pbkdf2_c),
        };
        KeystoreOptions::with_kdf(kdf)
    }

    pub fn accounts_config(&self) -> AccountsConfig {
        AccountsConfig {
            default_key_name: self.key_name.clone(),
            keystore: self.keystore_options(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Worker count must be at least 1")]
    InvalidWorkers,

    #[error("Invalid kdf parameters: {0}")]
    InvalidKdf(String),

    #[error("Invalid key name: {0}")]
    InvalidKeyName(String),

    #[error("--store-dir is required for wallet commands")]
    MissingStoreDir,
}
