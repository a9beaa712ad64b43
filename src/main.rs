//! Ethereum account tool CLI
//!
//! Usage:
//!   eth_accounts generate -n 3                       # Print three new accounts
//!   eth_accounts sign-message -k 0x... "Some data"   # Sign a personal message
//!   eth_accounts encrypt -k 0x... -p secret -o key.json
//!   eth_accounts --store-dir ./wallets wallet-create -n 2 -p secret

use std::fs;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use eth_accounts::config::Command;
use eth_accounts::crypto::decode_hex;
use eth_accounts::wallet::indexed_seed;
use eth_accounts::{
    Account, Accounts, AccountsError, Address, Config, FileStore, KeyValueStore, KeystoreV3,
    OfflineProvider, RecoverInput, Result, Transaction,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .build_global()
    {
        eprintln!("Failed to start worker pool: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&config).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(config: &Config) -> Result<()> {
    let mut accounts = Accounts::new(Arc::new(OfflineProvider), config.accounts_config());
    if let Some(dir) = &config.store_dir {
        accounts = accounts.with_storage(Arc::new(FileStore::new(dir)));
    }

    match &config.command {
        Command::Generate { count, entropy } => {
            for i in 0..*count {
                let account = match entropy {
                    Some(entropy) => accounts.create(Some(&indexed_seed(entropy.as_bytes(), i))),
                    None => accounts.create(None),
                };
                print_account(&account, i + 1);
            }
        }
        Command::SignMessage {
            private_key,
            message,
        } => {
            let signed = accounts.sign(message, private_key)?;
            println!("Message hash: 0x{}", hex::encode(signed.message_hash));
            println!("Signature:    {}", signed.signature);
            println!("v:            {}", signed.v);
        }
        Command::RecoverMessage {
            message,
            signature,
            prefixed,
        } => {
            let input = RecoverInput::Signed {
                message: message.clone(),
                signature: signature.parse()?,
                prefixed: *prefixed,
            };
            println!("{}", accounts.recover(&input)?);
        }
        Command::Encrypt {
            private_key,
            password,
            output,
        } => {
            let keystore = accounts.encrypt(private_key, password, None)?;
            let json = keystore.to_json_pretty()?;
            match output {
                Some(path) => {
                    fs::write(path, json)?;
                    info!("wrote keystore to {}", path.display());
                    println!("Address: 0x{}", keystore.address);
                }
                None => println!("{}", json),
            }
        }
        Command::Decrypt {
            keystore,
            password,
            non_strict,
        } => {
            let keystore = KeystoreV3::from_json(&fs::read_to_string(keystore)?)?;
            let account = accounts.decrypt(&keystore, password, *non_strict)?;
            print_account(&account, 1);
        }
        Command::SignTx {
            private_key,
            nonce,
            gas_price,
            gas,
            to,
            value,
            data,
            chain_id,
        } => {
            let to = match to {
                Some(to) => Some(to.parse::<Address>().map_err(|e| {
                    AccountsError::MalformedTransaction(format!("to: {}", e))
                })?),
                None => None,
            };
            let data = match data {
                Some(data) => decode_hex(data)?,
                None => Vec::new(),
            };
            let tx = Transaction {
                from: None,
                nonce: Some(*nonce),
                gas_price: Some(*gas_price),
                gas: Some(*gas),
                to,
                value: *value,
                data,
                chain_id: Some(*chain_id),
            };
            let signed = accounts.sign_transaction(&tx, private_key).await?;
            println!("Raw transaction:  {}", signed.raw_transaction_hex());
            println!("Transaction hash: 0x{}", hex::encode(signed.transaction_hash));
        }
        Command::RecoverTx { raw } => {
            println!("{}", accounts.recover_transaction(raw)?);
        }
        Command::WalletCreate { count, password } => {
            let stored = stored_entry_count(config)?;
            let wallet = accounts.wallet_mut();
            wallet.load(password, None)?;
            if wallet.len() < stored {
                return Err(AccountsError::Storage(format!(
                    "only {} of {} stored accounts could be decrypted, refusing to overwrite",
                    wallet.len(),
                    stored
                )));
            }
            let indices = wallet.create(*count, None);
            wallet.save(password, None)?;
            for index in indices {
                if let Some(account) = wallet.get(index) {
                    println!("[{}] {}", index, account.address());
                }
            }
        }
        Command::WalletList { password } => {
            let wallet = accounts.wallet_mut().load(password, None)?;
            println!("{} account(s) under '{}'", wallet.len(), wallet.default_key_name());
            for (index, account) in wallet.iter() {
                println!("[{}] {}", index, account.address());
            }
        }
    }

    Ok(())
}

/// Number of keystores currently stored under the configured key.
fn stored_entry_count(config: &Config) -> Result<usize> {
    let dir = match &config.store_dir {
        Some(dir) => dir,
        None => return Ok(0),
    };
    match FileStore::new(dir).get_item(&config.key_name)? {
        Some(document) => Ok(serde_json::from_str::<Vec<serde_json::Value>>(&document)?.len()),
        None => Ok(0),
    }
}

fn print_account(account: &Account, index: usize) {
    println!("=== Account #{} ===", index);
    println!("Address:     {}", account.address());
    println!("Private Key: {}", account.private_key_hex());
    println!();
}
