//! Wallet persistence through the facade.

use std::sync::Arc;

use eth_accounts::{
    Accounts, AccountsConfig, FileStore, Kdf, KeyValueStore, KeystoreOptions, KeystoreV3,
    MemoryStore, OfflineProvider,
};

fn fast_config(key_name: &str) -> AccountsConfig {
    AccountsConfig {
        default_key_name: key_name.to_string(),
        keystore: KeystoreOptions::with_kdf(Kdf::scrypt(1024)),
    }
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));

    let mut accounts = Accounts::new(Arc::new(OfflineProvider), fast_config("team"))
        .with_storage(store.clone());
    let indices = accounts.wallet_mut().create(3, Some(b"file store"));
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(accounts.wallet().save("pw", None).unwrap());
    assert!(dir.path().join("team.json").exists());

    let document = store.get_item("team").unwrap().unwrap();
    let keystores: Vec<KeystoreV3> = serde_json::from_str(&document).unwrap();
    assert_eq!(keystores.len(), 3);
    assert!(keystores.iter().all(|k| k.crypto.kdf == "scrypt"));

    let mut restored =
        Accounts::new(Arc::new(OfflineProvider), fast_config("team")).with_storage(store);
    restored.wallet_mut().load("pw", None).unwrap();
    assert_eq!(restored.wallet().len(), 3);
    for (index, account) in accounts.wallet().iter() {
        assert_eq!(restored.wallet().get(index), Some(account));
    }
}

#[test]
fn test_explicit_key_name_overrides_default() {
    let store = Arc::new(MemoryStore::new());
    let mut accounts =
        Accounts::new(Arc::new(OfflineProvider), fast_config("default")).with_storage(store.clone());
    accounts.wallet_mut().create(1, None);
    accounts.wallet().save("pw", Some("other")).unwrap();

    assert!(store.get_item("default").unwrap().is_none());
    assert!(store.get_item("other").unwrap().is_some());
}

#[test]
fn test_wrong_password_loads_nothing() {
    let store = Arc::new(MemoryStore::new());
    let mut accounts =
        Accounts::new(Arc::new(OfflineProvider), fast_config("w")).with_storage(store.clone());
    accounts.wallet_mut().create(2, None);
    accounts.wallet().save("right", None).unwrap();

    let mut other = Accounts::new(Arc::new(OfflineProvider), fast_config("w")).with_storage(store);
    other.wallet_mut().load("wrong", None).unwrap();
    assert!(other.wallet().is_empty());
}

#[test]
fn test_wallet_idempotent_add() {
    let mut accounts = Accounts::new(Arc::new(OfflineProvider), AccountsConfig::default());
    let key = "0x0000000000000000000000000000000000000000000000000000000000000001";
    let first = accounts.wallet_mut().add(key).unwrap().clone();
    let second = accounts.wallet_mut().add(key).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(accounts.wallet().len(), 1);
    assert_eq!(accounts.wallet().default_key_name(), "web3js_wallet");
}
