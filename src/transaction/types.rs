//! Transaction value types.

use serde::{Deserialize, Serialize};

use crate::crypto::Address;

/// An unsigned legacy transaction.
///
/// `nonce`, `gas_price` and `chain_id` may be left out (or set to zero) when
/// signing through [`Accounts`](crate::Accounts); they are then fetched from
/// the provider. `to = None` deploys a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    #[serde(default, alias = "gasLimit", skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: u128,
    #[serde(default, alias = "input", with = "crate::crypto::serde_hex::bytes")]
    pub data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl Transaction {
    /// True when `field` is absent or zero and must be fetched before signing.
    pub(crate) fn is_unset<T: Default + PartialEq>(field: Option<T>) -> bool {
        match field {
            None => true,
            Some(value) => value == T::default(),
        }
    }
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// Keccak-256 of the EIP-155 signing payload.
    #[serde(with = "crate::crypto::serde_hex::bytes32")]
    pub message_hash: [u8; 32],
    pub v: u64,
    #[serde(with = "crate::crypto::serde_hex::bytes32")]
    pub r: [u8; 32],
    #[serde(with = "crate::crypto::serde_hex::bytes32")]
    pub s: [u8; 32],
    #[serde(with = "crate::crypto::serde_hex::bytes")]
    pub raw_transaction: Vec<u8>,
    /// Keccak-256 of `raw_transaction`.
    #[serde(with = "crate::crypto::serde_hex::bytes32")]
    pub transaction_hash: [u8; 32],
}

impl SignedTransaction {
    pub fn raw_transaction_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_transaction))
    }
}
