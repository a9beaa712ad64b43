//! EIP-155 signing.

use async_trait::async_trait;
use tracing::debug;

use crate::account::Account;
use crate::crypto::{keccak256, Address};
use crate::error::{AccountsError, Result};
use crate::rlp::encode_u64;

use super::codec::{base_fields, eip155_payload, signed_payload};
use super::{SignedTransaction, Transaction};

/// Signs a transaction whose nonce, gas price, gas and chain id are all set.
///
/// Zero is a legal value here; only the facade treats zero as "fetch".
pub fn sign_transaction(tx: &Transaction, account: &Account) -> Result<SignedTransaction> {
    let nonce = tx.nonce.ok_or(AccountsError::MissingField("nonce"))?;
    let gas_price = tx.gas_price.ok_or(AccountsError::MissingField("gasPrice"))?;
    let gas = tx.gas.ok_or(AccountsError::MissingField("gas"))?;
    let chain_id = tx.chain_id.ok_or(AccountsError::MissingField("chainId"))?;

    let fields = base_fields(nonce, gas_price, gas, tx.to.as_ref(), tx.value, &tx.data);
    let message_hash = keccak256(&eip155_payload(fields.clone(), encode_u64(chain_id)));

    let signature = account
        .sign_hash_recoverable(&message_hash)?
        .into_eip155_signature(chain_id)?;
    let raw_transaction = signed_payload(fields, &signature);
    let transaction_hash = keccak256(&raw_transaction);

    debug!(
        "signed transaction 0x{} from {} on chain {}",
        hex::encode(transaction_hash),
        account.address(),
        chain_id
    );

    Ok(SignedTransaction {
        message_hash,
        v: signature.v,
        r: signature.r,
        s: signature.s,
        raw_transaction,
        transaction_hash,
    })
}

/// Something that can sign fully populated transactions.
///
/// The facade holds one of these so that signing can be delegated to an
/// external key holder.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Address whose nonce is fetched when `from` is not set.
    fn address(&self) -> Address;

    async fn sign_transaction(&self, tx: &Transaction) -> Result<SignedTransaction>;
}

/// Signs in-process with a held [`Account`].
#[derive(Debug, Clone)]
pub struct LocalSigner {
    account: Account,
}

impl LocalSigner {
    pub fn new(account: Account) -> Self {
        Self { account }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

impl From<Account> for LocalSigner {
    fn from(account: Account) -> Self {
        Self::new(account)
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        *self.account.address()
    }

    async fn sign_transaction(&self, tx: &Transaction) -> Result<SignedTransaction> {
        sign_transaction(tx, &self.account)
    }
}
