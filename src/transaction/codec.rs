//! RLP layout of legacy and EIP-155 transactions, and sender recovery.

use crate::crypto::{self, keccak256, Address, Signature};
use crate::error::{AccountsError, Result};
use crate::rlp::{self, encode_u128, encode_u64, trim_leading_zeros, RlpItem};

use super::Transaction;

/// Fields of a raw signed transaction, in order.
const SIGNED_FIELD_COUNT: usize = 9;

/// The six fields shared by every payload:
/// `[nonce, gas_price, gas, to, value, data]`.
pub(crate) fn base_fields(
    nonce: u64,
    gas_price: u128,
    gas: u64,
    to: Option<&Address>,
    value: u128,
    data: &[u8],
) -> Vec<RlpItem> {
    vec![
        encode_u64(nonce),
        encode_u128(gas_price),
        encode_u64(gas),
        to.map(|a| RlpItem::from(&a.as_bytes()[..]))
            .unwrap_or_else(RlpItem::empty),
        encode_u128(value),
        RlpItem::from(data),
    ]
}

/// Appends `[chain_id, '', '']`, the EIP-155 placeholders for `v, r, s`.
pub(crate) fn eip155_payload(mut fields: Vec<RlpItem>, chain_id: RlpItem) -> Vec<u8> {
    fields.push(chain_id);
    fields.push(RlpItem::empty());
    fields.push(RlpItem::empty());
    rlp::encode(&RlpItem::List(fields))
}

/// Appends the real `[v, r, s]`; `r` and `s` lose their leading zeros.
pub(crate) fn signed_payload(mut fields: Vec<RlpItem>, signature: &Signature) -> Vec<u8> {
    fields.push(encode_u64(signature.v));
    fields.push(RlpItem::from(trim_leading_zeros(&signature.r)));
    fields.push(RlpItem::from(trim_leading_zeros(&signature.s)));
    rlp::encode(&RlpItem::List(fields))
}

/// Splits a raw transaction into its nine byte-string fields.
fn decode_fields(raw: &[u8]) -> Result<Vec<RlpItem>> {
    let decoded = rlp::decode(raw)?;
    let fields = match decoded {
        RlpItem::List(fields) => fields,
        RlpItem::Bytes(_) => {
            return Err(AccountsError::MalformedTransaction(
                "expected a list".into(),
            ))
        }
    };
    if fields.len() != SIGNED_FIELD_COUNT {
        return Err(AccountsError::MalformedTransaction(format!(
            "expected {} fields, got {}",
            SIGNED_FIELD_COUNT,
            fields.len()
        )));
    }
    if fields.iter().any(|f| f.as_bytes().is_none()) {
        return Err(AccountsError::MalformedTransaction(
            "fields must be byte strings".into(),
        ));
    }
    Ok(fields)
}

fn signature_of(fields: &[RlpItem]) -> Result<Signature> {
    let v = rlp::decode_u64(&fields[6])
        .map_err(|e| AccountsError::InvalidSignature(format!("v: {}", e)))?;
    let r = fields[7].as_bytes().unwrap_or_default();
    let s = fields[8].as_bytes().unwrap_or_default();
    Signature::from_components(v, r, s)
}

/// Recovers the sender address of a raw signed transaction.
pub fn recover_transaction(raw: &[u8]) -> Result<Address> {
    let mut fields = decode_fields(raw)?;
    let signature = signature_of(&fields)?;
    fields.truncate(6);

    let (payload, recovery_id) = match signature.chain_id() {
        Some(chain_id) => {
            let recovery_id = (signature.v - (chain_id * 2 + 35)) as u8;
            (eip155_payload(fields, encode_u64(chain_id)), recovery_id)
        }
        None => {
            let recovery_id = match signature.v {
                27 | 28 => (signature.v - 27) as u8,
                v => {
                    return Err(AccountsError::InvalidSignature(format!(
                        "invalid v value {}",
                        v
                    )))
                }
            };
            (rlp::encode(&RlpItem::List(fields)), recovery_id)
        }
    };

    let hash = keccak256(&payload);
    crypto::recover_with_id(&hash, &signature.r, &signature.s, recovery_id)
}

/// Decodes a raw signed transaction into its fields and signature.
///
/// The chain id is taken from `v`; `from` is recovered from the signature.
pub fn decode_raw_transaction(raw: &[u8]) -> Result<(Transaction, Signature)> {
    let fields = decode_fields(raw)?;
    let signature = signature_of(&fields)?;
    let malformed = |name: &str, e: rlp::RlpError| {
        AccountsError::MalformedTransaction(format!("{}: {}", name, e))
    };

    let to = match fields[3].as_bytes().unwrap_or_default() {
        [] => None,
        bytes => Some(Address::from_slice(bytes).ok_or_else(|| {
            AccountsError::MalformedTransaction(format!("to is {} bytes", bytes.len()))
        })?),
    };

    let tx = Transaction {
        from: Some(recover_transaction(raw)?),
        nonce: Some(rlp::decode_u64(&fields[0]).map_err(|e| malformed("nonce", e))?),
        gas_price: Some(rlp::decode_u128(&fields[1]).map_err(|e| malformed("gasPrice", e))?),
        gas: Some(rlp::decode_u64(&fields[2]).map_err(|e| malformed("gas", e))?),
        to,
        value: rlp::decode_u128(&fields[4]).map_err(|e| malformed("value", e))?,
        data: fields[5].as_bytes().unwrap_or_default().to_vec(),
        chain_id: signature.chain_id(),
    };
    Ok((tx, signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_field_count() {
        let raw = rlp::encode(&RlpItem::List(vec![RlpItem::empty(); 8]));
        assert!(matches!(
            recover_transaction(&raw),
            Err(AccountsError::MalformedTransaction(_))
        ));
    }

    #[test]
    fn test_rejects_non_list() {
        let raw = rlp::encode(&RlpItem::from(&b"not a list"[..]));
        assert!(matches!(
            recover_transaction(&raw),
            Err(AccountsError::MalformedTransaction(_))
        ));
    }

    #[test]
    fn test_rejects_nested_list_field() {
        let mut fields = vec![RlpItem::empty(); 9];
        fields[5] = RlpItem::List(vec![]);
        let raw = rlp::encode(&RlpItem::List(fields));
        assert!(matches!(
            recover_transaction(&raw),
            Err(AccountsError::MalformedTransaction(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_input() {
        assert!(matches!(
            recover_transaction(&[0xf8, 0x6c, 0x09]),
            Err(AccountsError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_rejects_deeply_nested_input() {
        assert!(matches!(
            recover_transaction(&rlp::nested_lists(100_000)),
            Err(AccountsError::MalformedEncoding(rlp::RlpError::TooDeep(_)))
        ));
    }

    #[test]
    fn test_rejects_bad_legacy_v() {
        let mut fields = vec![RlpItem::empty(); 9];
        fields[6] = encode_u64(30);
        fields[7] = RlpItem::from(&[1u8; 32][..]);
        fields[8] = RlpItem::from(&[1u8; 32][..]);
        let raw = rlp::encode(&RlpItem::List(fields));
        assert!(matches!(
            recover_transaction(&raw),
            Err(AccountsError::InvalidSignature(_))
        ));
    }
}
