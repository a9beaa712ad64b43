//! Legacy Ethereum transactions with EIP-155 replay protection.
//!
//! The signing payload is `rlp([nonce, gasPrice, gas, to, value, data,
//! chainId, '', ''])`; the raw transaction replaces the last three fields with
//! `v, r, s` where `v = recovery_id + chainId * 2 + 35`.

mod codec;
mod signer;
mod types;

pub use codec::{decode_raw_transaction, recover_transaction};
pub use signer::{sign_transaction, LocalSigner, TransactionSigner};
pub use types::{SignedTransaction, Transaction};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::crypto::{keccak256, Address};
    use crate::error::AccountsError;
    use crate::rlp::{self, RlpItem};
    use proptest::prelude::*;

    const EIP155_KEY: &str = "0x4646464646464646464646464646464646464646464646464646464646464646";

    fn eip155_example() -> Transaction {
        Transaction {
            nonce: Some(9),
            gas_price: Some(20_000_000_000),
            gas: Some(21_000),
            to: Some(Address::from_bytes([0x35; 20])),
            value: 1_000_000_000_000_000_000,
            chain_id: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_eip155_vector() {
        let account = Account::from_private_key(EIP155_KEY).unwrap();
        let signed = sign_transaction(&eip155_example(), &account).unwrap();

        assert_eq!(
            hex::encode(signed.message_hash),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
        assert_eq!(signed.v, 37);
        assert_eq!(
            signed.raw_transaction_hex(),
            "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        assert_eq!(signed.transaction_hash, keccak256(&signed.raw_transaction));
    }

    #[test]
    fn test_recover_eip155_vector() {
        let account = Account::from_private_key(EIP155_KEY).unwrap();
        let signed = sign_transaction(&eip155_example(), &account).unwrap();
        let sender = recover_transaction(&signed.raw_transaction).unwrap();
        assert_eq!(sender.to_checksum(), "0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F");
        assert_eq!(sender, *account.address());
    }

    #[test]
    fn test_missing_fields() {
        let account = Account::generate(None);
        for (tx, field) in [
            (Transaction { nonce: None, ..eip155_example() }, "nonce"),
            (Transaction { gas_price: None, ..eip155_example() }, "gasPrice"),
            (Transaction { gas: None, ..eip155_example() }, "gas"),
            (Transaction { chain_id: None, ..eip155_example() }, "chainId"),
        ] {
            match sign_transaction(&tx, &account) {
                Err(AccountsError::MissingField(name)) => assert_eq!(name, field),
                other => panic!("expected MissingField({}), got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_contract_creation() {
        let account = Account::generate(None);
        let tx = Transaction {
            to: None,
            data: vec![0x60, 0x80, 0x60, 0x40],
            ..eip155_example()
        };
        let signed = sign_transaction(&tx, &account).unwrap();
        let (decoded, _) = decode_raw_transaction(&signed.raw_transaction).unwrap();
        assert_eq!(decoded.to, None);
        assert_eq!(decoded.data, tx.data);
        assert_eq!(decoded.from, Some(*account.address()));
    }

    #[test]
    fn test_decode_raw_transaction() {
        let account = Account::from_private_key(EIP155_KEY).unwrap();
        let tx = eip155_example();
        let signed = sign_transaction(&tx, &account).unwrap();
        let (decoded, signature) = decode_raw_transaction(&signed.raw_transaction).unwrap();

        assert_eq!(decoded, Transaction { from: Some(*account.address()), ..tx });
        assert_eq!(signature.v, 37);
        assert_eq!(signature.r, signed.r);
        assert_eq!(signature.s, signed.s);
    }

    #[test]
    fn test_recover_legacy_signature() {
        let account = Account::generate(Some(b"legacy"));
        let tx = eip155_example();
        let fields = codec::base_fields(
            tx.nonce.unwrap(),
            tx.gas_price.unwrap(),
            tx.gas.unwrap(),
            tx.to.as_ref(),
            tx.value,
            &tx.data,
        );
        let hash = keccak256(&rlp::encode(&RlpItem::List(fields.clone())));
        let signature = account.sign_hash(&hash).unwrap();
        let raw = codec::signed_payload(fields, &signature);

        assert_eq!(recover_transaction(&raw).unwrap(), *account.address());
    }

    #[test]
    fn test_tampered_transaction_recovers_other_sender() {
        let account = Account::from_private_key(EIP155_KEY).unwrap();
        let signed = sign_transaction(&eip155_example(), &account).unwrap();
        let tampered = sign_transaction(
            &Transaction { nonce: Some(10), ..eip155_example() },
            &account,
        )
        .unwrap();

        let mut fields = match rlp::decode(&tampered.raw_transaction).unwrap() {
            RlpItem::List(fields) => fields,
            RlpItem::Bytes(_) => unreachable!(),
        };
        let original = match rlp::decode(&signed.raw_transaction).unwrap() {
            RlpItem::List(fields) => fields,
            RlpItem::Bytes(_) => unreachable!(),
        };
        fields[6..].clone_from_slice(&original[6..]);
        let spliced = rlp::encode(&RlpItem::List(fields));

        match recover_transaction(&spliced) {
            Ok(sender) => assert_ne!(sender, *account.address()),
            Err(e) => assert!(matches!(e, AccountsError::InvalidSignature(_))),
        }
    }

    #[test]
    fn test_json_field_names() {
        let tx: Transaction = serde_json::from_str(
            r#"{"to":"0x3535353535353535353535353535353535353535","gasLimit":21000,"gasPrice":20000000000,"input":"0x01ff","value":5}"#,
        )
        .unwrap();
        assert_eq!(tx.gas, Some(21_000));
        assert_eq!(tx.gas_price, Some(20_000_000_000));
        assert_eq!(tx.data, vec![0x01, 0xff]);
        assert_eq!(tx.nonce, None);
        assert_eq!(tx.value, 5);
    }

    #[tokio::test]
    async fn test_local_signer() {
        let account = Account::from_private_key(EIP155_KEY).unwrap();
        let signer = LocalSigner::from(account.clone());
        assert_eq!(signer.address(), *account.address());
        let signed = signer.sign_transaction(&eip155_example()).await.unwrap();
        assert_eq!(signed, sign_transaction(&eip155_example(), &account).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_sign_then_recover(
            seed in any::<[u8; 16]>(),
            nonce in any::<u64>(),
            gas_price in any::<u128>(),
            gas in any::<u64>(),
            value in any::<u128>(),
            data in proptest::collection::vec(any::<u8>(), 0..80),
            chain_id in 0u64..1_000_000,
        ) {
            let account = Account::generate(Some(&seed));
            let tx = Transaction {
                from: None,
                nonce: Some(nonce),
                gas_price: Some(gas_price),
                gas: Some(gas),
                to: Some(Address::from_bytes([7; 20])),
                value,
                data,
                chain_id: Some(chain_id),
            };
            let signed = sign_transaction(&tx, &account).unwrap();
            prop_assert_eq!(recover_transaction(&signed.raw_transaction).unwrap(), *account.address());
        }
    }
}
