//! RLP encoder.

use super::RlpItem;

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;

/// Encodes an item into its canonical RLP byte representation.
pub fn encode(item: &RlpItem) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(item, &mut out);
    out
}

fn encode_into(item: &RlpItem, out: &mut Vec<u8>) {
    match item {
        RlpItem::Bytes(bytes) => {
            if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
                out.push(bytes[0]);
            } else {
                encode_header(bytes.len(), STRING_OFFSET, out);
                out.extend_from_slice(bytes);
            }
        }
        RlpItem::List(items) => {
            let mut payload = Vec::new();
            for item in items {
                encode_into(item, &mut payload);
            }
            encode_header(payload.len(), LIST_OFFSET, out);
            out.extend_from_slice(&payload);
        }
    }
}

/// Writes `offset + len` for short payloads, or `offset + 55 + len_of_len`
/// followed by the big-endian length for payloads over 55 bytes.
pub(crate) fn encode_header(len: usize, offset: u8, out: &mut Vec<u8>) {
    if len <= 55 {
        out.push(offset + len as u8);
    } else {
        let be = len.to_be_bytes();
        let len_bytes = trim_leading_zeros(&be);
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

pub(crate) fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

/// Minimal big-endian form of an unsigned integer; zero is the empty string.
pub fn encode_u64(value: u64) -> RlpItem {
    RlpItem::Bytes(trim_leading_zeros(&value.to_be_bytes()).to_vec())
}

/// Minimal big-endian form of a 128-bit unsigned integer.
pub fn encode_u128(value: u128) -> RlpItem {
    RlpItem::Bytes(trim_leading_zeros(&value.to_be_bytes()).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(b: &[u8]) -> RlpItem {
        RlpItem::Bytes(b.to_vec())
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(encode(&RlpItem::List(vec![])), vec![0xc0]);
        assert_eq!(encode(&RlpItem::empty()), vec![0x80]);
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(encode(&bytes(&[0x00])), vec![0x00]);
        assert_eq!(encode(&bytes(&[0x7f])), vec![0x7f]);
        assert_eq!(encode(&bytes(&[0x80])), vec![0x81, 0x80]);
    }

    #[test]
    fn test_short_string() {
        assert_eq!(encode(&bytes(b"dog")), vec![0x83, b'd', b'o', b'g']);
    }

    #[test]
    fn test_long_string() {
        let text = b"Lorem ipsum dolor sit amet, consectetur adipisicing elit";
        assert_eq!(text.len(), 56);
        let encoded = encode(&bytes(text));
        assert_eq!(&encoded[..2], &[0xb8, 56]);
        assert_eq!(&encoded[2..], text);
    }

    #[test]
    fn test_multi_byte_length_header() {
        let payload = vec![0xaa; 1024];
        let encoded = encode(&RlpItem::Bytes(payload.clone()));
        assert_eq!(&encoded[..3], &[0xb9, 0x04, 0x00]);
        assert_eq!(&encoded[3..], &payload[..]);

        let list = encode(&RlpItem::List(vec![RlpItem::Bytes(payload); 1]));
        assert_eq!(&list[..4], &[0xf9, 0x04, 0x03, 0xb9]);
    }

    #[test]
    fn test_list_of_strings() {
        let list = RlpItem::List(vec![bytes(b"cat"), bytes(b"dog")]);
        assert_eq!(
            encode(&list),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
    }

    #[test]
    fn test_set_theoretical_representation() {
        // [ [], [[]], [ [], [[]] ] ]
        let empty = || RlpItem::List(vec![]);
        let item = RlpItem::List(vec![
            empty(),
            RlpItem::List(vec![empty()]),
            RlpItem::List(vec![empty(), RlpItem::List(vec![empty()])]),
        ]);
        assert_eq!(
            encode(&item),
            vec![0xc7, 0xc0, 0xc1, 0xc0, 0xc3, 0xc0, 0xc1, 0xc0]
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(encode(&encode_u64(0)), vec![0x80]);
        assert_eq!(encode(&encode_u64(15)), vec![0x0f]);
        assert_eq!(encode(&encode_u64(1024)), vec![0x82, 0x04, 0x00]);
        assert_eq!(
            encode(&encode_u128(1_000_000_000_000_000_000)),
            hex::decode("880de0b6b3a7640000").unwrap()
        );
    }
}
