//! Recursive Length Prefix encoding.
//!
//! An item is either a byte string or a list of items. Integers are carried
//! as big-endian byte strings with no leading zeros, so zero is the empty
//! string.

mod decode;
mod encode;

pub use decode::{decode, decode_u128, decode_u64, MAX_DEPTH};
pub(crate) use encode::{encode_header, trim_leading_zeros};
pub use encode::{encode, encode_u128, encode_u64};

/// A decoded or to-be-encoded RLP value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Returns the payload if this item is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RlpItem::Bytes(bytes) => Some(bytes),
            RlpItem::List(_) => None,
        }
    }

    /// Returns the children if this item is a list.
    pub fn as_list(&self) -> Option<&[RlpItem]> {
        match self {
            RlpItem::List(items) => Some(items),
            RlpItem::Bytes(_) => None,
        }
    }

    /// The empty byte string (`0x80` when encoded).
    pub fn empty() -> Self {
        RlpItem::Bytes(Vec::new())
    }
}

impl From<Vec<u8>> for RlpItem {
    fn from(bytes: Vec<u8>) -> Self {
        RlpItem::Bytes(bytes)
    }
}

impl From<&[u8]> for RlpItem {
    fn from(bytes: &[u8]) -> Self {
        RlpItem::Bytes(bytes.to_vec())
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(items: Vec<RlpItem>) -> Self {
        RlpItem::List(items)
    }
}

/// `depth` lists, each wrapping the next, around an empty list.
#[cfg(test)]
pub(crate) fn nested_lists(depth: usize) -> Vec<u8> {
    let mut headers = Vec::with_capacity(depth);
    let mut len = 1;
    for _ in 0..depth {
        let mut header = Vec::new();
        encode_header(len, 0xc0, &mut header);
        len += header.len();
        headers.push(header);
    }
    let mut out = Vec::with_capacity(len);
    for header in headers.iter().rev() {
        out.extend_from_slice(header);
    }
    out.push(0xc0);
    out
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RlpError {
    #[error("input is empty")]
    Empty,
    #[error("item at offset {offset} needs {needed} bytes but only {available} remain")]
    Overrun {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("length prefix of {0} bytes does not fit in a usize")]
    LengthOverflow(usize),
    #[error("{0} trailing bytes after the top-level item")]
    TrailingBytes(usize),
    #[error("expected a byte string, found a list")]
    ExpectedBytes,
    #[error("integer of {0} bytes is too wide")]
    IntegerOverflow(usize),
    #[error("non-canonical header at offset {offset}")]
    NonCanonical { offset: usize },
    #[error("lists nested deeper than {0} levels")]
    TooDeep(usize),
}
