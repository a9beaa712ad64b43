//! RLP decoder.
//!
//! Every length read from a header is checked against the remaining input
//! before it is used, so truncated or hostile input fails instead of
//! panicking. Only canonical encodings are accepted, and list nesting is
//! bounded by [`MAX_DEPTH`].

use super::{RlpError, RlpItem};

/// Deepest list nesting the decoder will follow.
pub const MAX_DEPTH: usize = 64;

/// Decodes exactly one top-level item. Trailing bytes are an error.
pub fn decode(input: &[u8]) -> Result<RlpItem, RlpError> {
    if input.is_empty() {
        return Err(RlpError::Empty);
    }
    let (item, consumed) = decode_at(input, 0, 0)?;
    if consumed != input.len() {
        return Err(RlpError::TrailingBytes(input.len() - consumed));
    }
    Ok(item)
}

/// Decodes the item starting at `offset`; returns it with the offset just past it.
fn decode_at(input: &[u8], offset: usize, depth: usize) -> Result<(RlpItem, usize), RlpError> {
    let prefix = *input.get(offset).ok_or(RlpError::Overrun {
        offset,
        needed: 1,
        available: 0,
    })?;

    match prefix {
        0x00..=0x7f => Ok((RlpItem::Bytes(vec![prefix]), offset + 1)),
        0x80..=0xb7 => {
            let len = (prefix - 0x80) as usize;
            let start = offset + 1;
            let payload = take(input, start, len)?;
            // A lone byte below 0x80 encodes as itself.
            if len == 1 && payload[0] < 0x80 {
                return Err(RlpError::NonCanonical { offset });
            }
            Ok((RlpItem::Bytes(payload.to_vec()), start + len))
        }
        0xb8..=0xbf => {
            let len_of_len = (prefix - 0xb7) as usize;
            let len = read_length(input, offset, len_of_len)?;
            let start = offset + 1 + len_of_len;
            let payload = take(input, start, len)?;
            Ok((RlpItem::Bytes(payload.to_vec()), start + len))
        }
        0xc0..=0xf7 => {
            let len = (prefix - 0xc0) as usize;
            decode_list(input, offset + 1, len, depth)
        }
        0xf8..=0xff => {
            let len_of_len = (prefix - 0xf7) as usize;
            let len = read_length(input, offset, len_of_len)?;
            decode_list(input, offset + 1 + len_of_len, len, depth)
        }
    }
}

fn decode_list(
    input: &[u8],
    start: usize,
    len: usize,
    depth: usize,
) -> Result<(RlpItem, usize), RlpError> {
    if depth >= MAX_DEPTH {
        return Err(RlpError::TooDeep(MAX_DEPTH));
    }
    // Bound the children to the declared payload.
    let payload = take(input, start, len)?;
    let mut items = Vec::new();
    let mut cursor = 0;
    while cursor < payload.len() {
        let (item, next) = decode_at(payload, cursor, depth + 1)?;
        items.push(item);
        cursor = next;
    }
    Ok((RlpItem::List(items), start + len))
}

fn take(input: &[u8], start: usize, len: usize) -> Result<&[u8], RlpError> {
    let available = input.len().saturating_sub(start);
    let end = start.checked_add(len).ok_or(RlpError::LengthOverflow(len))?;
    if end > input.len() {
        return Err(RlpError::Overrun {
            offset: start,
            needed: len,
            available,
        });
    }
    Ok(&input[start..end])
}

/// Reads the long-form length that follows the prefix at `offset`. The
/// length must have no leading zero byte and must exceed 55.
fn read_length(input: &[u8], offset: usize, len_of_len: usize) -> Result<usize, RlpError> {
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(RlpError::LengthOverflow(len_of_len));
    }
    let bytes = take(input, offset + 1, len_of_len)?;
    if bytes[0] == 0 {
        return Err(RlpError::NonCanonical { offset });
    }
    let len = bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize);
    if len <= 55 {
        return Err(RlpError::NonCanonical { offset });
    }
    Ok(len)
}

/// Reads a byte-string item as a big-endian `u64`.
pub fn decode_u64(item: &RlpItem) -> Result<u64, RlpError> {
    let bytes = item.as_bytes().ok_or(RlpError::ExpectedBytes)?;
    if bytes.len() > 8 {
        return Err(RlpError::IntegerOverflow(bytes.len()));
    }
    Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
}

/// Reads a byte-string item as a big-endian `u128`.
pub fn decode_u128(item: &RlpItem) -> Result<u128, RlpError> {
    let bytes = item.as_bytes().ok_or(RlpError::ExpectedBytes)?;
    if bytes.len() > 16 {
        return Err(RlpError::IntegerOverflow(bytes.len()));
    }
    Ok(bytes.iter().fold(0u128, |acc, b| (acc << 8) | *b as u128))
}
