//! # Record codec
//!
//! Length-prefixed binary encoding of `(key, value)` records for the ShoalKV
//! storage engine. The same frame is used everywhere bytes hit a file: the
//! write-ahead log, disk-table data files, and both index files.
//!
//! ## Frame layout
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ total_len (u64 BE), payload bytes that follow  │
//! │ key_len   (u64 BE)                             │
//! │ key bytes                                      │
//! │ value bytes  (may be empty)                    │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! `total_len` covers `key_len + key + value`, i.e. everything after the
//! first 8 bytes. A frame whose payload is exactly `8 + key_len` bytes has
//! an empty value; the codec does not interpret what an empty value means:
//! tombstone semantics live in the layers above.
//!
//! All integers are 8-byte big-endian unsigned, so files written on one
//! platform read back on any other.

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::{self, Read, Write};
use thiserror::Error;

/// Width of every encoded integer: 8 bytes, big-endian.
pub const INT_BYTES: usize = 8;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt record frame")]
    Corrupt,
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Encodes a record and writes it to `w`, returning the number of bytes
/// written (frame header included).
///
/// Must be compatible with [`decode`]: `decode(encode(k, v)) == (k, v)`.
pub fn encode<W: Write>(key: &[u8], value: &[u8], w: &mut W) -> Result<usize> {
    let payload_len = INT_BYTES + key.len() + value.len();

    w.write_u64::<BigEndian>(payload_len as u64)?;
    w.write_u64::<BigEndian>(key.len() as u64)?;
    w.write_all(key)?;
    w.write_all(value)?;

    Ok(INT_BYTES + payload_len)
}

/// Decodes the next record from `r`.
///
/// Returns `Ok(None)` on a clean end of stream (no header bytes left).
/// A header or payload that ends mid-frame is [`CodecError::Corrupt`].
pub fn decode<R: Read>(r: &mut R) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
    let mut header = [0u8; INT_BYTES];
    match read_full(r, &mut header)? {
        0 => return Ok(None),
        n if n < INT_BYTES => return Err(CodecError::Corrupt),
        _ => {}
    }

    let payload_len = BigEndian::read_u64(&header);
    let payload_len = usize::try_from(payload_len).map_err(|_| CodecError::Corrupt)?;
    if payload_len < INT_BYTES {
        // too short to carry the key_len field
        return Err(CodecError::Corrupt);
    }

    let mut payload = vec![0u8; payload_len];
    if read_full(r, &mut payload)? < payload_len {
        return Err(CodecError::Corrupt);
    }

    let key_len = BigEndian::read_u64(&payload[..INT_BYTES]);
    let key_len = usize::try_from(key_len).map_err(|_| CodecError::Corrupt)?;
    if key_len > payload_len - INT_BYTES {
        return Err(CodecError::Corrupt);
    }

    let key = payload[INT_BYTES..INT_BYTES + key_len].to_vec();
    let value = payload[INT_BYTES + key_len..].to_vec();

    Ok(Some((key, value)))
}

/// Encodes a record whose value is an 8-byte big-endian file offset.
///
/// Index and sparse-index files are streams of these.
pub fn encode_key_offset<W: Write>(key: &[u8], offset: u64, w: &mut W) -> Result<usize> {
    encode(key, &encode_int(offset), w)
}

/// Encodes a u64 as 8 big-endian bytes. Compatible with [`decode_int`].
pub fn encode_int(x: u64) -> [u8; INT_BYTES] {
    let mut buf = [0u8; INT_BYTES];
    BigEndian::write_u64(&mut buf, x);
    buf
}

/// Decodes 8 big-endian bytes as a u64.
pub fn decode_int(encoded: &[u8]) -> Result<u64> {
    if encoded.len() != INT_BYTES {
        return Err(CodecError::Corrupt);
    }
    Ok(BigEndian::read_u64(encoded))
}

/// Encodes two u64s as 16 big-endian bytes.
pub fn encode_int_pair(x: u64, y: u64) -> [u8; 2 * INT_BYTES] {
    let mut buf = [0u8; 2 * INT_BYTES];
    BigEndian::write_u64(&mut buf[..INT_BYTES], x);
    BigEndian::write_u64(&mut buf[INT_BYTES..], y);
    buf
}

/// Decodes 16 big-endian bytes as two u64s.
pub fn decode_int_pair(encoded: &[u8]) -> Result<(u64, u64)> {
    if encoded.len() != 2 * INT_BYTES {
        return Err(CodecError::Corrupt);
    }
    Ok((
        BigEndian::read_u64(&encoded[..INT_BYTES]),
        BigEndian::read_u64(&encoded[INT_BYTES..]),
    ))
}

/// Reads until `buf` is full or the stream ends, returning bytes read.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
