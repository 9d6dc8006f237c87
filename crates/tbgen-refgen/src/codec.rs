//! Byte sequence to reference log encoding.

use crate::error::{RefgenError, Result};
use crate::reference::{bits_to_word, check_width, ReferenceLog, TransferRecord};

/// What to do with a final bit-flattened chunk shorter than the data width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RaggedTail {
    /// Append zero bits on the right until the chunk is `data_width` bits long.
    #[default]
    ZeroPad,
    /// Use the short chunk's value as-is (its bits end up right-aligned in the word).
    Truncate,
}

/// Output of [`encode`]: the raw data file contents and the matching reference log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub raw: Vec<u8>,
    pub log: ReferenceLog,
}

/// Encodes `bytes` for a `data_width`-bit data path, zero-padding a ragged sub-byte tail.
pub fn encode(bytes: &[u8], data_width: u32) -> Result<Encoding> {
    encode_with(bytes, data_width, RaggedTail::default())
}

pub fn encode_with(bytes: &[u8], data_width: u32, ragged: RaggedTail) -> Result<Encoding> {
    check_width(data_width)?;
    if bytes.is_empty() {
        return Err(RefgenError::EmptyInput);
    }

    let records = if data_width % 8 == 0 {
        pack_lanes(bytes, (data_width / 8) as usize)
    } else {
        pack_bits(bytes, data_width as usize, ragged)?
    };

    Ok(Encoding {
        raw: bytes.to_vec(),
        log: ReferenceLog::new(data_width, records),
    })
}

/// Each window of `lanes` bytes becomes one word; later bytes land in more significant lanes.
fn pack_lanes(bytes: &[u8], lanes: usize) -> Vec<TransferRecord> {
    let count = bytes.len().div_ceil(lanes);
    bytes
        .chunks(lanes)
        .enumerate()
        .map(|(idx, window)| {
            let mut word = vec![0u8; lanes];
            for (i, byte) in window.iter().enumerate() {
                word[lanes - 1 - i] = *byte;
            }
            TransferRecord {
                word,
                keep: Some(window.len() as u32),
                last: idx + 1 == count,
            }
        })
        .collect()
}

fn pack_bits(bytes: &[u8], width: usize, ragged: RaggedTail) -> Result<Vec<TransferRecord>> {
    let bits = flatten(bytes)?;
    let count = bits.len().div_ceil(width);

    let records = bits
        .chunks(width)
        .enumerate()
        .map(|(idx, chunk)| {
            let word = if chunk.len() < width && ragged == RaggedTail::ZeroPad {
                let mut padded = chunk.to_vec();
                padded.resize(width, false);
                bits_to_word(&padded, width)
            } else {
                bits_to_word(chunk, width)
            };
            TransferRecord {
                word,
                keep: None,
                last: idx + 1 == count,
            }
        })
        .collect();
    Ok(records)
}

/// Flattens bytes into one bit string, each byte contributing its bits LSB first.
pub fn flatten(bytes: &[u8]) -> Result<Vec<bool>> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        let swapped = swap_bits(u64::from(*byte), 8)?;
        bits.extend((0..8).rev().map(|i| swapped & (1 << i) != 0));
    }
    Ok(bits)
}

/// Reverses the low `width` bits of `value`.
pub fn swap_bits(value: u64, width: u32) -> Result<u64> {
    if width == 0 || width > u64::BITS {
        return Err(RefgenError::ValueTooWide { value, width });
    }
    if width < u64::BITS && value >> width != 0 {
        return Err(RefgenError::ValueTooWide { value, width });
    }
    Ok(value.reverse_bits() >> (u64::BITS - width))
}
