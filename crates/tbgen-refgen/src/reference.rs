//! Reference log records and the line format checkers parse.
//!
//! Every line is `word,keep,last`:
//! - `word` is lowercase hex. Records with a keep mask are zero-padded to `data_width / 4`
//!   digits; records without one are unpadded.
//! - `keep` is the hex byte-lane mask, zero-padded to at least `data_width / 32` digits, or empty
//!   for widths that are not byte aligned.
//! - `last` is `1` on the final transfer and `0` everywhere else.

use std::fmt::Write as _;

use crate::error::{RefgenError, Result};

/// One data-path transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Big-endian word bytes, `ceil(data_width / 8)` long. Only the low `data_width` bits are
    /// meaningful.
    pub word: Vec<u8>,
    /// Number of valid byte lanes; the mask rendered on the line is `(1 << lanes) - 1`.
    pub keep: Option<u32>,
    pub last: bool,
}

/// An ordered sequence of transfers for a given data-path width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLog {
    data_width: u32,
    records: Vec<TransferRecord>,
}

impl ReferenceLog {
    pub(crate) fn new(data_width: u32, records: Vec<TransferRecord>) -> Self {
        Self {
            data_width,
            records,
        }
    }

    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders the newline-terminated reference file contents.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            match record.keep {
                Some(lanes) => {
                    for byte in &record.word {
                        let _ = write!(out, "{byte:02x}");
                    }
                    out.push(',');
                    out.push_str(&keep_mask_hex(lanes, (self.data_width / 32) as usize));
                }
                None => {
                    out.push_str(&minimal_hex(&record.word));
                    out.push(',');
                }
            }
            out.push(',');
            out.push(if record.last { '1' } else { '0' });
            out.push('\n');
        }
        out
    }

    /// Parses reference file contents written for `data_width`.
    pub fn parse(text: &str, data_width: u32) -> Result<Self> {
        check_width(data_width)?;
        let word_len = word_len(data_width);

        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let malformed = |reason: String| RefgenError::MalformedLine {
                line: line_no,
                reason,
            };

            let fields: Vec<&str> = line.split(',').collect();
            let [word, keep, last] = fields[..] else {
                return Err(malformed(format!("expected 3 fields, found {}", fields.len())));
            };

            let word = parse_hex_word(word, word_len).map_err(malformed)?;
            let keep = if keep.is_empty() {
                None
            } else {
                Some(parse_keep_mask(keep).map_err(malformed)?)
            };
            let last = match last {
                "1" => true,
                "0" => false,
                other => return Err(malformed(format!("invalid last flag {other:?}"))),
            };

            records.push(TransferRecord { word, keep, last });
        }

        Ok(Self::new(data_width, records))
    }

    /// Reconstructs the original byte sequence of a byte-aligned log.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        if self.data_width % 8 != 0 {
            return Err(RefgenError::NotByteAligned {
                width: self.data_width,
            });
        }
        let lanes = (self.data_width / 8) as usize;

        let mut out = Vec::with_capacity(self.records.len() * lanes);
        for record in &self.records {
            let valid = record.keep.map_or(lanes, |k| (k as usize).min(lanes));
            let start = record.word.len() - valid;
            out.extend(record.word[start..].iter().rev());
        }
        Ok(out)
    }

    /// Concatenates the low `data_width` bits of every word, most significant bit first.
    pub fn flattened_bits(&self) -> Vec<bool> {
        let width = self.data_width as usize;
        let mut bits = Vec::with_capacity(self.records.len() * width);
        for record in &self.records {
            bits.extend(word_bits(&record.word, width));
        }
        bits
    }
}

/// Widest data path accepted by the encoder and parser.
pub const MAX_DATA_WIDTH: u32 = 4096;

pub(crate) fn check_width(data_width: u32) -> Result<()> {
    match data_width {
        0 => Err(RefgenError::ZeroWidth),
        w if w > MAX_DATA_WIDTH => Err(RefgenError::WidthTooLarge {
            width: w,
            max: MAX_DATA_WIDTH,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn word_len(data_width: u32) -> usize {
    data_width.div_ceil(8) as usize
}

/// Packs `bits` (most significant first) right-aligned into a `width`-bit big-endian word.
pub(crate) fn bits_to_word(bits: &[bool], width: usize) -> Vec<u8> {
    let mut word = vec![0u8; width.div_ceil(8)];
    let offset = word.len() * 8 - bits.len();
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            let pos = offset + i;
            word[pos / 8] |= 0x80 >> (pos % 8);
        }
    }
    word
}

fn word_bits(word: &[u8], width: usize) -> impl Iterator<Item = bool> + '_ {
    let total = word.len() * 8;
    (total.saturating_sub(width)..total).map(move |pos| word[pos / 8] & (0x80 >> (pos % 8)) != 0)
}

fn keep_mask_hex(lanes: u32, min_digits: usize) -> String {
    let mut digits = String::new();
    let rem = lanes % 4;
    if rem != 0 {
        let _ = write!(digits, "{:x}", (1u8 << rem) - 1);
    }
    for _ in 0..lanes / 4 {
        digits.push('f');
    }
    if digits.is_empty() {
        digits.push('0');
    }
    format!("{digits:0>min_digits$}")
}

fn minimal_hex(word: &[u8]) -> String {
    let mut out = String::new();
    for byte in word {
        let _ = write!(out, "{byte:02x}");
    }
    let trimmed = out.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_hex_word(text: &str, word_len: usize) -> std::result::Result<Vec<u8>, String> {
    if text.is_empty() {
        return Err("empty word".to_string());
    }
    if !text.is_ascii() {
        return Err(format!("invalid hex word {text:?}"));
    }
    if text.len() > word_len * 2 {
        return Err(format!("word {text:?} is wider than {} bytes", word_len));
    }

    let padded = format!("{text:0>width$}", width = word_len * 2);
    (0..word_len)
        .map(|i| {
            u8::from_str_radix(&padded[2 * i..2 * i + 2], 16)
                .map_err(|_| format!("invalid hex word {text:?}"))
        })
        .collect()
}

fn parse_keep_mask(text: &str) -> std::result::Result<u32, String> {
    let mut lanes = 0u32;
    let mut seen_zero_above = true;
    for ch in text.chars() {
        let nibble = ch
            .to_digit(16)
            .ok_or_else(|| format!("invalid keep mask {text:?}"))?;
        // Only masks of the form `0..01..1` describe a lane count.
        match (seen_zero_above, nibble) {
            (true, 0) => {}
            (true, 0x1 | 0x3 | 0x7 | 0xf) => {
                lanes += nibble.count_ones();
                seen_zero_above = false;
            }
            (false, 0xf) => lanes += 4,
            _ => return Err(format!("keep mask {text:?} is not contiguous")),
        }
    }
    Ok(lanes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_mask_padding_tracks_width() {
        assert_eq!(keep_mask_hex(1, 0), "1");
        assert_eq!(keep_mask_hex(2, 0), "3");
        assert_eq!(keep_mask_hex(3, 0), "7");
        assert_eq!(keep_mask_hex(4, 1), "f");
        assert_eq!(keep_mask_hex(1, 1), "1");
        assert_eq!(keep_mask_hex(8, 2), "ff");
        assert_eq!(keep_mask_hex(3, 2), "07");
        assert_eq!(keep_mask_hex(0, 2), "00");
    }

    #[test]
    fn keep_mask_parses_lane_counts() {
        assert_eq!(parse_keep_mask("0"), Ok(0));
        assert_eq!(parse_keep_mask("07"), Ok(3));
        assert_eq!(parse_keep_mask("ff"), Ok(8));
        assert_eq!(parse_keep_mask("1ff"), Ok(9));
        assert!(parse_keep_mask("5").is_err());
        assert!(parse_keep_mask("f0").is_err());
        assert!(parse_keep_mask("zz").is_err());
    }

    #[test]
    fn minimal_hex_strips_leading_zeros() {
        assert_eq!(minimal_hex(&[0x00]), "0");
        assert_eq!(minimal_hex(&[0x0a]), "a");
        assert_eq!(minimal_hex(&[0x01, 0x00]), "100");
    }

    #[test]
    fn bits_pack_right_aligned() {
        assert_eq!(bits_to_word(&[true, false, false], 3), vec![0b100]);
        assert_eq!(bits_to_word(&[true, false], 3), vec![0b10]);
        assert_eq!(bits_to_word(&[true; 12], 12), vec![0x0f, 0xff]);
    }

    #[test]
    fn parse_rejects_bad_lines() {
        let err = ReferenceLog::parse("01,1,0\n02,1\n", 8).unwrap_err();
        assert!(matches!(err, RefgenError::MalformedLine { line: 2, .. }));

        let err = ReferenceLog::parse("0102,3,1\n", 8).unwrap_err();
        assert!(matches!(err, RefgenError::MalformedLine { line: 1, .. }));

        let err = ReferenceLog::parse("01,1,2\n", 8).unwrap_err();
        assert!(matches!(err, RefgenError::MalformedLine { line: 1, .. }));

        let err = ReferenceLog::parse("1,,1\n", MAX_DATA_WIDTH + 1).unwrap_err();
        assert!(matches!(err, RefgenError::WidthTooLarge { .. }));
    }

    #[test]
    fn parse_then_render_is_stable() {
        let text = "00000201,3,0\n00000003,1,1\n";
        let log = ReferenceLog::parse(text, 32).unwrap();
        assert_eq!(log.data_width(), 32);
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[1].keep, Some(1));
        assert_eq!(log.render(), text);
    }

    #[test]
    fn decode_requires_byte_alignment() {
        let log = ReferenceLog::parse("1,,1\n", 3).unwrap();
        assert!(matches!(
            log.decode_bytes(),
            Err(RefgenError::NotByteAligned { width: 3 })
        ));
    }
}
