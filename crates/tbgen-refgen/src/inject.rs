//! Negative-path reference logs derived from a known-good one.
//!
//! The derivations are purely positional. The offsets are fixed constants tied to the file
//! compare fixture (32-bit words, 256 bytes), not derived from the log contents.

use crate::error::{RefgenError, Result};

const FIRST_ERROR_LINE: usize = 7;
const SECOND_ERROR_LINE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Line 7 is repeated once.
    SingleMismatch,
    /// Lines 7 and 16 are each repeated once.
    DoubleMismatch,
    /// The final line loses its last flag (and keep mask).
    LastFlagError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 3] = [
        ErrorKind::SingleMismatch,
        ErrorKind::DoubleMismatch,
        ErrorKind::LastFlagError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::SingleMismatch => "single_mismatch",
            ErrorKind::DoubleMismatch => "double_mismatch",
            ErrorKind::LastFlagError => "last_flag_error",
        }
    }

    /// File name suffix used next to the base reference file.
    pub fn file_suffix(self) -> &'static str {
        match self {
            ErrorKind::SingleMismatch => "tdata_1_error",
            ErrorKind::DoubleMismatch => "tdata_2_errors",
            ErrorKind::LastFlagError => "tlast_error",
        }
    }

    fn min_lines(self) -> usize {
        match self {
            ErrorKind::SingleMismatch => FIRST_ERROR_LINE + 1,
            ErrorKind::DoubleMismatch => SECOND_ERROR_LINE + 1,
            ErrorKind::LastFlagError => 1,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the `kind` variant of the reference log text `base`. The result is newline-terminated.
pub fn derive(base: &str, kind: ErrorKind) -> Result<String> {
    let lines: Vec<&str> = base.trim_end_matches('\n').split('\n').collect();
    let lines = if lines == [""] { Vec::new() } else { lines };

    if lines.len() < kind.min_lines() {
        return Err(RefgenError::ShortLog {
            rule: kind.as_str(),
            required: kind.min_lines(),
            found: lines.len(),
        });
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 2);
    match kind {
        ErrorKind::SingleMismatch => {
            let (head, tail) = lines.split_at(FIRST_ERROR_LINE);
            out.extend(head.iter().map(|l| l.to_string()));
            out.push(tail[0].to_string());
            out.extend(tail.iter().map(|l| l.to_string()));
        }
        ErrorKind::DoubleMismatch => {
            for (idx, line) in lines.iter().enumerate() {
                if idx == FIRST_ERROR_LINE || idx == SECOND_ERROR_LINE {
                    out.push(line.to_string());
                }
                out.push(line.to_string());
            }
        }
        ErrorKind::LastFlagError => {
            let (last, head) = lines.split_last().ok_or(RefgenError::ShortLog {
                rule: kind.as_str(),
                required: 1,
                found: 0,
            })?;
            let fields: Vec<&str> = last.split(',').collect();
            if fields.len() != 3 {
                return Err(RefgenError::MalformedLine {
                    line: lines.len(),
                    reason: format!("expected 3 fields, found {}", fields.len()),
                });
            }
            out.extend(head.iter().map(|l| l.to_string()));
            out.push(format!("{},0,0", fields[0]));
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    Ok(text)
}
