use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RefgenError>;

#[derive(Debug, Error)]
pub enum RefgenError {
    #[error("data width must be at least 1 bit")]
    ZeroWidth,

    #[error("data width {width} exceeds the supported maximum of {max} bits")]
    WidthTooLarge { width: u32, max: u32 },

    #[error("cannot encode an empty byte sequence")]
    EmptyInput,

    #[error("value {value:#x} does not fit in {width} bits")]
    ValueTooWide { value: u64, width: u32 },

    #[error("{rule} needs at least {required} reference lines, found {found}")]
    ShortLog {
        rule: &'static str,
        required: usize,
        found: usize,
    },

    #[error("malformed reference line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("data width {width} is not byte aligned")]
    NotByteAligned { width: u32 },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RefgenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
