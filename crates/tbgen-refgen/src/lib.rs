//! Reference files for streaming-interface testbenches.
//!
//! A test feeds a raw byte file into the design under test and checks the resulting stream
//! against a reference log: one `data,keep,last` line per bus transfer. This crate produces both
//! files for any bus width, parses them back, derives deliberately broken variants for
//! negative tests, and caches the results on disk.

#![forbid(unsafe_code)]

pub mod cache;
pub mod codec;
pub mod error;
pub mod inject;
pub mod reference;
pub mod source;
pub mod store;

pub use cache::{AlwaysStale, ArtifactCache, CacheStatus, Freshness, MtimeFreshness};
pub use codec::{encode, encode_with, flatten, swap_bits, Encoding, RaggedTail};
pub use error::{RefgenError, Result};
pub use inject::{derive, ErrorKind};
pub use reference::{ReferenceLog, TransferRecord, MAX_DATA_WIDTH};
pub use source::random_bytes;
pub use store::{encode_file, write_variant, ArtifactStore, CompareArtifacts, FilePair};
