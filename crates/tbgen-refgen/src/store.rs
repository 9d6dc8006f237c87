//! Named raw/reference artifacts under an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::{ArtifactCache, CacheStatus, Freshness};
use crate::codec::{encode_with, Encoding, RaggedTail};
use crate::error::{RefgenError, Result};
use crate::inject::{derive, ErrorKind};
use crate::source::random_bytes;

/// A raw data file and the reference log describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub input: PathBuf,
    pub reference: PathBuf,
}

/// Inputs for the file compare testbench: one good pair plus its error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareArtifacts {
    pub pair: FilePair,
    pub single_error: PathBuf,
    pub double_error: PathBuf,
    pub last_error: PathBuf,
}

impl CompareArtifacts {
    pub fn variant(&self, kind: ErrorKind) -> &Path {
        match kind {
            ErrorKind::SingleMismatch => &self.single_error,
            ErrorKind::DoubleMismatch => &self.double_error,
            ErrorKind::LastFlagError => &self.last_error,
        }
    }
}

pub struct ArtifactStore<F> {
    dir: PathBuf,
    seed: i32,
    cache: ArtifactCache<F>,
}

impl<F: Freshness> ArtifactStore<F> {
    pub fn new(dir: impl Into<PathBuf>, seed: i32, freshness: F) -> Self {
        Self {
            dir: dir.into(),
            seed,
            cache: ArtifactCache::new(freshness),
        }
    }

    /// The file reader pair for `length` bytes on a `data_width`-bit bus, generated if needed.
    pub fn reader_pair(&self, data_width: u32, length: usize) -> Result<FilePair> {
        let basename = format!("file_reader_data_width_{data_width}_length_{length}_bytes");
        let pair = FilePair {
            input: self.dir.join(format!("{basename}_input.bin")),
            reference: self.dir.join(format!("{basename}_reference.bin")),
        };
        self.ensure_pair(&pair, data_width, length)?;
        Ok(pair)
    }

    /// The file compare fixture. Variants are rederived whenever the base pair is regenerated.
    pub fn compare_set(&self, data_width: u32, length: usize) -> Result<CompareArtifacts> {
        let pair = FilePair {
            input: self.dir.join("file_compare_input.bin"),
            reference: self.dir.join("file_compare_reference_ok.bin"),
        };
        let base_status = self.ensure_pair(&pair, data_width, length)?;

        let variant_path = |kind: ErrorKind| {
            self.dir
                .join(format!("file_compare_reference_{}.bin", kind.file_suffix()))
        };
        let artifacts = CompareArtifacts {
            single_error: variant_path(ErrorKind::SingleMismatch),
            double_error: variant_path(ErrorKind::DoubleMismatch),
            last_error: variant_path(ErrorKind::LastFlagError),
            pair,
        };

        for kind in ErrorKind::ALL {
            let out = artifacts.variant(kind);
            let write = || write_variant(&artifacts.pair.reference, out, kind);
            if base_status == CacheStatus::Generated {
                write()?;
            } else {
                self.cache.ensure(&[out.to_path_buf()], write)?;
            }
        }

        Ok(artifacts)
    }

    fn ensure_pair(&self, pair: &FilePair, data_width: u32, length: usize) -> Result<CacheStatus> {
        self.cache.ensure(&[pair.input.clone(), pair.reference.clone()], || {
            self.generate_pair(pair, data_width, length).map(|_| ())
        })
    }

    /// Unconditionally writes a fresh pair of random data.
    pub fn generate_pair(
        &self,
        pair: &FilePair,
        data_width: u32,
        length: usize,
    ) -> Result<Encoding> {
        tracing::info!(
            input = %pair.input.display(),
            reference = %pair.reference.display(),
            data_width,
            length,
            "generating file reader test files"
        );

        let bytes = random_bytes(self.seed, data_width, length);
        let encoding = encode_with(&bytes, data_width, RaggedTail::default())?;

        fs::create_dir_all(&self.dir).map_err(|e| RefgenError::io(&self.dir, e))?;
        write_atomic(&pair.input, &encoding.raw)?;
        write_atomic(&pair.reference, encoding.log.render().as_bytes())?;
        Ok(encoding)
    }
}

/// Encodes an existing raw file into a reference file.
pub fn encode_file(
    input: &Path,
    reference: &Path,
    data_width: u32,
    ragged: RaggedTail,
) -> Result<Encoding> {
    let bytes = fs::read(input).map_err(|e| RefgenError::io(input, e))?;
    let encoding = encode_with(&bytes, data_width, ragged)?;
    write_atomic(reference, encoding.log.render().as_bytes())?;
    Ok(encoding)
}

/// Writes the `kind` error variant of the reference file at `reference` to `out`.
pub fn write_variant(reference: &Path, out: &Path, kind: ErrorKind) -> Result<()> {
    let base = fs::read_to_string(reference).map_err(|e| RefgenError::io(reference, e))?;
    let derived = derive(&base, kind)?;
    tracing::debug!(
        reference = %reference.display(),
        out = %out.display(),
        kind = kind.as_str(),
        "writing reference error variant"
    );
    write_atomic(out, derived.as_bytes())
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("artifact");
    let tmp_path = parent.join(format!(".{file_name}.tbgen.tmp"));

    fs::write(&tmp_path, data).map_err(|e| RefgenError::io(&tmp_path, e))?;

    // `rename` doesn't replace on Windows.
    #[cfg(windows)]
    {
        let _ = fs::remove_file(path);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        RefgenError::io(path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AlwaysStale;
    use crate::reference::ReferenceLog;

    #[test]
    fn reader_pair_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), 42, AlwaysStale);

        let pair = store.reader_pair(16, 9).unwrap();
        assert!(pair
            .input
            .ends_with("file_reader_data_width_16_length_9_bytes_input.bin"));

        let raw = fs::read(&pair.input).unwrap();
        assert_eq!(raw, random_bytes(42, 16, 9));

        let text = fs::read_to_string(&pair.reference).unwrap();
        let log = ReferenceLog::parse(&text, 16).unwrap();
        assert_eq!(log.len(), 5);
        assert_eq!(log.decode_bytes().unwrap(), raw);
    }

    #[test]
    fn compare_set_writes_all_variants() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), 3, AlwaysStale);

        let set = store.compare_set(32, 32 * 8).unwrap();
        let base = fs::read_to_string(&set.pair.reference).unwrap();
        assert_eq!(base.lines().count(), 64);

        for kind in ErrorKind::ALL {
            let text = fs::read_to_string(set.variant(kind)).unwrap();
            assert_eq!(text, derive(&base, kind).unwrap());
        }
        assert_eq!(fs::read_to_string(&set.single_error).unwrap().lines().count(), 65);
        assert_eq!(fs::read_to_string(&set.double_error).unwrap().lines().count(), 66);
        assert!(fs::read_to_string(&set.last_error)
            .unwrap()
            .trim_end()
            .ends_with(",0,0"));
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = ArtifactStore::new(&nested, 0, AlwaysStale);
        store.reader_pair(8, 1).unwrap();
        assert!(nested.join("file_reader_data_width_8_length_1_bytes_reference.bin").exists());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        let err = write_atomic(&target, b"data").unwrap_err();
        assert!(matches!(err, RefgenError::Io { .. }));
        assert!(!dir.path().join(".occupied.tbgen.tmp").exists());
        assert!(target.join("keep").exists());
    }

    #[test]
    fn encode_file_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_file(
            &dir.path().join("nope.bin"),
            &dir.path().join("ref.bin"),
            8,
            RaggedTail::ZeroPad,
        )
        .unwrap_err();
        assert!(matches!(err, RefgenError::Io { .. }));
    }
}
