//! Filesystem-backed memoization for generated artifacts.
//!
//! An artifact set is reused only when the [`Freshness`] predicate accepts every path in it;
//! otherwise the producer runs again. There is no locking: concurrent generators racing on
//! the same directory are not supported.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::Result;

/// Decides whether an existing set of artifacts can be reused.
pub trait Freshness {
    fn is_fresh(&self, paths: &[&Path]) -> bool;
}

/// Fresh when every file exists and none is older than the generator itself.
///
/// A modification time that cannot be read (for the generator or any artifact) counts as stale.
#[derive(Debug, Clone)]
pub struct MtimeFreshness {
    generator_mtime: Option<SystemTime>,
}

impl MtimeFreshness {
    pub fn new(generator_mtime: Option<SystemTime>) -> Self {
        Self { generator_mtime }
    }

    /// Uses the modification time of `generator` (typically the running executable).
    pub fn for_generator(generator: &Path) -> Self {
        let generator_mtime = fs::metadata(generator).and_then(|m| m.modified());
        if let Err(err) = &generator_mtime {
            tracing::debug!(
                generator = %generator.display(),
                "cannot read generator mtime, treating artifacts as stale: {err}"
            );
        }
        Self::new(generator_mtime.ok())
    }
}

impl Freshness for MtimeFreshness {
    fn is_fresh(&self, paths: &[&Path]) -> bool {
        let Some(generator_mtime) = self.generator_mtime else {
            return false;
        };
        paths.iter().all(|path| {
            fs::metadata(path)
                .and_then(|m| m.modified())
                .is_ok_and(|mtime| mtime >= generator_mtime)
        })
    }
}

/// Reuses nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysStale;

impl Freshness for AlwaysStale {
    fn is_fresh(&self, _paths: &[&Path]) -> bool {
        false
    }
}

impl<F: Freshness + ?Sized> Freshness for Box<F> {
    fn is_fresh(&self, paths: &[&Path]) -> bool {
        (**self).is_fresh(paths)
    }
}

/// Outcome of [`ArtifactCache::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Reused,
    Generated,
}

pub struct ArtifactCache<F> {
    freshness: F,
}

impl<F: Freshness> ArtifactCache<F> {
    pub fn new(freshness: F) -> Self {
        Self { freshness }
    }

    /// Runs `produce` unless every path in `paths` is fresh.
    pub fn ensure<P>(&self, paths: &[PathBuf], produce: P) -> Result<CacheStatus>
    where
        P: FnOnce() -> Result<()>,
    {
        let refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
        if self.freshness.is_fresh(&refs) {
            tracing::debug!(paths = ?refs, "reusing cached artifacts");
            return Ok(CacheStatus::Reused);
        }
        produce()?;
        Ok(CacheStatus::Generated)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;

    struct Fixed(bool);

    impl Freshness for Fixed {
        fn is_fresh(&self, _paths: &[&Path]) -> bool {
            self.0
        }
    }

    #[test]
    fn ensure_skips_producer_when_fresh() {
        let cache = ArtifactCache::new(Fixed(true));
        let runs = Cell::new(0);
        let status = cache
            .ensure(&[PathBuf::from("a")], || {
                runs.set(runs.get() + 1);
                Ok(())
            })
            .unwrap();
        assert_eq!(status, CacheStatus::Reused);
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn ensure_runs_producer_when_stale() {
        let cache = ArtifactCache::new(Fixed(false));
        let runs = Cell::new(0);
        for _ in 0..2 {
            let status = cache
                .ensure(&[PathBuf::from("a")], || {
                    runs.set(runs.get() + 1);
                    Ok(())
                })
                .unwrap();
            assert_eq!(status, CacheStatus::Generated);
        }
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn mtime_freshness_requires_existing_newer_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("artifact.bin");
        fs::write(&file, b"x").unwrap();
        let mtime = fs::metadata(&file).unwrap().modified().unwrap();

        let older_generator = MtimeFreshness::new(Some(mtime - Duration::from_secs(60)));
        assert!(older_generator.is_fresh(&[&file]));

        let newer_generator = MtimeFreshness::new(Some(mtime + Duration::from_secs(60)));
        assert!(!newer_generator.is_fresh(&[&file]));

        let missing = dir.path().join("missing.bin");
        assert!(!older_generator.is_fresh(&[&file, &missing]));
    }

    #[test]
    fn unreadable_generator_mtime_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("artifact.bin");
        fs::write(&file, b"x").unwrap();

        let freshness = MtimeFreshness::for_generator(&dir.path().join("no-such-generator"));
        assert!(!freshness.is_fresh(&[&file]));
        assert!(!AlwaysStale.is_fresh(&[&file]));
    }
}
