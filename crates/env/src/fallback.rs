//! Local snapshot of the last successful secrets download

use envlift_core::{Error, Result};
use envlift_utils::write_atomic_private;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Raw payload bytes stored at a caller-chosen path.
///
/// The payload is not validated here; decoding is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCache {
    path: PathBuf,
}

impl FallbackCache {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() || path.file_name().is_none() {
            return Err(Error::configuration(format!(
                "invalid fallback file path '{}'",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot atomically, readable by the owner only
    pub fn write(&self, payload: &[u8]) -> Result<()> {
        write_atomic_private(&self.path, payload).map_err(|e| {
            Error::fallback_with_source(&self.path, "unable to write fallback file", e)
        })?;
        tracing::debug!(path = %self.path.display(), bytes = payload.len(), "updated fallback file");
        Ok(())
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(payload) => Ok(payload),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::fallback(&self.path, "file does not exist"))
            }
            Err(e) => Err(Error::fallback_with_source(
                &self.path,
                "unable to read fallback file",
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FallbackCache::new(temp_dir.path().join("secrets.json")).unwrap();

        let payload = b"{\"variables\":{\"A\":{\"raw\":\"\\u00e9\",\"computed\":\"\xc3\xa9\"}}}\n";
        cache.write(payload).unwrap();
        assert_eq!(cache.read().unwrap(), payload);
    }

    #[test]
    fn test_write_replaces_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FallbackCache::new(temp_dir.path().join("nested/dir/secrets.json")).unwrap();

        cache.write(b"first, and longer than the second").unwrap();
        cache.write(b"second").unwrap();
        assert_eq!(cache.read().unwrap(), b"second");
    }

    #[test]
    fn test_missing_file_is_fallback_error() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FallbackCache::new(temp_dir.path().join("absent.json")).unwrap();

        let err = cache.read().unwrap_err();
        assert!(matches!(err, Error::Fallback { .. }));
        assert!(!err.is_fallback_eligible());
    }

    #[test]
    fn test_unusable_paths_are_rejected() {
        assert!(matches!(
            FallbackCache::new(""),
            Err(Error::Configuration { .. })
        ));
        assert!(FallbackCache::new("/").is_err());
        assert!(FallbackCache::new("..").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_snapshot_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let cache = FallbackCache::new(temp_dir.path().join("secrets.json")).unwrap();
        cache.write(b"{}").unwrap();

        let mode = fs::metadata(cache.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
