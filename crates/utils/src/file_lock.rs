//! Advisory locking around read-modify-write of shared files

use envlift_core::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// An exclusive advisory lock held on `<file>.lock` next to the guarded file.
///
/// The lock is released when the value is dropped. The lock file itself is left
/// in place so that concurrent waiters keep locking the same inode.
#[derive(Debug)]
pub struct FileLock {
    lock_file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Block until an exclusive lock for `path` is acquired
    pub fn acquire(path: &Path) -> Result<Self> {
        let lock_path = lock_path_for(path);
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::file_system(parent, "create lock directory", e))?;
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::file_system(&lock_path, "open lock file", e))?;

        lock_file
            .lock_exclusive()
            .map_err(|e| Error::file_system(&lock_path, "acquire lock", e))?;

        ::tracing::trace!(path = %lock_path.display(), "acquired file lock");
        Ok(Self {
            lock_file,
            lock_path,
        })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.lock_file);
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_is_sibling() {
        let path = Path::new("/tmp/envlift/config.json");
        assert_eq!(
            lock_path_for(path),
            PathBuf::from("/tmp/envlift/config.json.lock")
        );
    }

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let guarded = temp_dir.path().join("config.json");

        let lock = FileLock::acquire(&guarded).unwrap();
        assert!(lock.path().exists());

        // A second handle cannot take the lock while the first is held
        let other = OpenOptions::new().write(true).open(lock.path()).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(lock);
        assert!(other.try_lock_exclusive().is_ok());
    }
}
