//! Mapped file cache.
//!
//! Datasets of one container frequently live in the same external file.
//! The cache maps each file once and hands out shared maps.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use parking_lot::RwLock;

use crate::util::{Error, Result};

/// Thread-safe cache of memory-mapped files, keyed by path.
///
/// Uses `parking_lot::RwLock` for faster, non-poisoning locks.
#[derive(Default)]
pub struct MappedFileCache {
    files: RwLock<HashMap<PathBuf, Arc<Mmap>>>,
}

impl MappedFileCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the map for `path`, mapping the file on first use.
    pub fn get_or_map(&self, path: &Path) -> Result<Arc<Mmap>> {
        if let Some(map) = self.files.read().get(path) {
            return Ok(Arc::clone(map));
        }

        let mut files = self.files.write();
        // Another caller may have mapped it between the locks.
        if let Some(map) = files.get(path) {
            return Ok(Arc::clone(map));
        }

        let file = open_file(path)?;
        // Safety: file is opened read-only and the container is never written
        // while a reader holds it.
        let map = unsafe { Mmap::map(&file) }
            .map_err(|e| Error::other(format!("Memory mapping {} failed: {}", path.display(), e)))?;
        let map = Arc::new(map);
        tracing::trace!(path = %path.display(), bytes = map.len(), "mapped external file");
        files.insert(path.to_path_buf(), Arc::clone(&map));
        Ok(map)
    }

    /// Get the number of mapped files.
    #[inline]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Check if no file is mapped.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MappedFileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFileCache")
            .field("files", &self.files.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Open a file read-only, reporting a missing file as [`Error::FileNotFound`].
pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_maps_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.bin");
        File::create(&path).unwrap().write_all(&[1, 2, 3, 4]).unwrap();

        let cache = MappedFileCache::new();
        assert!(cache.is_empty());

        let a = cache.get_or_map(&path).unwrap();
        let b = cache.get_or_map(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(&a[..], &[1, 2, 3, 4]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let cache = MappedFileCache::new();
        let err = cache.get_or_map(Path::new("/nonexistent/raw.bin")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
