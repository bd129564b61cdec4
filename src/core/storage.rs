//! Datasets and their backing storage.
//!
//! A [`Dataset`] declares a shape and element type. Its elements either live
//! inline in the container document or in an external raw file, read whole
//! and synchronously by [`Dataset::read`].

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::array::{ArrayBuffer, DenseArray};
use super::cache::{open_file, MappedFileCache};
use super::compression::{decompress, Compression};
use crate::util::{ElementType, Error, Result, Shape};

/// Elements stored in a file outside the container document.
///
/// Elements are little-endian, row-major, starting at `offset`.
#[derive(Clone, Debug)]
pub struct ExternalStorage {
    path: PathBuf,
    offset: u64,
    compression: Compression,
    cache: Option<Arc<MappedFileCache>>,
}

impl ExternalStorage {
    /// Describe raw elements at `offset` in `path`, read with buffered I/O.
    pub fn new(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            path: path.into(),
            offset,
            compression: Compression::None,
            cache: None,
        }
    }

    /// Set the compression of the stored bytes.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Read through memory maps shared by `cache`.
    pub fn with_cache(mut self, cache: Arc<MappedFileCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Path of the external file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset of the first element.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Compression of the stored bytes.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Whether reads go through a memory map.
    pub fn is_mapped(&self) -> bool {
        self.cache.is_some()
    }

    /// Read `len` stored bytes (after decompression, exactly `len` bytes).
    fn read_bytes(&self, len: usize) -> Result<Vec<u8>> {
        match self.compression {
            Compression::None => self.read_stored(Some(len)),
            Compression::Zlib => {
                let stored = self.read_stored(None)?;
                decompress(&stored, len)
            }
        }
    }

    /// Stored bytes from `offset`: exactly `len` of them, or everything to EOF.
    fn read_stored(&self, len: Option<usize>) -> Result<Vec<u8>> {
        let start = usize::try_from(self.offset)
            .map_err(|_| Error::invalid(format!("offset {} out of range", self.offset)))?;

        if let Some(cache) = &self.cache {
            let map = cache.get_or_map(&self.path)?;
            let end = match len {
                Some(len) => start.checked_add(len),
                None => Some(map.len()),
            };
            return match end {
                Some(end) if start <= end && end <= map.len() => Ok(map[start..end].to_vec()),
                _ => Err(truncated(&self.path, map.len() as u64)),
            };
        }

        let mut file = open_file(&self.path)?;
        let size = file.metadata()?.len();
        file.seek(SeekFrom::Start(self.offset))?;
        match len {
            Some(len) => {
                let end = u64::try_from(len).ok().and_then(|len| self.offset.checked_add(len));
                if !end.is_some_and(|end| end <= size) {
                    return Err(truncated(&self.path, size));
                }
                let mut bytes = vec![0u8; len];
                file.read_exact(&mut bytes).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::UnexpectedEof {
                        truncated(&self.path, self.offset)
                    } else {
                        Error::Io(e)
                    }
                })?;
                Ok(bytes)
            }
            None => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

fn truncated(path: &Path, size: u64) -> Error {
    Error::invalid(format!("external file {} is too short (at {})", path.display(), size))
}

/// Where the elements of a dataset live.
#[derive(Clone, Debug)]
pub enum DatasetStorage {
    /// Elements held in memory.
    Inline(ArrayBuffer),
    /// Elements in an external file.
    External(ExternalStorage),
}

/// A typed, shaped dataset.
#[derive(Clone, Debug)]
pub struct Dataset {
    shape: Shape,
    /// Element count, checked against `shape` on construction.
    len: usize,
    element_type: ElementType,
    storage: DatasetStorage,
}

impl Dataset {
    /// Create an inline dataset, checking the buffer against the shape.
    pub fn inline(shape: impl Into<Shape>, buffer: ArrayBuffer) -> Result<Self> {
        let shape = shape.into();
        let len = shape.checked_len()?;
        if buffer.len() != len {
            return Err(Error::invalid(format!(
                "dataset of shape {} needs {} elements, got {}",
                shape,
                len,
                buffer.len()
            )));
        }
        Ok(Self {
            shape,
            len,
            element_type: buffer.element_type(),
            storage: DatasetStorage::Inline(buffer),
        })
    }

    /// One-dimensional float64 dataset.
    pub fn from_f64(values: Vec<f64>) -> Self {
        Self {
            shape: Shape::d1(values.len()),
            len: values.len(),
            element_type: ElementType::Float64,
            storage: DatasetStorage::Inline(ArrayBuffer::Float64(values)),
        }
    }

    /// Dataset backed by an external file. Fails if the shape overflows.
    pub fn external(shape: impl Into<Shape>, element_type: ElementType, storage: ExternalStorage) -> Result<Self> {
        let shape = shape.into();
        let len = shape.checked_len()?;
        Ok(Self {
            shape,
            len,
            element_type,
            storage: DatasetStorage::External(storage),
        })
    }

    /// Declared shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Declared element type.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Backing storage.
    pub fn storage(&self) -> &DatasetStorage {
        &self.storage
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of samples along the leading dimension.
    pub fn num_samples(&self) -> usize {
        self.shape.num_samples()
    }

    /// Read the whole dataset into memory.
    pub fn read(&self) -> Result<DenseArray> {
        let buffer = match &self.storage {
            DatasetStorage::Inline(buffer) => buffer.clone(),
            DatasetStorage::External(external) => {
                let len = self.len.checked_mul(self.element_type.num_bytes()).ok_or_else(|| {
                    Error::invalid(format!("dataset of shape {} is too large to read", self.shape))
                })?;
                let bytes = external.read_bytes(len)?;
                tracing::trace!(
                    path = %external.path().display(),
                    bytes = len,
                    mapped = external.is_mapped(),
                    "read external dataset"
                );
                ArrayBuffer::from_le_bytes(self.element_type, &bytes)?
            }
        };
        DenseArray::new(self.shape.clone(), buffer)
    }
}
