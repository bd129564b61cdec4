//! Abstract traits for container access.
//!
//! A [`ContainerSource`] turns a path into a fully materialized root node.
//! The high-level reader never parses files itself; it only talks to a source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::node::Node;
use crate::util::Result;

/// Options controlling how a container and its external datasets are opened.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Read external datasets through memory maps (needs the `mmap` feature).
    pub use_mmap: bool,
    /// Directory that relative external paths resolve against.
    /// Defaults to the directory holding the container file.
    pub base_dir: Option<PathBuf>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            use_mmap: cfg!(feature = "mmap"),
            base_dir: None,
        }
    }
}

impl LoadOptions {
    /// Whether memory maps are both requested and compiled in.
    pub fn mmap_enabled(&self) -> bool {
        cfg!(feature = "mmap") && self.use_mmap
    }

    /// Directory for relative external paths of a container at `path`.
    pub fn base_dir_for(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.clone(),
            None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }
}

/// Gateway to an on-disk container format.
///
/// Implementations open `path` read-only and return the root node of the
/// fully built graph. The root must be named [`ROOT_NAME`](super::ROOT_NAME).
pub trait ContainerSource: Send + Sync {
    /// Short name of the format, for diagnostics.
    fn format_name(&self) -> &str;

    /// Open the container at `path`.
    fn open(&self, path: &Path, options: &LoadOptions) -> Result<Arc<Node>>;
}
