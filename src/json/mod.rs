//! JSON container format.
//!
//! A container is a single JSON document describing the node graph. Small
//! arrays are stored inline; bulk arrays (frames, long recordings) live in
//! external raw files next to the document and are read on demand.
//!
//! - [`format`] - Document schema
//! - [`JsonSource`] - [`ContainerSource`](crate::core::ContainerSource) implementation

pub mod format;
mod loader;

pub use format::{FORMAT_NAME, FORMAT_VERSION};
pub use loader::{load_document, load_str, JsonSource};
