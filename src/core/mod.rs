//! Core layer - the object graph and fundamental types.
//!
//! This module provides:
//! - [`Node`] / [`NodeKind`] / [`Field`] - The NWB object graph
//! - [`NodeBuilder`] - Bottom-up graph construction
//! - [`TimeAxis`] - Explicit or uniform series timing
//! - [`Dataset`] / [`DenseArray`] - Typed arrays and their storage
//! - [`Attributes`] - String attributes of nodes
//! - [`ContainerSource`] - The gateway trait for container formats

mod array;
mod builder;
mod cache;
mod compression;
mod metadata;
mod node;
mod storage;
mod time_axis;
mod traits;

pub use array::{ArrayBuffer, DenseArray};
pub use builder::NodeBuilder;
pub use cache::MappedFileCache;
pub use compression::{compress, decompress, Compression};
pub use metadata::Attributes;
pub use node::{
    ContainerKind, Field, FieldMap, ImageStream, Node, NodeKind, SignalStream, TopLevelGroup, ROOT_NAME,
};
pub use storage::{Dataset, DatasetStorage, ExternalStorage};
pub use time_axis::TimeAxis;
pub use traits::{ContainerSource, LoadOptions};
