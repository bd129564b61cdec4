//! Utility types and functions for the reader.
//!
//! This module contains fundamental types used throughout the library:
//! - [`ElementType`] - Enum of dataset element types
//! - [`Shape`] - Dataset extents
//! - [`Error`] / [`Result`] - Error handling

mod pod;
mod error;
mod dimensions;

pub use pod::*;
pub use error::*;
pub use dimensions::*;
