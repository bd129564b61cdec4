//! # NWB Reader
//!
//! Read-only explorer for Neurodata Without Borders (NWB) containers.
//!
//! Opens a container, discovers its data interfaces, resolves where each one
//! lives in the hierarchy, checks whether a file satisfies a set of
//! structural requirements, and turns time series into plot-ready arrays.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (element types, shapes, errors)
//! - [`core`] - Node graph, datasets, time axes and the container source trait
//! - [`json`] - JSON container format
//! - [`reader`] - High-level API ([`NwbReader`])
//!
//! ## Example
//!
//! ```ignore
//! use nwb_reader::NwbReader;
//!
//! let reader = NwbReader::open("session.nwb.json")?;
//! if reader.has_all_requirements(&["acquisition.ElectricalSeries"]) {
//!     for series in reader.get_all_timeseries() {
//!         let plot = NwbReader::get_plottable_timeseries(series, Some(1000))?;
//!         println!("{} -> {} samples", series.name(), plot.len());
//!     }
//! }
//! ```

pub mod util;
pub mod core;
pub mod json;
pub mod reader;

// Re-export commonly used types
pub use util::{ElementType, Error, Result, Shape};
pub use reader::{NwbReader, PlottableSeries, Requirement};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{ElementType, Error, Result, Shape};
    pub use crate::core::{
        ContainerSource, Dataset, DenseArray, Field, FieldMap, LoadOptions, Node, NodeBuilder, NodeKind,
        SignalStream, ImageStream, TimeAxis, TopLevelGroup,
    };
    pub use crate::json::JsonSource;
    pub use crate::reader::{NwbReader, PlottableSeries, Requirement};
}
