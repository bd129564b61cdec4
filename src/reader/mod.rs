//! High-level read API.
//!
//! [`NwbReader`] opens a container through a [`ContainerSource`], discovers
//! its data interfaces once, and answers queries over the resulting graph:
//!
//! - discovery of data interfaces and time series
//! - path resolution for a node
//! - requirement checks (`"acquisition.ElectricalSeries"`, `"LFP"`, ...)
//! - decimated series for plotting and raw image arrays
//!
//! # Example
//!
//! ```ignore
//! use nwb_reader::NwbReader;
//!
//! let reader = NwbReader::open("session.nwb.json")?;
//! for series in reader.get_all_timeseries() {
//!     let path = reader.extract_time_series_path(series);
//!     let plot = NwbReader::get_plottable_timeseries(series, Some(1000))?;
//!     println!("{:?} {} samples", path, plot.len());
//! }
//! ```

pub mod discovery;
pub mod path;
pub mod plot;
pub mod requirements;

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::core::{ContainerSource, DenseArray, LoadOptions, Node};
use crate::json::JsonSource;
use crate::util::{Error, Result};

pub use path::{ancestor_chain, resolve_path};
pub use plot::PlottableSeries;
pub use requirements::Requirement;

/// Read-only view of one opened container.
pub struct NwbReader {
    root: Arc<Node>,
    data_interfaces: OnceLock<Vec<Arc<Node>>>,
    time_series: OnceLock<Vec<Arc<Node>>>,
}

impl NwbReader {
    /// Open a JSON container with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, &LoadOptions::default())
    }

    /// Open a JSON container.
    pub fn open_with_options(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        Self::open_with_source(path, &JsonSource, options)
    }

    /// Open a container through an arbitrary source.
    ///
    /// Any failure of the source is reported as
    /// [`Error::UnreadableContainer`] carrying the path and the cause.
    pub fn open_with_source(
        path: impl AsRef<Path>,
        source: &dyn ContainerSource,
        options: &LoadOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), format = source.format_name(), "opening container");

        let root = source.open(path, options).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to open container");
            Error::unreadable(path, e)
        })?;
        Ok(Self::from_root(root))
    }

    /// Wrap an already built graph.
    pub fn from_root(root: Arc<Node>) -> Self {
        Self {
            root,
            data_interfaces: OnceLock::new(),
            time_series: OnceLock::new(),
        }
    }

    // ========================================================================
    // Graph access
    // ========================================================================

    /// The root node.
    pub fn get_nwbfile(&self) -> &Arc<Node> {
        &self.root
    }

    /// The root node, for callers that want to walk the graph directly.
    pub fn underlying_container(&self) -> &Arc<Node> {
        &self.root
    }

    /// All data interfaces, depth-first, parents before children.
    ///
    /// Computed on first call; later calls return the same list.
    pub fn get_data_interfaces(&self) -> &[Arc<Node>] {
        self.data_interfaces.get_or_init(|| {
            let found = discovery::discover(&self.root);
            tracing::debug!(count = found.len(), "discovered data interfaces");
            found
        })
    }

    /// The data interfaces that are time series, in discovery order.
    pub fn get_all_timeseries(&self) -> &[Arc<Node>] {
        self.time_series
            .get_or_init(|| discovery::signals_of(self.get_data_interfaces()))
    }

    /// Field keys leading from the root to the mapping holding `node`.
    ///
    /// The root itself resolves to an empty path; unreachable nodes to `None`.
    pub fn extract_time_series_path(&self, node: &Arc<Node>) -> Option<Vec<String>> {
        if Arc::ptr_eq(node, &self.root) {
            return Some(Vec::new());
        }
        resolve_path(self.root.fields(), node)
    }

    /// Names from the outermost non-root ancestor down to `node`.
    pub fn ancestor_chain(node: &Arc<Node>) -> Vec<String> {
        path::ancestor_chain(node)
    }

    // ========================================================================
    // Requirements
    // ========================================================================

    /// Check that every requirement holds. An empty list always holds.
    pub fn has_all_requirements<S: AsRef<str>>(&self, requirements: &[S]) -> bool {
        requirements.iter().all(|text| {
            let requirement = Requirement::parse(text.as_ref());
            let ok = requirement.is_satisfied(&self.root, self.get_data_interfaces());
            tracing::debug!(requirement = %requirement, satisfied = ok, "checked requirement");
            ok
        })
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Decimated timestamps and per-channel values of a time series.
    ///
    /// With `resampling_size` set and smaller than the sample count, every
    /// `n / resampling_size`-th sample is kept.
    pub fn get_plottable_timeseries(node: &Node, resampling_size: Option<usize>) -> Result<PlottableSeries> {
        let series = node
            .as_signal()
            .ok_or_else(|| Error::NotASignalStream(node.name().to_string()))?;
        plot::plottable(series, resampling_size)
    }

    /// The full frame array of an image series.
    pub fn get_timeseries_image_array(node: &Node) -> Result<DenseArray> {
        let image = node
            .as_image()
            .ok_or_else(|| Error::NotAnImageStream(node.name().to_string()))?;
        plot::raw_array(image)
    }

    /// 1 for one-dimensional series data, else the leading dimension.
    pub fn get_timeseries_dimensions(node: &Node) -> Result<usize> {
        let series = node
            .as_signal()
            .ok_or_else(|| Error::NotASignalStream(node.name().to_string()))?;
        Ok(plot::channel_count(series))
    }
}

impl fmt::Debug for NwbReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NwbReader")
            .field("root", &self.root.name())
            .field("discovered", &self.data_interfaces.get().map(Vec::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArrayBuffer, Dataset, ImageStream, NodeBuilder, SignalStream};

    fn electrical(name: &str, n: usize) -> Arc<Node> {
        let data = Dataset::from_f64((0..n).map(|i| i as f64).collect());
        let stream = SignalStream::with_rate(data, 1000.0, 0.0).unwrap();
        NodeBuilder::signal(name, "ElectricalSeries", stream).build()
    }

    fn movie() -> Arc<Node> {
        let frames = Dataset::inline(vec![3, 2, 2], ArrayBuffer::Uint8((0..12).collect())).unwrap();
        let stream = SignalStream::with_rate(frames, 30.0, 0.0).unwrap();
        NodeBuilder::image("movie", "ImageSeries", ImageStream::new(stream).with_format("raw")).build()
    }

    #[test]
    fn test_discovery_is_memoized() {
        let reader = NwbReader::from_root(
            NodeBuilder::file()
                .child_in("acquisition", electrical("a", 10))
                .child_in("acquisition", movie())
                .build(),
        );
        let first = reader.get_data_interfaces().as_ptr();
        let second = reader.get_data_interfaces().as_ptr();
        assert_eq!(first, second);
        assert_eq!(reader.get_all_timeseries().len(), 2);
    }

    #[test]
    fn test_root_path_is_empty() {
        let reader = NwbReader::from_root(NodeBuilder::file().build());
        let root = Arc::clone(reader.get_nwbfile());
        assert_eq!(reader.extract_time_series_path(&root), Some(vec![]));
        assert!(Arc::ptr_eq(reader.underlying_container(), &root));
    }

    #[test]
    fn test_unreachable_path() {
        let reader = NwbReader::from_root(NodeBuilder::file().build());
        assert_eq!(reader.extract_time_series_path(&electrical("loose", 1)), None);
    }

    #[test]
    fn test_empty_requirements() {
        let reader = NwbReader::from_root(NodeBuilder::file().build());
        let none: [&str; 0] = [];
        assert!(reader.has_all_requirements(&none));
    }

    #[test]
    fn test_requirements_all() {
        let reader = NwbReader::from_root(
            NodeBuilder::file()
                .child_in("acquisition", electrical("series_0", 10))
                .build(),
        );
        assert!(reader.has_all_requirements(&["acquisition.ElectricalSeries", "ElectricalSeries"]));
        assert!(!reader.has_all_requirements(&["ElectricalSeries", "stimulus.ElectricalSeries"]));
        assert!(reader.has_all_requirements(&vec!["ElectricalSeries".to_string()]));
    }

    #[test]
    fn test_wrong_kind_errors() {
        let series = electrical("s", 4);
        let image = movie();
        let group = NodeBuilder::group("acquisition").build();

        assert!(matches!(
            NwbReader::get_timeseries_image_array(&series),
            Err(Error::NotAnImageStream(name)) if name == "s"
        ));
        assert!(matches!(
            NwbReader::get_plottable_timeseries(&group, None),
            Err(Error::NotASignalStream(_))
        ));
        assert!(matches!(
            NwbReader::get_timeseries_dimensions(&group),
            Err(Error::NotASignalStream(_))
        ));

        // image series are time series too
        let plot = NwbReader::get_plottable_timeseries(&image, None).unwrap();
        assert_eq!(plot.len(), 3);
        assert_eq!(plot.num_channels(), 4);
        assert_eq!(NwbReader::get_timeseries_dimensions(&image).unwrap(), 3);
        assert_eq!(NwbReader::get_timeseries_dimensions(&series).unwrap(), 1);
    }

    #[test]
    fn test_image_array() {
        let array = NwbReader::get_timeseries_image_array(&movie()).unwrap();
        assert_eq!(array.shape().sizes(), &[3, 2, 2]);
        assert_eq!(array.as_slice::<u8>().map(<[u8]>::len), Some(12));
    }

    #[test]
    fn test_open_missing_file() {
        let err = NwbReader::open("/nonexistent/session.nwb.json").unwrap_err();
        match err {
            Error::UnreadableContainer { path, source } => {
                assert!(path.ends_with("session.nwb.json"));
                assert!(matches!(*source, Error::FileNotFound(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
