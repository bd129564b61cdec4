//! The NWB object graph.
//!
//! Every object in a container is a [`Node`] shared as `Arc<Node>`. A node
//! has a closed [`NodeKind`] capability tag, an ordered [`FieldMap`] of named
//! fields, the list of children it owns, and a weak back-reference to its
//! owner. Fields may also alias nodes owned elsewhere.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use super::metadata::Attributes;
use super::storage::Dataset;
use super::time_axis::TimeAxis;
use crate::util::{Error, Result};

/// Name of the root container.
pub const ROOT_NAME: &str = "root";

// ============================================================================
// Node kinds
// ============================================================================

/// Flavor of a grouping node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    /// The file root.
    File,
    /// Plain grouping with no data of its own.
    Group,
    /// A processing module; its fields are its data interfaces.
    ProcessingModule,
    /// A data-bearing container (e.g. `LFP`, `Position`).
    DataInterface,
}

/// A time-indexed array with explicit timestamps or a fixed sampling rate.
#[derive(Clone, Debug)]
pub struct SignalStream {
    data: Dataset,
    time: TimeAxis,
    unit: Option<String>,
}

impl SignalStream {
    /// Pair data with a time axis.
    ///
    /// Explicit timestamps must match the leading dimension of `data`.
    pub fn new(data: Dataset, time: TimeAxis) -> Result<Self> {
        if let TimeAxis::Explicit(ts) = &time {
            let stamps = ts.len();
            if stamps != data.num_samples() {
                return Err(Error::InvalidTimeAxis(format!(
                    "{} timestamps for {} samples",
                    stamps,
                    data.num_samples()
                )));
            }
        }
        Ok(Self { data, time, unit: None })
    }

    /// Series stamped with one timestamp per sample.
    pub fn with_timestamps(data: Dataset, timestamps: Dataset) -> Result<Self> {
        Self::new(data, TimeAxis::explicit(timestamps)?)
    }

    /// Series sampled at `rate` Hz from `starting_time`.
    pub fn with_rate(data: Dataset, rate: f64, starting_time: f64) -> Result<Self> {
        Self::new(data, TimeAxis::uniform(rate, starting_time)?)
    }

    /// Set the unit of the data values.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// The value dataset; dimension 0 is time.
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// The time axis.
    pub fn time_axis(&self) -> &TimeAxis {
        &self.time
    }

    /// Unit of the data values.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

/// A series whose non-time dimensions are image frames.
#[derive(Clone, Debug)]
pub struct ImageStream {
    series: SignalStream,
    format: Option<String>,
    external_file: Option<String>,
}

impl ImageStream {
    /// Wrap a series holding frame data.
    pub fn new(series: SignalStream) -> Self {
        Self { series, format: None, external_file: None }
    }

    /// Set the storage format attribute (e.g. "raw", "external").
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the path of an external movie file.
    pub fn with_external_file(mut self, path: impl Into<String>) -> Self {
        self.external_file = Some(path.into());
        self
    }

    /// The underlying series.
    pub fn series(&self) -> &SignalStream {
        &self.series
    }

    /// Storage format attribute.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// External movie file, if frames live outside the container.
    pub fn external_file(&self) -> Option<&str> {
        self.external_file.as_deref()
    }
}

/// Capability tag of a node.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// A grouping node.
    Container(ContainerKind),
    /// A time series.
    Signal(SignalStream),
    /// An image series.
    Image(ImageStream),
    /// Any other object (devices, electrode groups, tables, ...).
    Other,
}

impl NodeKind {
    /// Data interfaces are the data-bearing nodes discovery collects.
    pub fn is_data_interface(&self) -> bool {
        matches!(
            self,
            Self::Signal(_) | Self::Image(_) | Self::Container(ContainerKind::DataInterface)
        )
    }

    /// The series view of signal and image nodes.
    pub fn as_signal(&self) -> Option<&SignalStream> {
        match self {
            Self::Signal(s) => Some(s),
            Self::Image(img) => Some(img.series()),
            _ => None,
        }
    }

    /// Short label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Container(ContainerKind::File) => "file",
            Self::Container(ContainerKind::Group) => "group",
            Self::Container(ContainerKind::ProcessingModule) => "module",
            Self::Container(ContainerKind::DataInterface) => "interface",
            Self::Signal(_) => "timeseries",
            Self::Image(_) => "image_series",
            Self::Other => "object",
        }
    }
}

// ============================================================================
// Fields
// ============================================================================

/// A named field value.
#[derive(Clone, Debug)]
pub enum Field {
    /// A node, owned by this node or aliased from elsewhere.
    Node(Arc<Node>),
    /// A nested mapping (e.g. `acquisition`).
    Map(FieldMap),
    /// Any other value (strings, numbers, ...).
    Value(serde_json::Value),
}

impl Field {
    /// The node, if this field holds one.
    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }

    /// The mapping, if this field holds one.
    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Insertion-ordered mapping of field names to fields.
#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    entries: Vec<(String, Field)>,
}

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing an existing one in place.
    pub fn insert(&mut self, key: impl Into<String>, field: Field) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = field,
            None => self.entries.push((key, field)),
        }
    }

    /// Get a field by name.
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    /// Get a mutable field by name.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    /// Check if a field exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.entries.iter().map(|(k, f)| (k.as_str(), f))
    }

    /// Iterate over field names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over field values.
    pub fn values(&self) -> impl Iterator<Item = &Field> {
        self.entries.iter().map(|(_, f)| f)
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Top-level groups
// ============================================================================

/// The named top-level groups of an NWB file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopLevelGroup {
    Acquisition,
    Analysis,
    Epochs,
    Processing,
    Stimulus,
}

impl TopLevelGroup {
    /// Path-segment names and their groups.
    pub const TABLE: [(&'static str, TopLevelGroup); 5] = [
        ("acquisition", Self::Acquisition),
        ("analysis", Self::Analysis),
        ("epochs", Self::Epochs),
        ("processing", Self::Processing),
        ("stimulus", Self::Stimulus),
    ];

    /// Look up a group by its path-segment name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::TABLE.iter().find(|(n, _)| *n == name).map(|(_, g)| *g)
    }

    /// Path-segment name, which is also the root field key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Acquisition => "acquisition",
            Self::Analysis => "analysis",
            Self::Epochs => "epochs",
            Self::Processing => "processing",
            Self::Stimulus => "stimulus",
        }
    }

    /// Name of the root accessor serving this group.
    pub fn accessor(self) -> &'static str {
        match self {
            Self::Processing => "modules",
            other => other.name(),
        }
    }
}

impl fmt::Display for TopLevelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// An object in the NWB graph.
pub struct Node {
    pub(crate) name: String,
    pub(crate) neurodata_type: Option<String>,
    pub(crate) kind: NodeKind,
    pub(crate) attributes: Attributes,
    pub(crate) fields: FieldMap,
    pub(crate) children: Vec<Arc<Node>>,
    /// Owner; set once when the owner is built.
    pub(crate) parent: OnceLock<Weak<Node>>,
}

impl Node {
    /// Name of this node (not a path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type tag (e.g. "ElectricalSeries").
    pub fn neurodata_type(&self) -> Option<&str> {
        self.neurodata_type.as_deref()
    }

    /// Check the declared type tag.
    pub fn is_type(&self, neurodata_type: &str) -> bool {
        self.neurodata_type() == Some(neurodata_type)
    }

    /// Capability tag.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// String attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// All named fields, owned and aliased.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Owned children, in field order.
    pub fn children(&self) -> &[Arc<Node>] {
        &self.children
    }

    /// The owning node, if it is still alive.
    pub fn parent(&self) -> Option<Arc<Node>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    /// Root containers carry the sentinel name [`ROOT_NAME`].
    pub fn is_root(&self) -> bool {
        self.name == ROOT_NAME
    }

    /// See [`NodeKind::is_data_interface`].
    pub fn is_data_interface(&self) -> bool {
        self.kind.is_data_interface()
    }

    /// Check if this node is a processing module.
    pub fn is_processing_module(&self) -> bool {
        matches!(self.kind, NodeKind::Container(ContainerKind::ProcessingModule))
    }

    /// Series view of signal and image nodes.
    pub fn as_signal(&self) -> Option<&SignalStream> {
        self.kind.as_signal()
    }

    /// Image view of image nodes.
    pub fn as_image(&self) -> Option<&ImageStream> {
        match &self.kind {
            NodeKind::Image(img) => Some(img),
            _ => None,
        }
    }

    /// The data-interfaces mapping, exposed only by processing modules.
    pub fn data_interfaces(&self) -> Option<&FieldMap> {
        if self.is_processing_module() {
            Some(&self.fields)
        } else {
            None
        }
    }

    // ========================================================================
    // Top-level accessors (meaningful on the root)
    // ========================================================================

    /// The `acquisition` group.
    pub fn acquisition(&self) -> Option<&Field> {
        self.fields.get(TopLevelGroup::Acquisition.name())
    }

    /// The `analysis` group.
    pub fn analysis(&self) -> Option<&Field> {
        self.fields.get(TopLevelGroup::Analysis.name())
    }

    /// The `epochs` table.
    pub fn epochs(&self) -> Option<&Field> {
        self.fields.get(TopLevelGroup::Epochs.name())
    }

    /// The processing modules, stored under `processing`.
    pub fn modules(&self) -> Option<&Field> {
        self.fields.get(TopLevelGroup::Processing.name())
    }

    /// The `stimulus` group.
    pub fn stimulus(&self) -> Option<&Field> {
        self.fields.get(TopLevelGroup::Stimulus.name())
    }

    /// Dispatch to the accessor serving `group`.
    pub fn top_level_group(&self, group: TopLevelGroup) -> Option<&Field> {
        match group {
            TopLevelGroup::Acquisition => self.acquisition(),
            TopLevelGroup::Analysis => self.analysis(),
            TopLevelGroup::Epochs => self.epochs(),
            TopLevelGroup::Processing => self.modules(),
            TopLevelGroup::Stimulus => self.stimulus(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("neurodata_type", &self.neurodata_type)
            .field("kind", &self.kind.label())
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_order() {
        let mut map = FieldMap::new();
        map.insert("b", Field::Value(1.into()));
        map.insert("a", Field::Value(2.into()));
        map.insert("b", Field::Value(3.into()));

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(matches!(map.get("b"), Some(Field::Value(v)) if v == 3));
        assert!(map.get("c").is_none());
    }

    #[test]
    fn test_top_level_table() {
        assert_eq!(TopLevelGroup::from_name("processing"), Some(TopLevelGroup::Processing));
        assert_eq!(TopLevelGroup::Processing.accessor(), "modules");
        assert_eq!(TopLevelGroup::Stimulus.accessor(), "stimulus");
        assert_eq!(TopLevelGroup::from_name("general"), None);
        for (name, group) in TopLevelGroup::TABLE {
            assert_eq!(group.name(), name);
        }
    }

    #[test]
    fn test_signal_checks_timestamp_count() {
        let data = Dataset::from_f64(vec![1.0, 2.0, 3.0]);
        assert!(SignalStream::with_timestamps(data.clone(), Dataset::from_f64(vec![0.0, 1.0])).is_err());
        let s = SignalStream::with_timestamps(data, Dataset::from_f64(vec![0.0, 1.0, 2.0])).unwrap();
        assert!(s.time_axis().is_explicit());
    }

    #[test]
    fn test_kind_capabilities() {
        let series = SignalStream::with_rate(Dataset::from_f64(vec![0.0]), 10.0, 0.0).unwrap();
        let image = NodeKind::Image(ImageStream::new(series.clone()));
        assert!(image.is_data_interface());
        assert!(image.as_signal().is_some());
        assert!(NodeKind::Container(ContainerKind::DataInterface).is_data_interface());
        assert!(!NodeKind::Container(ContainerKind::ProcessingModule).is_data_interface());
        assert!(!NodeKind::Other.is_data_interface());
        assert!(NodeKind::Other.as_signal().is_none());
    }
}
