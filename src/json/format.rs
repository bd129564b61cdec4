//! Document schema of the JSON container format.
//!
//! ```text
//! { "format": "nwb-json", "version": 1, "root": <node> }
//!
//! <node>    = { "neurodata_type": str|null, "kind": <kind>, "name": str,
//!               "attributes": {..}, "fields": { key: <field>, .. },
//!               "data": <dataset>, "timestamps": <dataset>,
//!               "rate": f64, "starting_time": f64, "unit": str,
//!               "format": str, "external_file": str }
//! <field>   = <node> | { "$link": "/path/to/node" } | { key: <field>, .. } | any other JSON value
//! <dataset> = [numbers..] | { "dtype": str, "shape": [..], "values": [..] }
//!           | { "dtype": str, "shape": [..], "external": { "file": str, "offset": u64, "compression": str } }
//! ```
//!
//! An object is a node when it has a `neurodata_type` key (which may be null).

use serde::Deserialize;
use serde_json::{Map, Value};

/// Format name expected in the `format` key.
pub const FORMAT_NAME: &str = "nwb-json";

/// Highest document version this reader understands.
pub const FORMAT_VERSION: u32 = 1;

/// Key that marks an object as a node.
pub const NODE_MARKER: &str = "neurodata_type";

/// Key of a link object.
pub const LINK_KEY: &str = "$link";

fn default_format() -> String {
    FORMAT_NAME.to_string()
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

fn default_dtype() -> String {
    "float64".to_string()
}

/// Top-level document.
#[derive(Debug, Deserialize)]
pub struct DocumentJson {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub root: Value,
}

/// Node kinds as spelled in documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindJson {
    File,
    Group,
    Module,
    Interface,
    Timeseries,
    ImageSeries,
    Object,
}

/// A node object. `fields` keeps document order.
#[derive(Debug, Deserialize)]
pub struct NodeJson {
    #[serde(default)]
    pub name: Option<String>,
    pub neurodata_type: Option<String>,
    #[serde(default)]
    pub kind: Option<KindJson>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub data: Option<DatasetJson>,
    #[serde(default)]
    pub timestamps: Option<DatasetJson>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub starting_time: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub external_file: Option<String>,
}

/// A dataset: either a bare list of numbers or a full description.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DatasetJson {
    /// One-dimensional float64 values; `null` stands for NaN.
    Values(Vec<Option<f64>>),
    Full(FullDatasetJson),
}

/// Dataset with explicit dtype and shape.
#[derive(Debug, Deserialize)]
pub struct FullDatasetJson {
    #[serde(default = "default_dtype")]
    pub dtype: String,
    #[serde(default)]
    pub shape: Option<Vec<usize>>,
    /// Row-major flattened values; `null` stands for NaN.
    #[serde(default)]
    pub values: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub external: Option<ExternalJson>,
}

/// Elements stored in an external file.
#[derive(Debug, Deserialize)]
pub struct ExternalJson {
    pub file: String,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub compression: Option<String>,
}

/// What an object in a `fields` mapping stands for.
pub enum FieldShape {
    Node,
    Link(String),
    Map,
    Value,
}

/// Classify a field value.
pub fn classify(value: &Value) -> FieldShape {
    match value {
        Value::Object(map) if map.contains_key(NODE_MARKER) => FieldShape::Node,
        Value::Object(map) if map.len() == 1 => match map.get(LINK_KEY) {
            Some(Value::String(target)) => FieldShape::Link(target.clone()),
            _ => FieldShape::Map,
        },
        Value::Object(_) => FieldShape::Map,
        _ => FieldShape::Value,
    }
}
