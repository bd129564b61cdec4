//! Building the node graph from a JSON container document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::format::*;
use crate::core::{
    ArrayBuffer, Compression, ContainerKind, ContainerSource, Dataset, ExternalStorage, Field, FieldMap,
    ImageStream, LoadOptions, MappedFileCache, Node, NodeBuilder, NodeKind, SignalStream, ROOT_NAME,
};
use crate::util::{ElementType, Error, Result, Shape};

/// [`ContainerSource`] for `.nwb.json` documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSource;

impl ContainerSource for JsonSource {
    fn format_name(&self) -> &str {
        FORMAT_NAME
    }

    fn open(&self, path: &Path, options: &LoadOptions) -> Result<Arc<Node>> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "parsing container document");
        load_str(&text, &options.base_dir_for(path), options)
    }
}

/// Build a graph from document text. Relative external files resolve against `base_dir`.
pub fn load_str(text: &str, base_dir: &Path, options: &LoadOptions) -> Result<Arc<Node>> {
    let doc: DocumentJson = serde_json::from_str(text)?;
    load_document(doc, base_dir, options)
}

/// Build a graph from a parsed document.
pub fn load_document(doc: DocumentJson, base_dir: &Path, options: &LoadOptions) -> Result<Arc<Node>> {
    if doc.format != FORMAT_NAME {
        return Err(Error::invalid(format!("unknown container format '{}'", doc.format)));
    }
    if doc.version > FORMAT_VERSION {
        return Err(Error::invalid(format!("unsupported document version {}", doc.version)));
    }
    if !matches!(classify(&doc.root), FieldShape::Node) {
        return Err(Error::invalid("document root is not a node"));
    }

    let mut loader = Loader {
        base_dir: base_dir.to_path_buf(),
        cache: options.mmap_enabled().then(|| Arc::new(MappedFileCache::new())),
        built: HashMap::new(),
    };
    let root = loader.build_node("/", ROOT_NAME, doc.root)?;
    if !root.is_root() {
        return Err(Error::invalid(format!("root node must be named '{}', got '{}'", ROOT_NAME, root.name())));
    }
    tracing::debug!(nodes = loader.built.len(), "container graph built");
    Ok(root)
}

/// Join a field key onto a node path.
fn join(path: &str, key: &str) -> String {
    if path == "/" {
        format!("/{}", key)
    } else {
        format!("{}/{}", path, key)
    }
}

/// Normalize a link target to the registry's path form.
fn normalize(target: &str) -> String {
    let trimmed = target.trim_matches('/');
    format!("/{}", trimmed)
}

struct Loader {
    base_dir: PathBuf,
    cache: Option<Arc<MappedFileCache>>,
    /// Every node built so far, by field path. Links resolve against this.
    built: HashMap<String, Arc<Node>>,
}

impl Loader {
    fn build_node(&mut self, path: &str, default_name: &str, value: Value) -> Result<Arc<Node>> {
        let desc: NodeJson = serde_json::from_value(value)
            .map_err(|e| Error::invalid(format!("{}: {}", path, e)))?;
        let kind = self.node_kind(path, &desc)?;
        let name = desc.name.clone().unwrap_or_else(|| default_name.to_string());
        tracing::trace!(path, name = %name, kind = kind.label(), "building node");

        let mut builder = NodeBuilder::new(name, kind);
        if let Some(ty) = desc.neurodata_type {
            builder = builder.neurodata_type(ty);
        }
        for (key, value) in desc.attributes {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            builder = builder.attribute(key, value);
        }

        let mut owned = Vec::new();
        for (key, value) in desc.fields {
            let field = self.build_field(&join(path, &key), &key, value, &mut owned)?;
            builder = builder.field(key, field);
        }
        for child in owned {
            builder = builder.adopt(child);
        }

        let node = builder.build();
        self.built.insert(path.to_string(), Arc::clone(&node));
        Ok(node)
    }

    fn build_field(&mut self, path: &str, key: &str, value: Value, owned: &mut Vec<Arc<Node>>) -> Result<Field> {
        match classify(&value) {
            FieldShape::Node => {
                let node = self.build_node(path, key, value)?;
                owned.push(Arc::clone(&node));
                Ok(Field::Node(node))
            }
            FieldShape::Link(target) => {
                let target = normalize(&target);
                match self.built.get(&target) {
                    Some(node) => Ok(Field::Node(Arc::clone(node))),
                    None => Err(Error::UnresolvedLink(format!("{} -> {}", path, target))),
                }
            }
            FieldShape::Map => {
                let Value::Object(entries) = value else {
                    return Err(Error::invalid(format!("{}: expected an object", path)));
                };
                let mut map = FieldMap::new();
                for (k, v) in entries {
                    let field = self.build_field(&join(path, &k), &k, v, owned)?;
                    map.insert(k, field);
                }
                Ok(Field::Map(map))
            }
            FieldShape::Value => Ok(Field::Value(value)),
        }
    }

    fn node_kind(&self, path: &str, desc: &NodeJson) -> Result<NodeKind> {
        let kind = match desc.kind {
            Some(kind) => kind,
            None if path == "/" => KindJson::File,
            None if desc.data.is_some() => KindJson::Timeseries,
            None => KindJson::Object,
        };
        Ok(match kind {
            KindJson::File => NodeKind::Container(ContainerKind::File),
            KindJson::Group => NodeKind::Container(ContainerKind::Group),
            KindJson::Module => NodeKind::Container(ContainerKind::ProcessingModule),
            KindJson::Interface => NodeKind::Container(ContainerKind::DataInterface),
            KindJson::Timeseries => NodeKind::Signal(self.signal(path, desc)?),
            KindJson::ImageSeries => {
                let mut image = ImageStream::new(self.signal(path, desc)?);
                if let Some(format) = &desc.format {
                    image = image.with_format(format.as_str());
                }
                if let Some(file) = &desc.external_file {
                    image = image.with_external_file(file.as_str());
                }
                NodeKind::Image(image)
            }
            KindJson::Object => NodeKind::Other,
        })
    }

    fn signal(&self, path: &str, desc: &NodeJson) -> Result<SignalStream> {
        let data = match &desc.data {
            Some(data) => self.dataset(path, data)?,
            None => return Err(Error::invalid(format!("{}: series has no data", path))),
        };

        let series = match (&desc.timestamps, desc.rate) {
            (Some(ts), _) => SignalStream::with_timestamps(data, self.dataset(path, ts)?),
            (None, Some(rate)) => SignalStream::with_rate(data, rate, desc.starting_time.unwrap_or(0.0)),
            (None, None) => {
                return Err(Error::InvalidTimeAxis(format!("{}: neither timestamps nor rate", path)));
            }
        }
        .map_err(|e| match e {
            Error::InvalidTimeAxis(msg) => Error::InvalidTimeAxis(format!("{}: {}", path, msg)),
            other => other,
        })?;

        Ok(match &desc.unit {
            Some(unit) => series.with_unit(unit.as_str()),
            None => series,
        })
    }

    fn dataset(&self, path: &str, desc: &DatasetJson) -> Result<Dataset> {
        let full = match desc {
            DatasetJson::Values(values) => {
                return inline_dataset(path, ElementType::Float64, None, values);
            }
            DatasetJson::Full(full) => full,
        };

        let dtype = ElementType::from_name(&full.dtype)
            .ok_or_else(|| Error::invalid(format!("{}: unknown dtype '{}'", path, full.dtype)))?;

        match (&full.values, &full.external) {
            (Some(values), None) => inline_dataset(path, dtype, full.shape.as_deref(), values),
            (None, Some(ext)) => {
                let shape = full
                    .shape
                    .as_deref()
                    .ok_or_else(|| Error::invalid(format!("{}: external dataset needs a shape", path)))?;
                let compression = match &ext.compression {
                    Some(name) => Compression::from_name(name)
                        .ok_or_else(|| Error::invalid(format!("{}: unknown compression '{}'", path, name)))?,
                    None => Compression::None,
                };
                let mut storage = ExternalStorage::new(self.base_dir.join(&ext.file), ext.offset)
                    .with_compression(compression);
                if let Some(cache) = &self.cache {
                    storage = storage.with_cache(Arc::clone(cache));
                }
                Dataset::external(shape, dtype, storage)
                    .map_err(|e| Error::invalid(format!("{}: {}", path, e)))
            }
            (Some(_), Some(_)) => Err(Error::invalid(format!("{}: dataset has both values and external", path))),
            (None, None) => Err(Error::invalid(format!("{}: dataset has no values", path))),
        }
    }
}

fn inline_dataset(path: &str, dtype: ElementType, shape: Option<&[usize]>, values: &[Option<f64>]) -> Result<Dataset> {
    let numbers = values
        .iter()
        .map(|v| match v {
            Some(x) => Ok(*x),
            None if dtype.is_float() => Ok(f64::NAN),
            None => Err(Error::TypeMismatch {
                expected: dtype.to_string(),
                actual: "null".into(),
            }),
        })
        .collect::<Result<Vec<f64>>>()?;
    let shape = match shape {
        Some(dims) => Shape::from_slice(dims),
        None => Shape::d1(numbers.len()),
    };
    Dataset::inline(shape, ArrayBuffer::from_f64_values(dtype, &numbers))
        .map_err(|e| Error::invalid(format!("{}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(doc: Value) -> Result<Arc<Node>> {
        load_str(&doc.to_string(), Path::new("."), &LoadOptions::default())
    }

    #[test]
    fn test_minimal_document() {
        let root = load(json!({"root": {"neurodata_type": "NWBFile"}})).unwrap();
        assert!(root.is_root());
        assert!(matches!(root.kind(), NodeKind::Container(ContainerKind::File)));
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_children_and_parents() {
        let root = load(json!({"root": {
            "neurodata_type": "NWBFile",
            "fields": {
                "acquisition": {
                    "series_0": {"neurodata_type": "TimeSeries", "data": [1, 2, 3], "rate": 10.0}
                },
                "session_description": "test session"
            }
        }}))
        .unwrap();

        assert_eq!(root.children().len(), 1);
        let series = &root.children()[0];
        assert_eq!(series.name(), "series_0");
        assert!(series.as_signal().is_some());
        assert!(Arc::ptr_eq(&series.parent().unwrap(), &root));
        assert!(matches!(root.fields().get("session_description"), Some(Field::Value(_))));
    }

    #[test]
    fn test_links_alias_without_owning() {
        let root = load(json!({"root": {
            "neurodata_type": "NWBFile",
            "fields": {
                "acquisition": {"a": {"neurodata_type": "TimeSeries", "data": [1.0], "rate": 1.0}},
                "analysis": {"alias": {"$link": "/acquisition/a"}}
            }
        }}))
        .unwrap();

        assert_eq!(root.children().len(), 1);
        let acq = root.acquisition().and_then(Field::as_map).unwrap();
        let ana = root.analysis().and_then(Field::as_map).unwrap();
        let a = acq.get("a").and_then(Field::as_node).unwrap();
        let alias = ana.get("alias").and_then(Field::as_node).unwrap();
        assert!(Arc::ptr_eq(a, alias));
    }

    #[test]
    fn test_forward_link_rejected() {
        let err = load(json!({"root": {
            "neurodata_type": "NWBFile",
            "fields": {
                "analysis": {"alias": {"$link": "/acquisition/a"}},
                "acquisition": {"a": {"neurodata_type": "TimeSeries", "data": [1.0], "rate": 1.0}}
            }
        }}))
        .unwrap_err();
        assert!(matches!(err, Error::UnresolvedLink(_)));
    }

    #[test]
    fn test_series_validation() {
        let no_axis = load(json!({"root": {"neurodata_type": "NWBFile", "fields": {
            "s": {"neurodata_type": "TimeSeries", "data": [1.0]}
        }}}));
        assert!(matches!(no_axis, Err(Error::InvalidTimeAxis(msg)) if msg.contains("/s")));

        let bad_count = load(json!({"root": {"neurodata_type": "NWBFile", "fields": {
            "s": {"neurodata_type": "TimeSeries", "data": [1.0, 2.0], "timestamps": [0.0]}
        }}}));
        assert!(matches!(bad_count, Err(Error::InvalidTimeAxis(_))));

        let null_int = load(json!({"root": {"neurodata_type": "NWBFile", "fields": {
            "s": {"neurodata_type": "TimeSeries", "rate": 1.0, "data": {"dtype": "int32", "values": [1, null]}}
        }}}));
        assert!(matches!(null_int, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_overflowing_shapes() {
        let inline = load(json!({"root": {"neurodata_type": "NWBFile", "fields": {
            "s": {"neurodata_type": "TimeSeries", "rate": 1.0,
                  "data": {"dtype": "float64", "shape": [8589934592u64, 8589934592u64], "values": []}}
        }}}));
        assert!(matches!(inline, Err(Error::InvalidStructure(msg)) if msg.contains("/s")));

        let external = load(json!({"root": {"neurodata_type": "NWBFile", "fields": {
            "s": {"neurodata_type": "TimeSeries", "rate": 1.0,
                  "data": {"dtype": "float64", "shape": [8589934592u64, 8589934592u64], "external": {"file": "x.bin"}}}
        }}}));
        assert!(matches!(external, Err(Error::InvalidStructure(msg)) if msg.contains("/s")));
    }

    #[test]
    fn test_rejects_foreign_documents() {
        assert!(load(json!({"format": "zarr", "root": {"neurodata_type": "NWBFile"}})).is_err());
        assert!(load(json!({"version": 99, "root": {"neurodata_type": "NWBFile"}})).is_err());
        assert!(load(json!({"root": {"neurodata_type": "NWBFile", "name": "session"}})).is_err());
        assert!(load(json!({"root": [1, 2, 3]})).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = JsonSource.open(Path::new("/nonexistent/session.nwb.json"), &LoadOptions::default());
        assert!(matches!(err, Err(Error::FileNotFound(_))));
    }
}
