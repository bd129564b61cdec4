//! Building node graphs.
//!
//! Graphs are built bottom-up: children first, then their owner. Building
//! the owner wires each child's parent back-reference.
//!
//! ```ignore
//! let series = NodeBuilder::signal("series_0", "ElectricalSeries", stream).build();
//! let root = NodeBuilder::file().child_in("acquisition", series).build();
//! ```

use std::sync::{Arc, OnceLock};

use super::metadata::Attributes;
use super::node::{ContainerKind, Field, FieldMap, ImageStream, Node, NodeKind, SignalStream, ROOT_NAME};

/// Builder for a single [`Node`].
#[derive(Debug)]
pub struct NodeBuilder {
    name: String,
    neurodata_type: Option<String>,
    kind: NodeKind,
    attributes: Attributes,
    fields: FieldMap,
    children: Vec<Arc<Node>>,
}

impl NodeBuilder {
    /// Start a node with the given name and kind.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            neurodata_type: None,
            kind,
            attributes: Attributes::new(),
            fields: FieldMap::new(),
            children: Vec::new(),
        }
    }

    /// The file root, named [`ROOT_NAME`].
    pub fn file() -> Self {
        Self::new(ROOT_NAME, NodeKind::Container(ContainerKind::File)).neurodata_type("NWBFile")
    }

    /// A plain grouping node.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Container(ContainerKind::Group))
    }

    /// A processing module.
    pub fn module(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Container(ContainerKind::ProcessingModule)).neurodata_type("ProcessingModule")
    }

    /// A data-bearing container.
    pub fn interface(name: impl Into<String>, neurodata_type: &str) -> Self {
        Self::new(name, NodeKind::Container(ContainerKind::DataInterface)).neurodata_type(neurodata_type)
    }

    /// A time series.
    pub fn signal(name: impl Into<String>, neurodata_type: &str, series: SignalStream) -> Self {
        Self::new(name, NodeKind::Signal(series)).neurodata_type(neurodata_type)
    }

    /// An image series.
    pub fn image(name: impl Into<String>, neurodata_type: &str, image: ImageStream) -> Self {
        Self::new(name, NodeKind::Image(image)).neurodata_type(neurodata_type)
    }

    /// Any other typed object.
    pub fn other(name: impl Into<String>, neurodata_type: &str) -> Self {
        Self::new(name, NodeKind::Other).neurodata_type(neurodata_type)
    }

    /// Set the declared type tag.
    pub fn neurodata_type(mut self, neurodata_type: impl Into<String>) -> Self {
        self.neurodata_type = Some(neurodata_type.into());
        self
    }

    /// Set a string attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Set a field without taking ownership of any node inside it.
    pub fn field(mut self, key: impl Into<String>, field: Field) -> Self {
        self.fields.insert(key, field);
        self
    }

    /// Set a plain value field.
    pub fn value(self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.field(key, Field::Value(value.into()))
    }

    /// Alias a node owned elsewhere under `key`.
    pub fn link(self, key: impl Into<String>, node: Arc<Node>) -> Self {
        self.field(key, Field::Node(node))
    }

    /// Take ownership of `node` without adding a field for it.
    pub fn adopt(mut self, node: Arc<Node>) -> Self {
        self.children.push(node);
        self
    }

    /// Own `node` and expose it as a field under its own name.
    pub fn child(self, node: Arc<Node>) -> Self {
        let key = node.name().to_string();
        self.field(key, Field::Node(Arc::clone(&node))).adopt(node)
    }

    /// Own `node` and expose it inside the mapping field `key`, created on demand.
    ///
    /// This is how nodes land in top-level groups such as `acquisition`.
    pub fn child_in(mut self, key: &str, node: Arc<Node>) -> Self {
        let entry = Field::Node(Arc::clone(&node));
        match self.fields.get_mut(key) {
            Some(Field::Map(map)) => map.insert(node.name(), entry),
            _ => {
                let mut map = FieldMap::new();
                map.insert(node.name(), entry);
                self.fields.insert(key, Field::Map(map));
            }
        }
        self.adopt(node)
    }

    /// Finish the node and point every owned child back at it.
    ///
    /// A node has at most one owner: a child already owned elsewhere keeps
    /// its first parent.
    pub fn build(self) -> Arc<Node> {
        Arc::new_cyclic(|weak| {
            for child in &self.children {
                if child.parent.set(weak.clone()).is_err() {
                    tracing::trace!(child = child.name(), owner = %self.name, "child already has an owner");
                }
            }
            Node {
                name: self.name,
                neurodata_type: self.neurodata_type,
                kind: self.kind,
                attributes: self.attributes,
                fields: self.fields,
                children: self.children,
                parent: OnceLock::new(),
            }
        })
    }
}
