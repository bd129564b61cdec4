//! Locating nodes in the hierarchy.
//!
//! Two independent strategies exist and may disagree for aliased nodes:
//! - [`resolve_path`] searches the field graph from the root, so it also
//!   finds nodes attached where no parent pointer leads.
//! - [`ancestor_chain`] follows parent pointers upward; cheaper, but only
//!   sees the owning path.

use std::sync::Arc;

use crate::core::{Field, FieldMap, Node};

/// Find the field keys leading from `fields` to the mapping that holds `target`.
///
/// Returns the keys in root-to-target order, not including the target's own
/// key, or `None` when `target` is unreachable. A node counts as found only
/// when a mapping holds it under its own name and it is the same node
/// (pointer identity). Nodes expose their data-interfaces mapping if they
/// have one, otherwise their fields. When a node is reachable along several
/// paths, the first in field order wins.
pub fn resolve_path(fields: &FieldMap, target: &Arc<Node>) -> Option<Vec<String>> {
    let mut path = Vec::new();
    search_map(fields, target, &mut path).then_some(path)
}

fn search_map(map: &FieldMap, target: &Arc<Node>, path: &mut Vec<String>) -> bool {
    if let Some(Field::Node(node)) = map.get(target.name()) {
        if Arc::ptr_eq(node, target) {
            return true;
        }
    }

    for (key, field) in map.iter() {
        path.push(key.to_string());
        if search_field(field, target, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn search_field(field: &Field, target: &Arc<Node>, path: &mut Vec<String>) -> bool {
    match field {
        Field::Node(node) => {
            let map = node.data_interfaces().unwrap_or_else(|| node.fields());
            search_map(map, target, path)
        }
        Field::Map(map) => search_map(map, target, path),
        Field::Value(_) => false,
    }
}

/// Names from the outermost non-root ancestor down to `node` itself.
///
/// Walks parent pointers until the root (or a node without a live parent).
/// When the outermost ancestor is a processing module, `"processing"` is
/// prepended so the chain reads like a field path.
pub fn ancestor_chain(node: &Arc<Node>) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = Some(Arc::clone(node));

    while let Some(n) = current {
        if n.is_root() {
            break;
        }
        current = n.parent();
        chain.push(n);
    }
    chain.reverse();

    let mut names: Vec<String> = chain.iter().map(|n| n.name().to_string()).collect();
    if chain.first().is_some_and(|n| n.is_processing_module()) {
        names.insert(0, "processing".to_string());
    }
    names
}
