//! Data-interface discovery and classification.

use std::sync::Arc;

use crate::core::Node;

/// Collect every data interface below `root`, depth-first, parents before children.
///
/// Every child is descended into whether or not it was collected: a data
/// interface may itself hold further data interfaces. Order follows child
/// order and is not sorted.
pub fn discover(root: &Node) -> Vec<Arc<Node>> {
    let mut found = Vec::new();
    let mut stack: Vec<&Arc<Node>> = root.children().iter().rev().collect();

    while let Some(node) = stack.pop() {
        if node.is_data_interface() {
            tracing::trace!(name = node.name(), neurodata_type = ?node.neurodata_type(), "data interface");
            found.push(Arc::clone(node));
        }
        stack.extend(node.children().iter().rev());
    }
    found
}

/// Keep the time series (signal and image series) of `nodes`, in order.
pub fn signals_of(nodes: &[Arc<Node>]) -> Vec<Arc<Node>> {
    nodes.iter().filter(|n| n.as_signal().is_some()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dataset, NodeBuilder, SignalStream};

    fn series(name: &str, ty: &str) -> Arc<Node> {
        let stream = SignalStream::with_rate(Dataset::from_f64(vec![0.0, 1.0]), 1.0, 0.0).unwrap();
        NodeBuilder::signal(name, ty, stream).build()
    }

    fn names(nodes: &[Arc<Node>]) -> Vec<&str> {
        nodes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn test_empty_root() {
        let root = NodeBuilder::file().build();
        assert!(discover(&root).is_empty());

        let root = NodeBuilder::file()
            .child(NodeBuilder::other("probe", "Device").build())
            .build();
        assert!(discover(&root).is_empty());
    }

    #[test]
    fn test_depth_first_parent_first() {
        let lfp = NodeBuilder::interface("LFP", "LFP")
            .child(series("lfp_series", "ElectricalSeries"))
            .build();
        let module = NodeBuilder::module("ecephys").child(lfp).build();
        let root = NodeBuilder::file()
            .child_in("acquisition", series("zeta", "ElectricalSeries"))
            .child_in("processing", module)
            .child_in("acquisition", series("alpha", "TimeSeries"))
            .build();

        let found = discover(&root);
        // modules are not data interfaces, but are descended into
        assert_eq!(names(&found), vec!["zeta", "LFP", "lfp_series", "alpha"]);

        let signals = signals_of(&found);
        assert_eq!(names(&signals), vec!["zeta", "lfp_series", "alpha"]);
    }
}
