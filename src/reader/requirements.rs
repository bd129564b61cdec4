//! Requirement strings and their evaluation.
//!
//! A requirement is either a bare neurodata type (`"ElectricalSeries"`),
//! satisfied by any discovered data interface of that type, or a dotted
//! structural path (`"acquisition.ElectricalSeries"`,
//! `"processing.ecephys.LFP"`) evaluated from a top-level group.

use std::fmt;
use std::sync::Arc;

use crate::core::{Field, FieldMap, Node, TopLevelGroup};

/// A parsed requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// `group.[segment.]*Type`. `path` holds every segment after the group;
    /// its last element is the wanted type.
    Structural { group: String, path: Vec<String> },
    /// A neurodata type anywhere among the data interfaces.
    DataInterface(String),
}

impl Requirement {
    /// Parse a requirement string. Any string containing `.` is structural.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((group, rest)) => Self::Structural {
                group: group.to_string(),
                path: rest.split('.').map(str::to_string).collect(),
            },
            None => Self::DataInterface(text.to_string()),
        }
    }

    /// The top-level group a structural requirement starts from, if known.
    pub fn top_level_group(&self) -> Option<TopLevelGroup> {
        match self {
            Self::Structural { group, .. } => TopLevelGroup::from_name(group),
            Self::DataInterface(_) => None,
        }
    }

    /// Evaluate against `root` and its discovered data interfaces.
    pub fn is_satisfied(&self, root: &Node, data_interfaces: &[Arc<Node>]) -> bool {
        match self {
            Self::DataInterface(ty) => data_interfaces.iter().any(|n| n.is_type(ty)),
            Self::Structural { group, path } => {
                let Some(top) = TopLevelGroup::from_name(group) else {
                    tracing::warn!(group = %group, requirement = %self, "unknown top-level group");
                    return false;
                };
                let Some(start) = root.top_level_group(top).and_then(Candidate::from_field) else {
                    tracing::debug!(group = %group, "top-level group absent");
                    return false;
                };
                structural_match(start, path)
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural { group, path } => write!(f, "{}.{}", group, path.join(".")),
            Self::DataInterface(ty) => f.write_str(ty),
        }
    }
}

/// A node or mapping on the search frontier.
#[derive(Clone, Copy)]
enum Candidate<'a> {
    Node(&'a Node),
    Map(&'a FieldMap),
}

impl<'a> Candidate<'a> {
    fn from_field(field: &'a Field) -> Option<Self> {
        match field {
            Field::Node(node) => Some(Self::Node(node.as_ref())),
            Field::Map(map) => Some(Self::Map(map)),
            Field::Value(_) => None,
        }
    }

    /// Mappings step into their values, nodes into their owned children.
    fn expand(self, out: &mut Vec<Candidate<'a>>) {
        match self {
            Self::Map(map) => out.extend(map.values().filter_map(Candidate::from_field)),
            Self::Node(node) => out.extend(node.children().iter().map(|c| Self::Node(c.as_ref()))),
        }
    }

    fn holds_type(self, neurodata_type: &str) -> bool {
        match self {
            Self::Map(map) => map
                .values()
                .filter_map(Field::as_node)
                .any(|n| n.is_type(neurodata_type)),
            Self::Node(node) => node.children().iter().any(|c| c.is_type(neurodata_type)),
        }
    }
}

/// Expand the frontier once per intermediate segment, then look for the type.
///
/// Intermediate segment names are not matched: every level is expanded
/// wholesale, so `processing.ecephys.LFP` accepts an `LFP` in any module.
fn structural_match(start: Candidate<'_>, path: &[String]) -> bool {
    let Some((target, intermediate)) = path.split_last() else {
        return false;
    };

    let mut frontier = vec![start];
    for _ in intermediate {
        let mut next = Vec::new();
        for candidate in frontier {
            candidate.expand(&mut next);
        }
        if next.is_empty() {
            return false;
        }
        frontier = next;
    }
    frontier.into_iter().any(|c| c.holds_type(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dataset, NodeBuilder, SignalStream};

    fn series(name: &str, ty: &str) -> Arc<Node> {
        let stream = SignalStream::with_rate(Dataset::from_f64(vec![0.0]), 1.0, 0.0).unwrap();
        NodeBuilder::signal(name, ty, stream).build()
    }

    fn root() -> Arc<Node> {
        let lfp = NodeBuilder::interface("LFP", "LFP")
            .child(series("lfp", "ElectricalSeries"))
            .build();
        let ecephys = NodeBuilder::module("ecephys").child(lfp).build();
        let behavior = NodeBuilder::module("behavior")
            .child(NodeBuilder::interface("Position", "Position").build())
            .build();
        NodeBuilder::file()
            .child_in("acquisition", series("series_0", "ElectricalSeries"))
            .child_in("processing", ecephys)
            .child_in("processing", behavior)
            .build()
    }

    fn check(root: &Node, text: &str) -> bool {
        let interfaces = crate::reader::discovery::discover(root);
        Requirement::parse(text).is_satisfied(root, &interfaces)
    }

    #[test]
    fn test_parse() {
        assert_eq!(Requirement::parse("LFP"), Requirement::DataInterface("LFP".into()));
        assert_eq!(
            Requirement::parse("processing.ecephys.LFP"),
            Requirement::Structural {
                group: "processing".into(),
                path: vec!["ecephys".into(), "LFP".into()],
            }
        );
        assert_eq!(Requirement::parse("processing.ecephys.LFP").to_string(), "processing.ecephys.LFP");
        assert_eq!(
            Requirement::parse("processing.x").top_level_group(),
            Some(TopLevelGroup::Processing)
        );
    }

    #[test]
    fn test_bare_type() {
        let root = root();
        assert!(check(&root, "ElectricalSeries"));
        assert!(check(&root, "Position"));
        assert!(!check(&root, "ImageSeries"));
    }

    #[test]
    fn test_structural() {
        let root = root();
        assert!(check(&root, "acquisition.ElectricalSeries"));
        assert!(!check(&root, "acquisition.LFP"));
        assert!(check(&root, "processing.ecephys.LFP"));
        // intermediate names are expanded, not matched
        assert!(check(&root, "processing.anything.Position"));
        assert!(check(&root, "processing.ecephys.LFP.ElectricalSeries"));
        assert!(!check(&root, "processing.ecephys.LFP.Position"));
    }

    #[test]
    fn test_absent_or_unknown_group() {
        let root = root();
        assert!(!check(&root, "stimulus.ElectricalSeries"));
        assert!(!check(&root, "bogus.ElectricalSeries"));
        assert!(!check(&root, "acquisition."));
    }

    #[test]
    fn test_frontier_runs_dry() {
        let root = NodeBuilder::file()
            .field("acquisition", Field::Map(FieldMap::new()))
            .build();
        assert!(!check(&root, "acquisition.x.ElectricalSeries"));
    }
}
