//! Per-terminal label encodings: for every token, the labels on its way up
//! to the root of a graph or of the minimal subtree around two entities.

use crate::error::PathError;
use crate::graph::DepGraph;
use crate::render::dependency_representation;
use std::collections::BTreeMap;

/// Dependency representation of each terminal's path to the root, leaving
/// out the terminal's own edge. Keyed by 1-based token position; terminals
/// without a position are skipped.
pub fn terminal_encodings<F>(
    graph: &DepGraph,
    terminals: &[String],
    position: F,
) -> Result<BTreeMap<usize, String>, PathError>
where
    F: Fn(&str) -> Option<usize>,
{
    let root = graph.root()?;
    let mut encodings = BTreeMap::new();
    for terminal in terminals {
        let Some(at) = position(terminal) else {
            continue;
        };
        let steps = graph.undirected_steps(terminal, root)?;
        let encoding = steps
            .get(1..)
            .map(dependency_representation)
            .unwrap_or_default();
        encodings.insert(at, encoding);
    }
    Ok(encodings)
}

/// [`terminal_encodings`] inside the subtree with the fewest terminals that
/// still contains both anchors.
pub fn min_subtree_encodings<F>(
    graph: &DepGraph,
    one: &str,
    another: &str,
    position: F,
) -> Result<BTreeMap<usize, String>, PathError>
where
    F: Fn(&str) -> Option<usize>,
{
    let is_terminal = |id: &str| position(id).is_some();
    let subtree = graph.minimal_subgraph(one, another, is_terminal, |terminals, _, _| {
        terminals.len()
    })?;
    let terminals = subtree.terminals(is_terminal);
    terminal_encodings(&subtree, &terminals, &position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Link;
    use crate::node_id::{is_terminal, terminal_position};

    fn passage() -> DepGraph {
        DepGraph::new(vec![
            Link::new("1.2", "1.1", "H"),
            Link::new("1.3", "1.1", "H"),
            Link::new("1.4", "1.2", "C"),
            Link::new("0.1", "1.4", "A"),
            Link::new("0.2", "1.4", "E"),
            Link::new("0.3", "1.2", "P"),
            Link::new("0.4", "1.3", "P"),
        ])
    }

    #[test]
    fn test_terminal_encodings() {
        let graph = passage();
        let terminals = graph.terminals(is_terminal);
        let encodings = terminal_encodings(&graph, &terminals, terminal_position).unwrap();
        assert_eq!(
            encodings,
            BTreeMap::from([
                (1, "CH".to_string()),
                (2, "CH".to_string()),
                (3, "H".to_string()),
                (4, "H".to_string()),
            ])
        );
    }

    #[test]
    fn test_direct_child_of_root_encodes_empty() {
        let graph = DepGraph::new(vec![
            Link::new("0.1", "1.1", "U"),
            Link::new("0.2", "1.2", "A"),
            Link::new("1.2", "1.1", "H"),
        ]);
        let encodings =
            terminal_encodings(&graph, &["0.1".to_string()], terminal_position).unwrap();
        assert_eq!(encodings[&1], "");
    }

    #[test]
    fn test_min_subtree_encodings() {
        let graph = passage();
        let encodings = min_subtree_encodings(&graph, "0.1", "0.3", terminal_position).unwrap();
        assert_eq!(
            encodings,
            BTreeMap::from([
                (1, "C".to_string()),
                (2, "C".to_string()),
                (3, String::new()),
            ])
        );
    }

    #[test]
    fn test_encodings_fail_on_malformed_graph() {
        let graph = DepGraph::new(vec![Link::new("0.1", "1.1", "A"), Link::new("0.2", "1.2", "A")]);
        assert!(matches!(
            terminal_encodings(&graph, &graph.terminals(is_terminal), terminal_position),
            Err(PathError::GraphMalformed(_))
        ));
    }
}
