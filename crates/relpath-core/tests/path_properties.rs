use relpath_core::error::{Malformed, PathError};
use relpath_core::graph::{DepGraph, Direction, Link, Step};
use relpath_core::node_id::{is_terminal, terminal_position};
use relpath_core::render::default_representation;
use std::collections::BTreeSet;

/// "John came home and Mary ate", one scene per clause.
fn tree_links() -> Vec<Link> {
    vec![
        Link::new("1.1", "1.0", "H"),
        Link::new("1.2", "1.0", "H"),
        Link::new("0.4", "1.0", "L").with_text("and"),
        Link::new("0.1", "1.1", "A").with_text("John"),
        Link::new("0.2", "1.1", "P").with_text("came"),
        Link::new("1.3", "1.1", "A"),
        Link::new("0.3", "1.3", "C").with_text("home"),
        Link::new("0.5", "1.2", "A").with_text("Mary"),
        Link::new("0.6", "1.2", "P").with_text("ate"),
    ]
}

/// The same passage where Mary is also a remote participant of the first scene.
fn remote_links() -> Vec<Link> {
    let mut links = tree_links();
    links.push(Link::new("0.5", "1.1", "A"));
    links
}

fn flipped(steps: &[Step]) -> Vec<Step> {
    steps.iter().rev().map(Step::reversed).collect()
}

#[test]
fn test_paths_are_symmetric() {
    for links in [tree_links(), remote_links()] {
        let graph = DepGraph::new(links);
        let nodes: Vec<&str> = graph.nodes().collect();
        for a in &nodes {
            for b in &nodes {
                let forward = graph.undirected_steps(a, b).unwrap();
                let backward = graph.undirected_steps(b, a).unwrap();
                assert_eq!(forward, flipped(&backward), "{a} -> {b}");
            }
        }
    }
}

#[test]
fn test_steps_chain_end_to_end() {
    let graph = DepGraph::new(remote_links());
    let nodes: Vec<&str> = graph.nodes().collect();
    for a in &nodes {
        for b in &nodes {
            let steps = graph.undirected_steps(a, b).unwrap();
            if let (Some(first), Some(last)) = (steps.first(), steps.last()) {
                assert_eq!(first.from, *a);
                assert_eq!(last.to, *b);
            }
            for pair in steps.windows(2) {
                assert_eq!(pair[0].to, pair[1].from);
            }
        }
    }
}

#[test]
fn test_step_direction_matches_edge() {
    let graph = DepGraph::new(tree_links());
    let steps = graph.undirected_steps("0.1", "0.6").unwrap();
    for step in &steps {
        match step.direction {
            Direction::Down => assert!(graph.link(&step.from, &step.to).is_some()),
            Direction::Up => assert!(graph.link(&step.to, &step.from).is_some()),
        }
    }
    assert_eq!(default_representation(&steps), "<A <H >H >P");
}

#[test]
fn test_lca_subtree_contains_tree_path() {
    let graph = DepGraph::new(tree_links());
    let terminals = graph.terminals(is_terminal);
    for a in &terminals {
        for b in &terminals {
            let links = graph.lca_subgraph_links(a, b, terminal_position).unwrap();
            let lca = graph.lowest_common_ancestor(a, b).unwrap();
            let mut covered: BTreeSet<&str> = links
                .iter()
                .flat_map(|l| [l.child.as_str(), l.parent.as_str()])
                .collect();
            covered.insert(lca);

            for step in graph.undirected_steps(a, b).unwrap() {
                assert!(covered.contains(step.from.as_str()), "{a} -> {b}");
                assert!(covered.contains(step.to.as_str()), "{a} -> {b}");
            }
        }
    }
}

#[test]
fn test_lca_links_read_left_to_right() {
    let graph = DepGraph::new(tree_links());
    let links = graph.lca_subgraph_links("0.1", "0.6", terminal_position).unwrap();
    let words: Vec<&str> = links.iter().filter_map(|l| l.text.as_deref()).collect();
    assert_eq!(words, vec!["John", "came", "home", "and", "Mary", "ate"]);
}

#[test]
fn test_minimal_subgraph_contains_endpoints_within_lca() {
    let by_count = |terminals: &[String], _: &str, _: &str| terminals.len();
    for links in [tree_links(), remote_links()] {
        let graph = DepGraph::new(links);
        let terminals = graph.terminals(is_terminal);
        for a in &terminals {
            for b in &terminals {
                let minimal = graph.minimal_subgraph(a, b, is_terminal, by_count).unwrap();
                assert!(minimal.contains(a) && minimal.contains(b), "{a} / {b}");
                if a == b {
                    continue;
                }
                let lca = DepGraph::new(graph.lca_subgraph_links(a, b, terminal_position).unwrap());
                assert!(
                    minimal.terminals(is_terminal).len() <= lca.terminals(is_terminal).len(),
                    "{a} / {b}"
                );
            }
        }
    }
}

#[test]
fn test_remote_edge_shrinks_minimal_subgraph() {
    let by_count = |terminals: &[String], _: &str, _: &str| terminals.len();
    let tree = DepGraph::new(tree_links());
    let remote = DepGraph::new(remote_links());

    let wide = tree.minimal_subgraph("0.1", "0.5", is_terminal, by_count).unwrap();
    let narrow = remote.minimal_subgraph("0.1", "0.5", is_terminal, by_count).unwrap();
    assert_eq!(wide.root(), Ok("1.0"));
    assert_eq!(narrow.root(), Ok("1.1"));
    assert_eq!(
        narrow.terminals(is_terminal),
        vec!["0.1", "0.2", "0.3", "0.5"]
    );
}

#[test]
fn test_three_node_cycle_is_malformed() {
    let graph = DepGraph::new(vec![
        Link::new("x", "y", "a"),
        Link::new("y", "z", "b"),
        Link::new("z", "x", "c"),
    ]);
    assert!(matches!(
        graph.root(),
        Err(PathError::GraphMalformed(Malformed::Cycle { .. }))
    ));
    // Undirected queries still terminate on cyclic input.
    assert_eq!(graph.undirected_steps("x", "z").unwrap().len(), 1);
    assert_eq!(graph.ancestors("x").unwrap().len(), 2);
}
