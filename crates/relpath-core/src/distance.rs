//! Token distances from the path that joins two entities.
//!
//! Tokens are nodes `"1"..="n"` of a multi-head dependency graph where head
//! `0` is a virtual root. Tokens inside each entity span are additionally
//! linked pairwise, so an entity behaves as a single unit.

use crate::error::{PathError, TokenSpan};
use crate::graph::{DepGraph, Link};

const SPAN_LABEL: &str = "span";

fn node(position: usize) -> String {
    position.to_string()
}

fn token_graph(heads: &[Vec<usize>], spans: [TokenSpan; 2]) -> DepGraph {
    let mut links: Vec<Link> = heads
        .iter()
        .enumerate()
        .flat_map(|(i, token_heads)| {
            token_heads
                .iter()
                .map(move |head| Link::new(node(i + 1), node(*head), ""))
        })
        .collect();

    for span in spans {
        for a in span.positions() {
            for b in span.positions().filter(|b| *b > a) {
                links.push(Link::new(node(b), node(a), SPAN_LABEL));
            }
        }
    }
    DepGraph::new(links)
}

/// For each token, the hop count to the nearest token on the shortest path
/// between the first tokens of `subj` and `obj`.
///
/// `heads[i]` lists the 1-based heads of token `i + 1`, `0` meaning the root.
/// Tokens on the path get 0; tokens with no connection to it get `None`.
pub fn token_distances(
    heads: &[Vec<usize>],
    subj: TokenSpan,
    obj: TokenSpan,
) -> Result<Vec<Option<usize>>, PathError> {
    let graph = token_graph(heads, [subj, obj]);
    let from = node(subj.start);
    let steps = graph.undirected_steps(&from, &node(obj.start))?;

    let on_path: Vec<&str> = std::iter::once(from.as_str())
        .chain(steps.iter().map(|step| step.to.as_str()))
        .collect();
    tracing::debug!("entity path covers {} nodes", on_path.len());

    let distances = graph.distances_from(&on_path);
    Ok((1..=heads.len())
        .map(|position| distances.get(&node(position)).copied())
        .collect())
}
