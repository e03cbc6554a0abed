//! Anchor resolution: which graph node stands for an entity span.

use crate::error::{PathError, TokenSpan};
use crate::graph::DepGraph;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which node stands for a span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// The parent of the span's first parsed token ([`resolve_anchor`]).
    #[default]
    Parent,
    /// The span's own head token ([`span_head`]).
    Head,
}

impl FromStr for AnchorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Self::Parent),
            "head" => Ok(Self::Head),
            other => Err(format!("unknown anchor mode: {other} (expected parent or head)")),
        }
    }
}

/// Resolve the anchor of `span` with the given mode.
pub fn anchor<F>(
    graph: &DepGraph,
    span: TokenSpan,
    mode: AnchorMode,
    node_of_token: F,
) -> Result<String, PathError>
where
    F: Fn(usize) -> String,
{
    match mode {
        AnchorMode::Parent => resolve_anchor(graph, span, node_of_token).map(str::to_string),
        AnchorMode::Head => span_head(graph, span, node_of_token),
    }
}

/// The first direct parent of the first span token that has one.
///
/// Tokens are tried from the start of the span; `node_of_token` maps a
/// 1-based token position to its node id. When the start token is missing
/// from the graph or has no parent, later tokens of the span are tried, so
/// `AnchorNotFound` means no token of the span has a parent.
pub fn resolve_anchor<'g, F>(
    graph: &'g DepGraph,
    span: TokenSpan,
    node_of_token: F,
) -> Result<&'g str, PathError>
where
    F: Fn(usize) -> String,
{
    span.positions()
        .find_map(|position| {
            graph
                .parents(&node_of_token(position))
                .first()
                .map(String::as_str)
        })
        .ok_or(PathError::AnchorNotFound { span })
}

/// The head token of a span: the first token in text order with no direct
/// parent inside the span.
pub fn span_head<F>(graph: &DepGraph, span: TokenSpan, node_of_token: F) -> Result<String, PathError>
where
    F: Fn(usize) -> String,
{
    let members: Vec<String> = span
        .positions()
        .map(&node_of_token)
        .filter(|node| graph.contains(node))
        .collect();

    members
        .iter()
        .find(|node| {
            graph
                .parents(node)
                .iter()
                .all(|parent| !members.contains(parent))
        })
        .or_else(|| members.first())
        .cloned()
        .ok_or(PathError::AnchorNotFound { span })
}
