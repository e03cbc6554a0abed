//! JSON-lines record types and the per-sentence pipeline behind each
//! subcommand.
//!
//! Entity spans in input records are 1-based, inclusive positions in
//! `tokens`. Parse graphs address parse tokens as terminals `0.<n>` or, with
//! plain node ids, by the position itself.

use relpath_core::align::{AlignmentMap, align};
use relpath_core::anchor::anchor;
use relpath_core::config::{AlignConfig, AnchorConfig, RelpathConfig};
use relpath_core::distance::token_distances;
use relpath_core::encoding::{min_subtree_encodings, terminal_encodings};
use relpath_core::graph::{DepGraph, Link};
use relpath_core::render::{PathRenderer, dependency_representation};
use relpath_core::{PathError, TokenSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct AlignRecord {
    pub tokens: Vec<String>,
    pub parse_tokens: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AlignOutput {
    pub alignment: BTreeMap<usize, Vec<usize>>,
    pub total: bool,
    pub surjective: bool,
}

#[derive(Debug, Deserialize)]
pub struct PathRecord {
    pub tokens: Vec<String>,
    pub parse_tokens: Vec<String>,
    pub links: Vec<Link>,
    pub subj: TokenSpan,
    pub obj: TokenSpan,
    #[serde(default)]
    pub trigger: Option<TokenSpan>,
}

#[derive(Debug, Serialize)]
pub struct PathOutput {
    pub subj_anchor: String,
    pub obj_anchor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_anchor: Option<String>,
    pub path: String,
    pub dependency_path: String,
    /// Variants of the direct path, or of the path through the trigger.
    pub variants: Vec<String>,
    /// Number of steps, one less than the nodes on the path; 0 when both
    /// anchors are the same node.
    pub path_length: usize,
}

#[derive(Debug, Deserialize)]
pub struct EncodingRecord {
    pub tokens: Vec<String>,
    pub parse_tokens: Vec<String>,
    pub links: Vec<Link>,
    pub subj: TokenSpan,
    pub obj: TokenSpan,
}

#[derive(Debug, Serialize)]
pub struct EncodingOutput {
    pub encodings: BTreeMap<usize, String>,
    pub min_subtree_encodings: BTreeMap<usize, String>,
}

#[derive(Debug, Deserialize)]
pub struct DistanceRecord {
    /// 1-based heads of each token, 0 for the root.
    pub heads: Vec<Vec<usize>>,
    pub subj: TokenSpan,
    pub obj: TokenSpan,
}

#[derive(Debug, Serialize)]
pub struct DistanceOutput {
    pub distances: Vec<Option<usize>>,
}

/// Shared, read-only settings for processing one sentence.
pub struct Pipeline {
    renderer: PathRenderer,
    align: AlignConfig,
    anchor: AnchorConfig,
}

impl Pipeline {
    pub fn new(config: &RelpathConfig) -> Self {
        Self {
            renderer: PathRenderer::new(config.render.clone()),
            align: config.align.clone(),
            anchor: config.anchor,
        }
    }

    fn aligned(&self, tokens: &[String], parse_tokens: &[String]) -> Result<AlignmentMap, PathError> {
        let map = align(tokens, parse_tokens);
        self.align.check(&map)?;
        Ok(map)
    }

    fn anchor_of(
        &self,
        graph: &DepGraph,
        map: &AlignmentMap,
        span: TokenSpan,
    ) -> Result<String, PathError> {
        let span = map.map_span(span)?;
        let ids = self.anchor.node_ids;
        anchor(graph, span, self.anchor.mode, |position| ids.id(position))
    }

    pub fn align(&self, record: AlignRecord) -> Result<AlignOutput, PathError> {
        let map = align(record.tokens.as_slice(), record.parse_tokens.as_slice());
        Ok(AlignOutput {
            alignment: map.iter().map(|(a, b)| (a, b.to_vec())).collect(),
            total: map.is_total(),
            surjective: map.is_surjective(),
        })
    }

    pub fn paths(&self, record: PathRecord) -> Result<PathOutput, PathError> {
        let map = self.aligned(&record.tokens, &record.parse_tokens)?;
        let graph = DepGraph::new(record.links);
        graph.root()?;

        let subj = self.anchor_of(&graph, &map, record.subj)?;
        let obj = self.anchor_of(&graph, &map, record.obj)?;
        let steps = graph.undirected_steps(&subj, &obj)?;

        let (trigger_anchor, variants) = match record.trigger {
            Some(span) => {
                let trigger = self.anchor_of(&graph, &map, span)?;
                let left = self
                    .renderer
                    .variants(&graph.undirected_steps(&subj, &trigger)?, &graph);
                let right = self
                    .renderer
                    .variants(&graph.undirected_steps(&trigger, &obj)?, &graph);
                (Some(trigger), self.renderer.join(&left, &right))
            }
            None => (None, self.renderer.variants(&steps, &graph)),
        };

        Ok(PathOutput {
            subj_anchor: subj,
            obj_anchor: obj,
            trigger_anchor,
            path: self.renderer.default_representation(&steps),
            dependency_path: dependency_representation(&steps),
            variants,
            path_length: steps.len(),
        })
    }

    pub fn encodings(&self, record: EncodingRecord) -> Result<EncodingOutput, PathError> {
        let map = self.aligned(&record.tokens, &record.parse_tokens)?;
        let graph = DepGraph::new(record.links);

        let ids = self.anchor.node_ids;
        let position = |id: &str| ids.position(id);

        let encodings =
            terminal_encodings(&graph, &graph.terminals(|id| ids.is_terminal(id)), position)?;
        let subj = self.anchor_of(&graph, &map, record.subj)?;
        let obj = self.anchor_of(&graph, &map, record.obj)?;
        let min_subtree = min_subtree_encodings(&graph, &subj, &obj, position)?;

        Ok(EncodingOutput {
            encodings,
            min_subtree_encodings: min_subtree,
        })
    }

    pub fn distances(&self, record: DistanceRecord) -> Result<DistanceOutput, PathError> {
        Ok(DistanceOutput {
            distances: token_distances(&record.heads, record.subj, record.obj)?,
        })
    }
}
