//! Typed failures returned by the alignment, graph and anchor operations.
//!
//! Every variant is recoverable at sentence granularity: callers log the
//! failure, skip the sentence and keep going with the batch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based, inclusive token span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Positions covered by the span, in text order.
    pub fn positions(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn contains(&self, position: usize) -> bool {
        self.positions().contains(&position)
    }
}

impl fmt::Display for TokenSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Errors from the path extraction core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("alignment incomplete: {0}")]
    AlignmentIncomplete(AlignmentDefect),
    #[error("no anchor node for span {span}")]
    AnchorNotFound { span: TokenSpan },
    #[error("no path between {from} and {to}")]
    NoPath { from: String, to: String },
    #[error("malformed graph: {0}")]
    GraphMalformed(Malformed),
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("no common ancestor of {one} and {another}")]
    NoCommonAncestor { one: String, another: String },
}

/// Why an alignment map cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlignmentDefect {
    #[error("positions {missing:?} of the first tokenization are unmapped")]
    NotTotal { missing: Vec<usize> },
    #[error("positions {uncovered:?} of the second tokenization are never reached")]
    NotSurjective { uncovered: Vec<usize> },
}

/// Why an edge list does not form a single rooted, acyclic structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    #[error("edge set is empty")]
    Empty,
    #[error("cycle through node {node}")]
    Cycle { node: String },
    #[error("{} root candidates: {}", roots.len(), roots.join(", "))]
    MultipleRoots { roots: Vec<String> },
}

impl From<AlignmentDefect> for PathError {
    fn from(defect: AlignmentDefect) -> Self {
        Self::AlignmentIncomplete(defect)
    }
}

impl From<Malformed> for PathError {
    fn from(reason: Malformed) -> Self {
        Self::GraphMalformed(reason)
    }
}
