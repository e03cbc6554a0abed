//! Node id schemes for token positions.
//!
//! Layered ids look like `"<layer>.<index>"` with terminals in layer `0`, so
//! `"0.7"` is the seventh token of the sentence. Plain ids are the position
//! itself (`"7"`), with `"0"` reserved for the root of a dependency tree.
//! Graph operations never assume either scheme; these functions are the
//! predicates callers usually inject.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

const TERMINAL_LAYER: &str = "0";

/// How token positions are spelled as node ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeIds {
    /// `"0.<n>"` terminals under layered non-terminal ids.
    #[default]
    Layered,
    /// `"<n>"` for every token, `"0"` for the root.
    Plain,
}

impl NodeIds {
    pub fn id(self, position: usize) -> String {
        match self {
            Self::Layered => terminal_id(position),
            Self::Plain => position.to_string(),
        }
    }

    pub fn position(self, id: &str) -> Option<usize> {
        match self {
            Self::Layered => terminal_position(id),
            Self::Plain => id.parse().ok().filter(|&n| n > 0),
        }
    }

    pub fn is_terminal(self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

impl FromStr for NodeIds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "layered" => Ok(Self::Layered),
            "plain" => Ok(Self::Plain),
            other => Err(format!("unknown node id scheme: {other} (expected layered or plain)")),
        }
    }
}

/// The 1-based token position of a terminal id, `None` for non-terminals.
pub fn terminal_position(id: &str) -> Option<usize> {
    let (layer, index) = id.split_once('.')?;
    if layer != TERMINAL_LAYER {
        return None;
    }
    index.parse().ok()
}

pub fn is_terminal(id: &str) -> bool {
    terminal_position(id).is_some()
}

/// Terminal id for a 1-based token position.
pub fn terminal_id(position: usize) -> String {
    format!("{TERMINAL_LAYER}.{position}")
}
