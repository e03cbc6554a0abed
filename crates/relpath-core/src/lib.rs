//! Core of relation-path extraction between two entity spans.
//!
//! Aligns two tokenizations of a sentence ([`align::align`]), models a parsed
//! sentence as a dependency graph ([`graph::DepGraph`]) with root, ancestor,
//! shortest-path and common-ancestor subtree queries, and renders paths as
//! strings ([`render`]). All operations are deterministic and side-effect free.

pub mod align;
pub mod anchor;
pub mod config;
pub mod distance;
pub mod encoding;
pub mod error;
pub mod graph;
pub mod node_id;
pub mod render;

pub use error::{PathError, TokenSpan};
