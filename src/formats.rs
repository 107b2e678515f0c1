//! Format trait and implementations for different document types.
//!
//! This module defines the `Format` trait which abstracts over different
//! document formats by providing the tree-sitter grammar plus the mapping from
//! grammar node kinds to unit kinds. The decomposer only ever talks to a format
//! through this trait.

use crate::unit::UnitKind;

pub mod markdown;

/// Grammar and node classification for one document format.
pub trait Format {
    /// Tree-sitter grammar used to parse documents of this format.
    fn language(&self) -> tree_sitter::Language;

    /// Whether a node only groups other blocks and should be descended into.
    fn is_container(&self, node_kind: &str) -> bool;

    /// Unit kind for a block node, or `None` if the node carries no content of its own.
    fn unit_kind(&self, node_kind: &str) -> Option<UnitKind>;

    /// Node kinds that mark the depth of a heading, mapped to that depth.
    fn heading_level(&self, marker_kind: &str) -> Option<usize>;
}
