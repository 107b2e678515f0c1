//! Markdown format implementation using tree-sitter-md.
//!
//! This module classifies the block-level nodes of the tree-sitter-md grammar
//! into unit kinds. Inline structure is never parsed: every block is kept as a
//! verbatim slice of the source.

use crate::formats::Format;
use crate::unit::UnitKind;

/// Block classification for CommonMark documents with GFM tables.
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    fn is_container(&self, node_kind: &str) -> bool {
        matches!(node_kind, "document" | "section")
    }

    fn unit_kind(&self, node_kind: &str) -> Option<UnitKind> {
        let kind = match node_kind {
            "atx_heading" | "setext_heading" => UnitKind::Heading,
            "fenced_code_block" | "indented_code_block" => UnitKind::Code,
            "list" => UnitKind::List,
            "block_quote" => UnitKind::Blockquote,
            "pipe_table" => UnitKind::Table,
            "thematic_break" => UnitKind::ThematicBreak,
            "html_block" => UnitKind::RawHtml,
            "block_continuation" => return None,
            _ => UnitKind::Paragraph,
        };
        Some(kind)
    }

    fn heading_level(&self, marker_kind: &str) -> Option<usize> {
        match marker_kind {
            "atx_h1_marker" | "setext_h1_underline" => Some(1),
            "atx_h2_marker" | "setext_h2_underline" => Some(2),
            "atx_h3_marker" => Some(3),
            "atx_h4_marker" => Some(4),
            "atx_h5_marker" => Some(5),
            "atx_h6_marker" => Some(6),
            _ => None,
        }
    }
}
