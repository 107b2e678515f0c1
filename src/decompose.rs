//! Decomposition of document text into an ordered sequence of units.
//!
//! The tree-sitter grammar supplied by a [`Format`] finds the block structure; the unit text is
//! always the verbatim source slice, so `reconstruct(decompose(text))` gives back the document
//! with only blank-line runs normalised. Constructs the grammar does not know (display math,
//! container directives) are recognised afterwards by their fences and merged back together.

use crate::error::{Error, Result};
use crate::formats::Format;
use crate::unit::{raw_heading, Slugger, Unit, UnitKind};
use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Parser};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// How coarse the units of a decomposition are.
pub enum Granularity {
    #[default]
    /// One unit per block.
    Blocks,
    /// One unit per depth 1 or 2 section.
    Sections,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Text of the units surrounding a unit, in document order.
pub struct Context {
    /// Preceding unit texts, nearest last.
    pub before: Vec<String>,
    /// Following unit texts, nearest first.
    pub after: Vec<String>,
}

impl Context {
    #[must_use]
    /// Preceding context as one block of text.
    pub fn before_text(&self) -> String {
        self.before.join("\n\n")
    }

    #[must_use]
    /// Following context as one block of text.
    pub fn after_text(&self) -> String {
        self.after.join("\n\n")
    }
}

/// A block before heading context has been assigned.
struct RawBlock {
    kind: UnitKind,
    start_byte: usize,
    end_byte: usize,
    start_row: usize,
    level: Option<usize>,
    language: Option<String>,
}

/// Decompose text at the requested granularity.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded or the parser yields no tree.
pub fn decompose_with(text: &str, format: &dyn Format, granularity: Granularity) -> Result<Vec<Unit>> {
    match granularity {
        Granularity::Blocks => decompose(text, format),
        Granularity::Sections => decompose_sections(text, format),
    }
}

/// Decompose text into one unit per block.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded or the parser yields no tree.
pub fn decompose(text: &str, format: &dyn Format) -> Result<Vec<Unit>> {
    let mut parser = Parser::new();
    parser.set_language(&format.language())?;
    let tree = parser.parse(text, None).ok_or_else(|| Error::Parse {
        what: "document".to_string(),
    })?;

    let mut blocks = Vec::new();
    collect_blocks(tree.root_node(), text, format, &mut blocks);
    let blocks = merge_fenced(blocks, text);

    let mut slugger = Slugger::default();
    let mut context: Option<String> = None;
    let mut last_h1: Option<String> = None;
    let mut units = Vec::with_capacity(blocks.len());

    for block in blocks {
        let slice = text[block.start_byte..block.end_byte].trim_end();
        if slice.trim().is_empty() {
            continue;
        }
        let start_line = block.start_row + 1;
        let end_line = start_line + slice.lines().count().saturating_sub(1);

        let (id, parent_heading_id) = if block.kind == UnitKind::Heading {
            let id = slugger.id_for(&raw_heading(slice));
            let parent = match block.level {
                Some(1) => None,
                Some(2) => last_h1.clone(),
                _ => context.clone(),
            };
            match block.level {
                Some(1) => {
                    last_h1 = Some(id.clone());
                    context = Some(id.clone());
                }
                Some(2) => context = Some(id.clone()),
                _ => {}
            }
            (Some(id), parent)
        } else {
            (None, context.clone())
        };

        units.push(Unit {
            kind: block.kind,
            text: slice.to_string(),
            id,
            parent_heading_id,
            index: units.len(),
            start_line,
            end_line,
            level: block.level,
            language: block.language,
        });
    }

    Ok(units)
}

/// Decompose text into one unit per depth 1 or 2 section.
///
/// Each section unit spans its heading and everything up to the next depth 1 or 2 heading,
/// keeping the heading's id and level. Content before the first such heading becomes one
/// leading unit of its first block's kind.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded or the parser yields no tree.
pub fn decompose_sections(text: &str, format: &dyn Format) -> Result<Vec<Unit>> {
    let blocks = decompose(text, format)?;
    let lines: Vec<&str> = text.lines().collect();

    let mut groups: Vec<Vec<Unit>> = Vec::new();
    for unit in blocks {
        let opens = unit.is_heading() && unit.level.is_some_and(|l| l <= 2);
        match groups.last_mut() {
            Some(group) if !opens => group.push(unit),
            _ => groups.push(vec![unit]),
        }
    }

    let mut sections = Vec::with_capacity(groups.len());
    for group in groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let end = last.end_line.min(lines.len());
        let text = lines[first.start_line - 1..end].join("\n").trim_end().to_string();
        sections.push(Unit {
            kind: first.kind,
            text,
            id: first.id.clone(),
            parent_heading_id: first.parent_heading_id.clone(),
            index: sections.len(),
            start_line: first.start_line,
            end_line: last.end_line,
            level: first.level,
            language: first.language.clone(),
        });
    }

    Ok(sections)
}

#[must_use]
/// Join unit texts with a blank line, ending with a single newline.
pub fn reconstruct(units: &[Unit]) -> String {
    join_blocks(units.iter().map(|u| u.text.as_str()))
}

/// Join block texts with a blank line, skipping blank blocks.
pub(crate) fn join_blocks<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for text in texts {
        let text = text.trim_end();
        if text.trim().is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(text);
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[must_use]
/// Texts of the `window` nearest units on each side of `unit`.
pub fn context_of(units: &[Unit], unit: &Unit, window: usize) -> Context {
    let index = unit.index.min(units.len());
    let start = index.saturating_sub(window);
    let end = (index + 1 + window).min(units.len());
    let after_start = (index + 1).min(end);
    Context {
        before: units[start..index].iter().map(|u| u.text.clone()).collect(),
        after: units[after_start..end].iter().map(|u| u.text.clone()).collect(),
    }
}

fn collect_blocks(node: Node<'_>, text: &str, format: &dyn Format, out: &mut Vec<RawBlock>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let kind = child.kind();
        if format.is_container(kind) {
            collect_blocks(child, text, format, out);
            continue;
        }
        let Some(unit_kind) = format.unit_kind(kind) else {
            continue;
        };
        let position = child.start_position();
        let mut block = RawBlock {
            kind: unit_kind,
            start_byte: child.start_byte().saturating_sub(position.column),
            end_byte: child.end_byte().min(text.len()),
            start_row: position.row,
            level: None,
            language: None,
        };
        let mut inner = child.walk();
        for part in child.named_children(&mut inner) {
            if let Some(level) = format.heading_level(part.kind()) {
                block.level = Some(level);
            } else if part.kind() == "info_string" {
                block.language = part
                    .utf8_text(text.as_bytes())
                    .ok()
                    .and_then(|info| info.split_whitespace().next())
                    .map(str::to_string);
            }
        }
        out.push(block);
    }
}

/// Reclassify fenced paragraphs and pull unclosed fences together with what follows them.
fn merge_fenced(blocks: Vec<RawBlock>, text: &str) -> Vec<RawBlock> {
    let mut merged: Vec<RawBlock> = Vec::with_capacity(blocks.len());
    let mut pending: Option<(RawBlock, Fence)> = None;

    for mut block in blocks {
        let slice = &text[block.start_byte..block.end_byte];
        if let Some((mut open, mut fence)) = pending.take() {
            open.end_byte = block.end_byte;
            if fence.feed(slice) {
                merged.push(open);
            } else {
                pending = Some((open, fence));
            }
            continue;
        }
        if block.kind == UnitKind::Paragraph {
            let head = slice.trim_start();
            if head.starts_with("$$") {
                block.kind = UnitKind::Math;
                let mut fence = Fence::Math { opened: false };
                if !fence.feed(slice) {
                    pending = Some((block, fence));
                    continue;
                }
            } else if head.starts_with(":::") {
                block.kind = UnitKind::Directive;
                let mut fence = Fence::Directive { depth: 0 };
                if !fence.feed(slice) {
                    pending = Some((block, fence));
                    continue;
                }
            } else if head.starts_with('|') {
                block.kind = UnitKind::Table;
            }
        }
        merged.push(block);
    }

    if let Some((open, _)) = pending {
        merged.push(open);
    }
    merged
}

/// Open/close tracking for fences the grammar does not know about.
enum Fence {
    Math { opened: bool },
    Directive { depth: usize },
}

impl Fence {
    /// Consume the lines of a block; returns true once the fence is closed.
    fn feed(&mut self, slice: &str) -> bool {
        for line in slice.lines() {
            let t = line.trim();
            match self {
                Fence::Math { opened } => {
                    let mut rest = t;
                    while let Some(pos) = rest.find("$$") {
                        if *opened {
                            return true;
                        }
                        *opened = true;
                        rest = &rest[pos + 2..];
                    }
                }
                Fence::Directive { depth } => {
                    if !t.starts_with(":::") {
                        continue;
                    }
                    if t.trim_start_matches(':').trim().is_empty() {
                        *depth = depth.saturating_sub(1);
                        if *depth == 0 {
                            return true;
                        }
                    } else {
                        *depth += 1;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "tests/decompose.rs"]
mod tests;
