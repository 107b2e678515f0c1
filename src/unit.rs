//! Unit representation for decomposed documents.
//!
//! A unit is one structural element of a document: a heading, a paragraph, a code block and so
//! on. Units carry their line provenance and the id of the heading whose context they sit in, so
//! that two independently parsed documents can be lined up without sharing any text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Structural category of a unit.
pub enum UnitKind {
    /// ATX or setext heading (or a whole section at section granularity).
    Heading,
    /// Plain paragraph, and any construct without a dedicated kind.
    Paragraph,
    /// Fenced or indented code block.
    Code,
    /// Ordered or bullet list, kept whole.
    List,
    /// Display math delimited by `$$`.
    Math,
    /// Container directive delimited by `:::`.
    Directive,
    /// Block quote.
    Blockquote,
    /// Pipe table.
    Table,
    /// Horizontal rule.
    ThematicBreak,
    /// Raw HTML block.
    RawHtml,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One structural element of a document with its provenance.
pub struct Unit {
    /// Structural category.
    pub kind: UnitKind,
    /// Verbatim source text, trailing whitespace trimmed.
    pub text: String,
    /// Stable id, only set for headings.
    pub id: Option<String>,
    /// Id of the enclosing depth 1 or 2 heading.
    pub parent_heading_id: Option<String>,
    /// Position of this unit in its own sequence.
    pub index: usize,
    /// First source line (1-indexed).
    pub start_line: usize,
    /// Last source line (inclusive).
    pub end_line: usize,
    /// Heading depth.
    pub level: Option<usize>,
    /// Code fence language.
    pub language: Option<String>,
}

impl Unit {
    #[must_use]
    /// Whether this unit is a heading.
    pub fn is_heading(&self) -> bool {
        self.kind == UnitKind::Heading
    }

    #[must_use]
    /// Heading text without markup, or `None` for non-headings.
    pub fn title(&self) -> Option<String> {
        if !self.is_heading() {
            return None;
        }
        let raw = raw_heading(&self.text);
        Some(strip_anchor(&clean_heading(&raw)).to_string())
    }

    #[must_use]
    /// The id used to look this unit up from elsewhere: its own id, else its context.
    pub fn anchor(&self) -> Option<String> {
        self.id.clone().or_else(|| self.parent_heading_id.clone())
    }
}

#[must_use]
/// Strip leading `#` markers, closing `#` markers and surrounding whitespace from a heading.
pub fn clean_heading(text: &str) -> String {
    let trimmed = text.trim().trim_start_matches('#').trim();
    let without_closing = trimmed.trim_end_matches('#');
    if without_closing.ends_with(char::is_whitespace) || without_closing.is_empty() {
        without_closing.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Heading line as written, with setext headings folded onto one line.
pub(crate) fn raw_heading(text: &str) -> String {
    let first = text.lines().next().unwrap_or_default();
    if first.trim_start().starts_with('#') {
        return first.to_string();
    }
    let lines: Vec<&str> = text.lines().collect();
    match lines.iter().position(|l| is_setext_underline(l)) {
        Some(underline) => lines[..underline]
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join(" "),
        None => first.to_string(),
    }
}

fn is_setext_underline(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty() && (t.chars().all(|c| c == '=') || t.chars().all(|c| c == '-'))
}

fn strip_anchor(title: &str) -> &str {
    match explicit_anchor(title) {
        Some(_) => title[..title.rfind("{#").unwrap_or(title.len())].trim_end(),
        None => title,
    }
}

#[must_use]
/// Explicit `{#custom-id}` anchor at the end of a heading, if any.
pub fn explicit_anchor(title: &str) -> Option<&str> {
    let t = title.trim_end();
    let inner = t.strip_suffix('}')?;
    let start = inner.rfind("{#")?;
    let id = &inner[start + 2..];
    if id.is_empty() || id.contains(char::is_whitespace) {
        None
    } else {
        Some(id)
    }
}

#[must_use]
/// Slugify heading text: lower-case, punctuation dropped, each whitespace character becomes `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if c == '-' || c == '_' {
            slug.push(c);
        } else if c.is_whitespace() {
            slug.push('-');
        }
    }
    slug
}

#[derive(Default)]
/// Hands out heading ids that are unique within one parse.
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Id for a heading line, honouring an explicit `{#id}` anchor.
    pub fn id_for(&mut self, heading_line: &str) -> String {
        let cleaned = clean_heading(heading_line);
        let base = explicit_anchor(&cleaned).map_or_else(|| slugify(&cleaned), str::to_string);
        self.unique(base)
    }

    fn unique(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }
}

#[cfg(test)]
#[path = "tests/unit.rs"]
mod tests;
