//! Section representation for decomposed documents.
//!
//! A section represents a hierarchical division of a document, corresponding
//! to a heading in markdown. Sections are rebuilt from a unit sequence and
//! nest by heading depth, which is the shape the heading alignment table is
//! maintained against: two documents whose outlines have the same shape can
//! have their headings paired up position by position.

use crate::unit::Unit;

#[derive(Clone, Debug, PartialEq)]
/// Hierarchical document division with its nested subsections.
pub struct Section {
    /// Section heading text without markup symbols.
    pub title: String,
    /// Nesting depth in the document hierarchy (1 for top-level).
    pub level: usize,
    /// Heading id within its own document.
    pub id: Option<String>,
    /// Line of the section heading.
    pub line_start: usize,
    /// Last line before the next heading of the same or lower depth.
    pub line_end: usize,
    /// Directly nested subsections.
    pub children: Vec<Section>,
}

impl Section {
    /// Visit this section and all of its descendants, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Section)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[must_use]
/// Build the heading outline of a unit sequence.
///
/// A heading becomes a child of the nearest preceding heading with a smaller depth;
/// headings skipping levels (an h3 straight under an h1) nest under the h1.
pub fn outline(units: &[Unit]) -> Vec<Section> {
    let last_line = units.last().map_or(0, |u| u.end_line);
    let mut roots: Vec<Section> = Vec::new();
    // Open sections from outermost to innermost.
    let mut stack: Vec<Section> = Vec::new();

    for unit in units {
        let (Some(title), Some(level)) = (unit.title(), unit.level) else {
            if let Some(open) = stack.last_mut() {
                open.line_end = unit.end_line;
            }
            continue;
        };
        while stack.last().is_some_and(|open| open.level >= level) {
            close(&mut stack, &mut roots);
        }
        stack.push(Section {
            title,
            level,
            id: unit.id.clone(),
            line_start: unit.start_line,
            line_end: unit.end_line,
            children: Vec::new(),
        });
    }
    while !stack.is_empty() {
        close(&mut stack, &mut roots);
    }
    if let Some(last) = roots.last_mut() {
        last.line_end = last.line_end.max(last_line);
    }
    roots
}

fn close(stack: &mut Vec<Section>, roots: &mut Vec<Section>) {
    let Some(done) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some(parent) => {
            parent.line_end = parent.line_end.max(done.line_end);
            parent.children.push(done);
        }
        None => roots.push(done),
    }
}

#[must_use]
/// Every section title in the forest, depth first.
pub fn titles(sections: &[Section]) -> Vec<&str> {
    let mut out = Vec::new();
    for section in sections {
        section.walk(&mut |s| out.push(s.title.as_str()));
    }
    out
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
