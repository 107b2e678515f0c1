//! The heading alignment table bridges headings between a source document and its translation.
//!
//! Heading ids are slugs of heading text, so a translated heading never shares an id with its
//! source. The table records, for every source heading, the text of the corresponding heading in
//! the translation. It is persisted in the translation's front matter and rebuilt from the two
//! outlines whenever they line up section for section.

use crate::error::Result;
use crate::front_matter::Document;
use crate::section::{titles, Section};
use crate::unit::clean_heading;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Source heading text to translated heading text.
pub struct HeadingMap {
    entries: BTreeMap<String, String>,
}

impl HeadingMap {
    #[must_use]
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the translation of a source heading, replacing any earlier one.
    pub fn insert(&mut self, source: &str, target: &str) {
        self.entries
            .insert(clean_heading(source), clean_heading(target));
    }

    #[must_use]
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read the table stored under `key` in a document's front matter.
    ///
    /// # Errors
    ///
    /// Returns an error if the front matter is malformed or the entry is not a string map.
    pub fn load(document: &Document, key: &str) -> Result<Self> {
        let metadata = document.metadata()?;
        match metadata.get(key) {
            None | Some(Value::Null) => Ok(Self::new()),
            Some(value) => {
                let entries: BTreeMap<String, String> = serde_yaml::from_value(value.clone())?;
                Ok(Self { entries })
            }
        }
    }

    /// Write the table under `key` in a document's front matter.
    ///
    /// An empty table removes the key instead of writing an empty map. The front matter is
    /// only re-serialised when the stored table actually changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing front matter is malformed.
    pub fn store(&self, document: &mut Document, key: &str) -> Result<()> {
        let mut metadata = document.metadata()?;
        let stored = Self::load(document, key)?;
        if stored == *self && (!self.is_empty() || !metadata.contains_key(key)) {
            return Ok(());
        }
        if self.is_empty() {
            metadata.remove(key);
        } else {
            metadata.insert(
                Value::String(key.to_string()),
                serde_yaml::to_value(&self.entries)?,
            );
        }
        document.set_metadata(&metadata)
    }
}

#[must_use]
/// Translated text for a source heading; markers and surrounding whitespace are ignored.
pub fn lookup<'a>(heading: &str, map: &'a HeadingMap) -> Option<&'a str> {
    map.entries.get(&clean_heading(heading)).map(String::as_str)
}

#[must_use]
/// Pair the headings of two outlines position by position and prune stale entries.
///
/// The outlines are assumed congruent (see [`is_congruent`]); where one has fewer sections at
/// some level, the extra sections of the other are left unpaired. After pairing, every entry
/// whose key is not a heading of `source` (or the preserved `title`) is removed.
pub fn update(
    existing: &HeadingMap,
    source: &[Section],
    target: &[Section],
    title: Option<&str>,
) -> HeadingMap {
    let mut map = existing.clone();
    pair(&mut map, source, target);
    prune(&map, source, title)
}

fn pair(map: &mut HeadingMap, source: &[Section], target: &[Section]) {
    for (src, tgt) in source.iter().zip(target) {
        map.insert(&src.title, &tgt.title);
        pair(map, &src.children, &tgt.children);
    }
}

#[must_use]
/// Drop entries for headings no longer present in `source`.
pub fn prune(existing: &HeadingMap, source: &[Section], title: Option<&str>) -> HeadingMap {
    let mut live: BTreeSet<String> = titles(source).into_iter().map(clean_heading).collect();
    if let Some(title) = title {
        live.insert(clean_heading(title));
    }
    let entries = existing
        .entries
        .iter()
        .filter(|(k, _)| live.contains(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    HeadingMap { entries }
}

#[must_use]
/// Whether two outlines have the same number of sections at every position and level.
pub fn is_congruent(a: &[Section], b: &[Section]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.level == y.level && is_congruent(&x.children, &y.children))
}

#[cfg(test)]
#[path = "tests/heading_map.rs"]
mod tests;
