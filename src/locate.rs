//! Projection of source changes onto the translated document.
//!
//! The translation shares structure with the source but not vocabulary, so heading ids differ.
//! A [`HeadingBridge`] translates source heading ids into target heading ids through the heading
//! alignment table; the matching cascade then runs against the target units in target id space.
//! Additions are anchored by their index hint when the two documents are of comparable length,
//! otherwise under their bridged heading. Nothing here fails: an unmatched modification becomes
//! an insertion, and an unmatched deletion is dropped.

use crate::diff::{Change, ChangeKind, InsertionHint};
use crate::heading_map::{lookup, HeadingMap};
use crate::matcher::{find, Claims, MatchOptions, Parent, Probe};
use crate::observer::{Event, Observer};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Where a new unit is inserted in the target.
pub enum Anchor {
    /// Before the first unit.
    Start,
    /// Immediately after the target unit at this index.
    After(usize),
    /// After the last unit.
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Operation a mapping performs on the target.
pub enum EditStrategy {
    /// Replace the text of an existing target unit.
    ExactMatch,
    /// Insert a new unit at an anchor.
    Insert,
    /// Remove an existing target unit.
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
/// A change projected onto the target document.
pub struct Mapping {
    /// The source change.
    pub change: Change,
    /// Target unit replaced or deleted.
    pub target: Option<usize>,
    /// Insertion point for inserts.
    pub anchor: Option<Anchor>,
    /// Operation to perform.
    pub strategy: EditStrategy,
    /// Informational confidence in 0..=1.
    pub confidence: f64,
}

#[derive(Clone, Debug, Default)]
/// Source heading ids mapped to target heading ids.
pub struct HeadingBridge {
    ids: HashMap<String, String>,
}

impl HeadingBridge {
    #[must_use]
    /// Bridge the headings of the given source sequences into `targets`.
    ///
    /// A source heading is bridged through the alignment table when its translation names a
    /// target heading, otherwise to a target heading carrying the same id (explicit anchors, or
    /// headings left untranslated). Headings sharing a title pair up by occurrence: the k-th
    /// source heading whose title translates to `T` goes to the k-th target heading titled `T`.
    pub fn new(sources: &[&[Unit]], targets: &[Unit], map: &HeadingMap) -> Self {
        let mut by_title: HashMap<String, Vec<&str>> = HashMap::new();
        for unit in targets {
            if let (Some(title), Some(id)) = (unit.title(), unit.id.as_deref()) {
                by_title.entry(title).or_default().push(id);
            }
        }
        let mut ids = HashMap::new();
        for source in sources {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            for unit in source.iter() {
                let (Some(title), Some(id)) = (unit.title(), unit.id.as_deref()) else {
                    continue;
                };
                let via_table = lookup(&title, map).and_then(|t| {
                    let occurrence = seen.entry(t).or_insert(0);
                    let found = by_title.get(t).and_then(|titled| titled.get(*occurrence)).copied();
                    *occurrence += 1;
                    found
                });
                let same_id = targets
                    .iter()
                    .find(|t| t.is_heading() && t.id.as_deref() == Some(id))
                    .and_then(|t| t.id.as_deref());
                if let Some(target_id) = via_table.or(same_id) {
                    ids.entry(id.to_string())
                        .or_insert_with(|| target_id.to_string());
                }
            }
        }
        Self { ids }
    }

    #[must_use]
    /// Target id for a source heading id.
    pub fn translate(&self, source_id: &str) -> Option<&str> {
        self.ids.get(source_id).map(String::as_str)
    }
}

/// Locates changes inside one target unit sequence.
pub struct Locator<'a> {
    targets: &'a [Unit],
    bridge: &'a HeadingBridge,
    source_len: usize,
    options: MatchOptions,
    observer: &'a dyn Observer,
}

impl<'a> Locator<'a> {
    #[must_use]
    /// A locator over `targets`; `source_len` is the length of the new source sequence.
    pub fn new(
        targets: &'a [Unit],
        bridge: &'a HeadingBridge,
        source_len: usize,
        options: MatchOptions,
        observer: &'a dyn Observer,
    ) -> Self {
        Self {
            targets,
            bridge,
            source_len,
            options,
            observer,
        }
    }

    #[must_use]
    /// Project one change; `None` when a deletion has nothing to delete.
    pub fn locate(&self, change: &Change) -> Option<Mapping> {
        let mut claims = Claims::new(self.targets.len());
        self.locate_with(change, &mut claims)
    }

    #[must_use]
    /// Project a batch of changes.
    ///
    /// A target unit is claimed by at most one change. Consecutive additions in the source
    /// share the anchor of the first, so the run lands contiguously and in source order.
    pub fn locate_all(&self, changes: &[Change]) -> Vec<Mapping> {
        let mut claims = Claims::new(self.targets.len());
        let mut mappings = Vec::with_capacity(changes.len());
        // New-revision index and anchor of the latest insert.
        let mut run: Option<(usize, Anchor, f64)> = None;

        for change in changes {
            let Some(mut mapping) = self.locate_with(change, &mut claims) else {
                continue;
            };
            if mapping.strategy == EditStrategy::Insert {
                if let Some(index) = change.new_unit.as_ref().map(|u| u.index) {
                    if let Some((_, anchor, confidence)) =
                        run.filter(|(prev, _, _)| prev + 1 == index)
                    {
                        mapping.anchor = Some(anchor);
                        mapping.confidence = confidence;
                    }
                    if let Some(anchor) = mapping.anchor {
                        run = Some((index, anchor, mapping.confidence));
                    }
                }
            }
            mappings.push(mapping);
        }
        mappings
    }

    fn locate_with(&self, change: &Change, claims: &mut Claims) -> Option<Mapping> {
        match change.kind {
            ChangeKind::Deleted => {
                let old = change.old_unit.as_ref()?;
                let found = find(
                    &self.probe(old, true),
                    self.targets,
                    claims,
                    &self.options,
                    self.observer,
                )?;
                claims.claim(found.index);
                Some(Mapping {
                    change: change.clone(),
                    target: Some(found.index),
                    anchor: None,
                    strategy: EditStrategy::Delete,
                    confidence: found.strategy.confidence(),
                })
            }
            ChangeKind::Modified => {
                let old = change.old_unit.as_ref()?;
                match find(
                    &self.probe(old, false),
                    self.targets,
                    claims,
                    &self.options,
                    self.observer,
                ) {
                    Some(found) => {
                        claims.claim(found.index);
                        Some(Mapping {
                            change: change.clone(),
                            target: Some(found.index),
                            anchor: None,
                            strategy: EditStrategy::ExactMatch,
                            confidence: found.strategy.confidence(),
                        })
                    }
                    None => {
                        let new = change.new_unit.as_ref()?;
                        let hint = InsertionHint {
                            under_heading: new.parent_heading_id.clone(),
                            index: Some(new.index),
                        };
                        let (anchor, confidence) = self.resolve_anchor(&hint);
                        Some(Mapping {
                            change: change.clone(),
                            target: None,
                            anchor: Some(anchor),
                            strategy: EditStrategy::Insert,
                            confidence: confidence * 0.5,
                        })
                    }
                }
            }
            ChangeKind::Added => {
                let hint = change.insertion_hint.clone().unwrap_or(InsertionHint {
                    under_heading: None,
                    index: None,
                });
                let (anchor, confidence) = self.resolve_anchor(&hint);
                Some(Mapping {
                    change: change.clone(),
                    target: None,
                    anchor: Some(anchor),
                    strategy: EditStrategy::Insert,
                    confidence,
                })
            }
        }
    }

    /// Probe for `unit` in target id space.
    ///
    /// A deletion under an unbridged heading may not take whatever happens to sit at its index.
    fn probe<'u>(&self, unit: &'u Unit, deleting: bool) -> Probe<'u> {
        let parent = match unit.parent_heading_id.as_deref() {
            None => Parent::Root,
            Some(id) => self
                .bridge
                .translate(id)
                .map_or(Parent::Unknown, |t| Parent::Heading(t.to_string())),
        };
        Probe {
            unit,
            id: unit
                .id
                .as_deref()
                .and_then(|id| self.bridge.translate(id))
                .map(str::to_string),
            positional: !(deleting && parent == Parent::Unknown),
            parent,
        }
    }

    /// Whether source and target lengths are close enough for index hints to mean anything.
    fn index_trusted(&self) -> bool {
        let (short, long) = if self.source_len < self.targets.len() {
            (self.source_len, self.targets.len())
        } else {
            (self.targets.len(), self.source_len)
        };
        if long == 0 {
            return true;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = short as f64 / long as f64;
        ratio >= self.options.min_length_ratio
    }

    fn resolve_anchor(&self, hint: &InsertionHint) -> (Anchor, f64) {
        let (anchor, via, confidence) = self.choose_anchor(hint);
        self.observer.on_event(&Event::InsertionResolved {
            anchor,
            via,
            confidence,
        });
        (anchor, confidence)
    }

    fn choose_anchor(&self, hint: &InsertionHint) -> (Anchor, &'static str, f64) {
        let len = self.targets.len();
        if len == 0 {
            return (Anchor::End, "empty-target", 0.3);
        }
        if let Some(index) = hint.index.filter(|_| self.index_trusted()) {
            let position = index.min(len);
            let anchor = if position == 0 {
                Anchor::Start
            } else {
                Anchor::After(position - 1)
            };
            return (anchor, "index", 0.7);
        }
        if let Some(under) = hint.under_heading.as_deref() {
            let related = self.bridge.translate(under).and_then(|target_id| {
                self.targets
                    .iter()
                    .rev()
                    .find(|u| u.is_heading() && u.id.as_deref() == Some(target_id))
            });
            let (heading, via, confidence) = match related {
                Some(h) => (Some(h), "heading", 0.6),
                None => (
                    self.targets.iter().rev().find(|u| u.is_heading()),
                    "last-heading",
                    0.4,
                ),
            };
            if let Some(heading) = heading {
                let last_child = self
                    .targets
                    .iter()
                    .rev()
                    .find(|u| u.parent_heading_id.is_some() && u.parent_heading_id == heading.id);
                let after = last_child.map_or(heading.index, |u| u.index.max(heading.index));
                return (Anchor::After(after), via, confidence);
            }
        }
        (Anchor::End, "end", 0.3)
    }
}

#[cfg(test)]
#[path = "tests/locate.rs"]
mod tests;
