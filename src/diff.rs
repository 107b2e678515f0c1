//! Structural diff between two revisions of the same document.
//!
//! Every unit of the new revision, in order, is matched against the old one with the cascade of
//! [`crate::matcher`]; each match claims its old unit at once. Unmatched new units are
//! additions, matched pairs whose text changed are modifications, and old units nobody claimed
//! are deletions. The output order is fixed: additions and modifications in new-revision order,
//! then deletions in old-revision order.

use crate::matcher::{find, Claims, MatchOptions, Probe};
use crate::observer::{NullObserver, Observer};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Classification of a difference between two revisions.
pub enum ChangeKind {
    /// Present only in the new revision.
    Added,
    /// Present in both with different text.
    Modified,
    /// Present only in the old revision.
    Deleted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Where an added unit sat in the new revision.
pub struct InsertionHint {
    /// Id of the enclosing heading.
    pub under_heading: Option<String>,
    /// Position in the new revision.
    pub index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One classified difference between two unit sequences.
pub struct Change {
    /// Added, modified or deleted.
    pub kind: ChangeKind,
    /// Unit in the old revision (modified and deleted).
    pub old_unit: Option<Unit>,
    /// Unit in the new revision (added and modified).
    pub new_unit: Option<Unit>,
    /// Heading id used for later lookup.
    pub anchor: Option<String>,
    /// Placement of an added unit.
    pub insertion_hint: Option<InsertionHint>,
}

impl Change {
    #[must_use]
    /// An addition of `unit`, hinted at its position and context in the new revision.
    pub fn added(unit: &Unit) -> Self {
        Self {
            kind: ChangeKind::Added,
            old_unit: None,
            new_unit: Some(unit.clone()),
            anchor: unit.anchor(),
            insertion_hint: Some(InsertionHint {
                under_heading: unit.parent_heading_id.clone(),
                index: Some(unit.index),
            }),
        }
    }

    #[must_use]
    /// A modification from `old` to `new`.
    pub fn modified(old: &Unit, new: &Unit) -> Self {
        Self {
            kind: ChangeKind::Modified,
            old_unit: Some(old.clone()),
            new_unit: Some(new.clone()),
            anchor: new.anchor(),
            insertion_hint: None,
        }
    }

    #[must_use]
    /// A deletion of `unit`.
    pub fn deleted(unit: &Unit) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            old_unit: Some(unit.clone()),
            new_unit: None,
            anchor: unit.anchor(),
            insertion_hint: None,
        }
    }
}

#[must_use]
/// Diff with default options and no telemetry.
pub fn diff_units(old: &[Unit], new: &[Unit]) -> Vec<Change> {
    diff(old, new, &MatchOptions::default(), &NullObserver)
}

#[must_use]
/// Classify every unit of `new` against `old`.
pub fn diff(
    old: &[Unit],
    new: &[Unit],
    options: &MatchOptions,
    observer: &dyn Observer,
) -> Vec<Change> {
    let mut claims = Claims::new(old.len());
    let mut changes = Vec::new();

    for unit in new {
        match find(&Probe::same_space(unit), old, &claims, options, observer) {
            Some(found) => {
                claims.claim(found.index);
                let before = &old[found.index];
                if before.text.trim() != unit.text.trim() {
                    changes.push(Change::modified(before, unit));
                }
            }
            None => changes.push(Change::added(unit)),
        }
    }
    changes.extend(
        old.iter()
            .filter(|u| claims.is_free(u.index))
            .map(Change::deleted),
    );
    changes
}

#[cfg(test)]
#[path = "tests/diff.rs"]
mod tests;
