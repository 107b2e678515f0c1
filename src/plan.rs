//! The patch plan carries located changes and their replacement text to the target document.
//!
//! A plan is serialisable so that the translation step can happen out of process: the plan is
//! written with empty replacements, filled in by whatever produces translations, and applied.
//! Application never shifts indices: every target unit keeps a fixed slot, deletions leave a
//! tombstone, insertions queue behind their anchor slot, and one ordered merge at the end
//! produces the new unit sequence.

use crate::decompose::{context_of, join_blocks, Context};
use crate::error::{Error, Result};
use crate::locate::{Anchor, EditStrategy, Mapping};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Serialisable batch of edits against one target document.
pub struct PatchPlan {
    /// Target document path, for tracking and debugging.
    pub file: String,
    /// Edits in the order the changes were located.
    pub edits: Vec<PlannedEdit>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// One operation on the target document with the material needed to translate it.
pub struct PlannedEdit {
    /// Replace, insert or delete.
    pub strategy: EditStrategy,
    /// Target unit index for replacements and deletions.
    pub target: Option<usize>,
    /// Insertion point for inserts.
    pub anchor: Option<Anchor>,
    /// Changed source text (the old text for deletions).
    pub source_text: String,
    /// Source text preceding the change.
    pub context_before: String,
    /// Source text following the change.
    pub context_after: String,
    /// Translated text; `None` skips the edit.
    pub replacement: Option<String>,
    /// Informational confidence carried over from the mapping.
    pub confidence: f64,
}

impl PlannedEdit {
    #[must_use]
    /// Whether this edit needs replacement text before it can be applied.
    pub fn needs_text(&self) -> bool {
        self.strategy != EditStrategy::Delete
    }
}

impl PatchPlan {
    #[must_use]
    /// Build a plan from located mappings, with `window` units of source context per edit.
    pub fn from_mappings(file: &str, mappings: &[Mapping], new_units: &[Unit], window: usize) -> Self {
        let edits = mappings
            .iter()
            .map(|mapping| {
                let change = &mapping.change;
                let (source_text, context) = match (&change.new_unit, &change.old_unit) {
                    (Some(unit), _) if mapping.strategy != EditStrategy::Delete => {
                        (unit.text.clone(), context_of(new_units, unit, window))
                    }
                    (_, Some(unit)) => (unit.text.clone(), Context::default()),
                    (Some(unit), None) => (unit.text.clone(), Context::default()),
                    (None, None) => (String::new(), Context::default()),
                };
                PlannedEdit {
                    strategy: mapping.strategy,
                    target: mapping.target,
                    anchor: mapping.anchor,
                    source_text,
                    context_before: context.before_text(),
                    context_after: context.after_text(),
                    replacement: None,
                    confidence: mapping.confidence,
                }
            })
            .collect();
        Self {
            file: file.to_string(),
            edits,
        }
    }

    /// Apply the plan to the target units and reconstruct the document text.
    ///
    /// # Errors
    ///
    /// Returns an error if a replacement or deletion names a missing target unit, or if one
    /// target unit is edited twice. Nothing is applied in that case.
    pub fn apply(&self, targets: &[Unit]) -> Result<String> {
        apply(targets, self)
    }
}

/// A target unit's fixed position during application.
struct Slot<'a> {
    text: &'a str,
    live: bool,
    touched: bool,
}

/// Apply every edit of `plan` to `targets` as one batch and reconstruct the text.
///
/// Replacements and insertions without replacement text are skipped. An insertion whose anchor
/// slot does not exist is appended at the end.
///
/// # Errors
///
/// Returns an error if a replacement or deletion names a missing target unit, or if one target
/// unit is edited twice.
pub fn apply(targets: &[Unit], plan: &PatchPlan) -> Result<String> {
    let mut slots: Vec<Slot<'_>> = targets
        .iter()
        .map(|u| Slot {
            text: &u.text,
            live: true,
            touched: false,
        })
        .collect();
    let mut at_start: Vec<&str> = Vec::new();
    let mut after: Vec<Vec<&str>> = vec![Vec::new(); slots.len()];
    let mut at_end: Vec<&str> = Vec::new();

    for (n, edit) in plan.edits.iter().enumerate() {
        match edit.strategy {
            EditStrategy::ExactMatch => {
                let Some(text) = edit.replacement.as_deref() else {
                    continue;
                };
                let slot = slot_for(&mut slots, edit.target, n)?;
                slot.text = text;
            }
            EditStrategy::Delete => {
                let slot = slot_for(&mut slots, edit.target, n)?;
                slot.live = false;
            }
            EditStrategy::Insert => {
                let Some(text) = edit.replacement.as_deref() else {
                    continue;
                };
                match edit.anchor.unwrap_or(Anchor::End) {
                    Anchor::Start => at_start.push(text),
                    Anchor::After(i) if i < after.len() => after[i].push(text),
                    Anchor::After(_) | Anchor::End => at_end.push(text),
                }
            }
        }
    }

    let merged = at_start
        .into_iter()
        .chain(
            slots
                .iter()
                .zip(after)
                .flat_map(|(slot, queued)| slot.live.then_some(slot.text).into_iter().chain(queued)),
        )
        .chain(at_end);
    Ok(join_blocks(merged))
}

fn slot_for<'s, 'a>(
    slots: &'s mut [Slot<'a>],
    target: Option<usize>,
    edit: usize,
) -> Result<&'s mut Slot<'a>> {
    let index = target.ok_or_else(|| Error::Apply(format!("edit {edit} has no target unit")))?;
    let len = slots.len();
    let slot = slots.get_mut(index).ok_or_else(|| {
        Error::Apply(format!(
            "edit {edit} targets unit {index} but the document has {len}"
        ))
    })?;
    if slot.touched {
        return Err(Error::Apply(format!(
            "edit {edit} targets unit {index}, which is already edited"
        )));
    }
    slot.touched = true;
    Ok(slot)
}

#[cfg(test)]
#[path = "tests/plan.rs"]
mod tests;
