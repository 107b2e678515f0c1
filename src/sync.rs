//! One synchronisation run: re-project source changes onto a translated document.
//!
//! The run reads three snapshots (old source, new source, current translation), computes the
//! structural diff of the source, locates every change in the translation, asks the injected
//! [`Translator`] for replacement text one edit at a time, applies the whole batch, and finally
//! maintains the heading alignment table in the translation's front matter. Any failure before
//! the result is assembled leaves the caller with the original translation untouched.

use crate::config::Config;
use crate::decompose::{decompose, decompose_with};
use crate::diff::{diff, Change};
use crate::error::{Error, Result};
use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::front_matter::Document;
use crate::heading_map::{is_congruent, prune, update, HeadingMap};
use crate::locate::{HeadingBridge, Locator};
use crate::observer::{Observer, TracingObserver};
use crate::plan::PatchPlan;
use crate::section::outline;
use crate::unit::Unit;
use std::collections::BTreeMap;
use std::fmt;

/// Preferred translations for terms, source term to target term.
pub type Glossary = BTreeMap<String, String>;

#[derive(Clone, Copy, Debug)]
/// Everything the caller supplies for one run.
pub struct SyncRequest<'a> {
    /// Previous revision of the source document.
    pub old_source: &'a str,
    /// Current revision of the source document.
    pub new_source: &'a str,
    /// Current translation, including its front matter.
    pub target: &'a str,
    /// Path of the translation, for diagnostics.
    pub file_path: &'a str,
    /// Source language code.
    pub source_lang: &'a str,
    /// Target language code.
    pub target_lang: &'a str,
    /// Terminology the translator should respect.
    pub glossary: Option<&'a Glossary>,
}

#[derive(Clone, Copy, Debug)]
/// What the translator receives for one edit.
pub struct TranslationRequest<'a> {
    /// The changed source text, and nothing else.
    pub text: &'a str,
    /// Source text just before the change.
    pub context_before: &'a str,
    /// Source text just after the change.
    pub context_after: &'a str,
    /// Source language code.
    pub source_lang: &'a str,
    /// Target language code.
    pub target_lang: &'a str,
    /// Terminology to respect.
    pub glossary: Option<&'a Glossary>,
    /// Path of the translation being updated.
    pub file_path: &'a str,
}

#[derive(Debug)]
/// Failure reported by a translator.
pub struct TranslateError(pub String);

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TranslateError {}

/// The translation capability.
pub trait Translator {
    /// Translate one changed unit; `Ok(None)` means there is nothing to write for it.
    ///
    /// # Errors
    ///
    /// Any error aborts the run before anything is applied.
    fn translate(
        &mut self,
        request: &TranslationRequest<'_>,
    ) -> std::result::Result<Option<String>, TranslateError>;
}

impl<F> Translator for F
where
    F: FnMut(&TranslationRequest<'_>) -> std::result::Result<Option<String>, TranslateError>,
{
    fn translate(
        &mut self,
        request: &TranslationRequest<'_>,
    ) -> std::result::Result<Option<String>, TranslateError> {
        self(request)
    }
}

#[derive(Clone, Debug)]
/// Result of a completed run.
pub struct SyncOutcome {
    /// The reconstructed translation, front matter included.
    pub text: String,
    /// Changes found between the two source revisions.
    pub changes: Vec<Change>,
    /// Edits applied to the translation.
    pub applied: usize,
    /// Edits dropped: unmatched deletions and edits the translator returned nothing for.
    pub skipped: usize,
    /// Heading alignment table after maintenance.
    pub heading_map: HeadingMap,
}

/// Runs synchronisations with one configuration.
pub struct Synchronizer {
    config: Config,
    format: Box<dyn Format>,
    observer: Box<dyn Observer>,
}

impl Synchronizer {
    #[must_use]
    /// Markdown synchroniser reporting through `tracing`.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            format: Box::new(MarkdownFormat),
            observer: Box::new(TracingObserver),
        }
    }

    #[must_use]
    /// Replace the telemetry sink.
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    /// Replace the document format.
    pub fn with_format(mut self, format: Box<dyn Format>) -> Self {
        self.format = format;
        self
    }

    /// Plan the edits for a request without translating anything.
    ///
    /// Returns the plan and the source changes it was built from.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a document cannot be decomposed or the
    /// front matter is malformed.
    pub fn plan(&self, request: &SyncRequest<'_>) -> Result<(PatchPlan, Vec<Change>)> {
        let prepared = self.prepare(request)?;
        Ok((prepared.plan, prepared.changes))
    }

    fn prepare(&self, request: &SyncRequest<'_>) -> Result<Prepared> {
        let granularity = self.config.granularity()?;
        let options = self.config.match_options()?;
        let format = self.format.as_ref();

        let old = decompose_with(&Document::split(request.old_source).body, format, granularity)?;
        let new = decompose_with(&Document::split(request.new_source).body, format, granularity)?;
        let document = Document::split(request.target);
        let targets = decompose_with(&document.body, format, granularity)?;
        let table = HeadingMap::load(&document, &self.config.heading_map_key)?;

        let changes = diff(&old, &new, &options, self.observer.as_ref());
        let bridge = HeadingBridge::new(&[old.as_slice(), new.as_slice()], &targets, &table);
        let locator = Locator::new(&targets, &bridge, new.len(), options, self.observer.as_ref());
        let mappings = locator.locate_all(&changes);
        tracing::debug!(
            file = request.file_path,
            changes = changes.len(),
            mapped = mappings.len(),
            "located changes"
        );

        let plan = PatchPlan::from_mappings(
            request.file_path,
            &mappings,
            &new,
            self.config.context_window,
        );
        Ok(Prepared {
            document,
            table,
            targets,
            plan,
            dropped: changes.len() - mappings.len(),
            changes,
        })
    }

    /// Run one synchronisation.
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be decomposed, the translator fails, the batch
    /// cannot be applied or the front matter cannot be rewritten. No partial result is returned.
    pub fn run(
        &self,
        request: &SyncRequest<'_>,
        translator: &mut dyn Translator,
    ) -> Result<SyncOutcome> {
        let Prepared {
            mut document,
            table,
            targets,
            mut plan,
            changes,
            dropped,
        } = self.prepare(request)?;

        if changes.is_empty() {
            return Ok(SyncOutcome {
                text: request.target.to_string(),
                changes,
                applied: 0,
                skipped: 0,
                heading_map: table,
            });
        }

        for (index, edit) in plan.edits.iter_mut().enumerate() {
            if !edit.needs_text() {
                continue;
            }
            let translated = translator
                .translate(&TranslationRequest {
                    text: &edit.source_text,
                    context_before: &edit.context_before,
                    context_after: &edit.context_after,
                    source_lang: request.source_lang,
                    target_lang: request.target_lang,
                    glossary: request.glossary,
                    file_path: request.file_path,
                })
                .map_err(|e| Error::Translation {
                    index,
                    message: e.to_string(),
                })?;
            edit.replacement = translated;
        }

        let body = plan.apply(&targets)?;
        let applied = plan
            .edits
            .iter()
            .filter(|e| !e.needs_text() || e.replacement.is_some())
            .count();
        let skipped = dropped + plan.edits.len() - applied;

        let format = self.format.as_ref();
        let source_outline = outline(&decompose(&Document::split(request.new_source).body, format)?);
        let target_outline = outline(&decompose(&body, format)?);
        let heading_map = if is_congruent(&source_outline, &target_outline) {
            update(&table, &source_outline, &target_outline, None)
        } else {
            tracing::debug!(
                file = request.file_path,
                "outlines differ in shape, pruning heading map only"
            );
            prune(&table, &source_outline, None)
        };

        document.body = body;
        heading_map.store(&mut document, &self.config.heading_map_key)?;

        Ok(SyncOutcome {
            text: document.render(),
            changes,
            applied,
            skipped,
            heading_map,
        })
    }
}

/// Intermediate state of a run, before translation.
struct Prepared {
    document: Document,
    table: HeadingMap,
    targets: Vec<Unit>,
    plan: PatchPlan,
    changes: Vec<Change>,
    dropped: usize,
}

/// Run one synchronisation with a markdown synchroniser.
///
/// # Errors
///
/// See [`Synchronizer::run`].
pub fn synchronize(
    request: &SyncRequest<'_>,
    translator: &mut dyn Translator,
    config: &Config,
) -> Result<String> {
    Synchronizer::new(config.clone())
        .run(request, translator)
        .map(|outcome| outcome.text)
}

#[cfg(test)]
#[path = "tests/sync.rs"]
mod tests;
