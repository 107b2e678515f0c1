//! Telemetry sink for the matching and anchoring steps.
//!
//! The engine reports what it tried and what it settled on through an [`Observer`], so the
//! matching code stays free of logging. The default observer forwards everything to `tracing`.

use crate::locate::Anchor;
use crate::matcher::Strategy;

#[derive(Clone, Debug, PartialEq)]
/// Something the engine did that an observer may want to record.
pub enum Event<'a> {
    /// A strategy was tried for the unit at `probe` of the probing sequence.
    MatchAttempted {
        /// Strategy being tried.
        strategy: Strategy,
        /// Index of the unit being matched.
        probe: usize,
    },
    /// A strategy found a candidate.
    MatchSucceeded {
        /// Strategy that matched.
        strategy: Strategy,
        /// Index of the unit being matched.
        probe: usize,
        /// Index of the matched candidate.
        found: usize,
        /// Similarity score where one was computed.
        score: Option<f64>,
    },
    /// Every strategy failed for the unit.
    MatchFailed {
        /// Index of the unit being matched.
        probe: usize,
    },
    /// An insertion point was chosen in the target document.
    InsertionResolved {
        /// Where the new unit goes.
        anchor: Anchor,
        /// How the anchor was chosen.
        via: &'a str,
        /// Confidence given to the resulting mapping.
        confidence: f64,
    },
}

/// Receives engine events.
pub trait Observer {
    /// Record one event.
    fn on_event(&self, event: &Event<'_>);
}

/// Forwards events to `tracing` at trace (attempts) and debug (outcomes) level.
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &Event<'_>) {
        match event {
            Event::MatchAttempted { strategy, probe } => {
                tracing::trace!(?strategy, probe, "match attempted");
            }
            Event::MatchSucceeded {
                strategy,
                probe,
                found,
                score,
            } => {
                tracing::debug!(?strategy, probe, found, ?score, "match succeeded");
            }
            Event::MatchFailed { probe } => {
                tracing::debug!(probe, "no match");
            }
            Event::InsertionResolved {
                anchor,
                via,
                confidence,
            } => {
                tracing::debug!(?anchor, via, confidence, "insertion resolved");
            }
        }
    }
}

/// Discards every event.
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_event(&self, _event: &Event<'_>) {}
}
