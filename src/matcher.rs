//! Ordered matching strategies shared by the diff engine and the target locator.
//!
//! Each strategy is a plain function from a probe unit and a candidate sequence to an optional
//! match. [`CASCADE`] lists them in precedence order: identity, context, position, similarity.
//! [`find`] runs the whole cascade for one probe and the first strategy that matches wins.
//! Keyed units (headings) only ever match by identity.

use crate::observer::{Event, Observer};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// How a probe unit was matched to a candidate.
pub enum Strategy {
    /// Same id and kind.
    Identity,
    /// Same enclosing heading and kind.
    Context,
    /// Same sequence index and kind.
    Position,
    /// Word-set similarity above the threshold.
    Similarity,
}

impl Strategy {
    #[must_use]
    /// Confidence attributed to a match found by this strategy.
    pub fn confidence(self) -> f64 {
        match self {
            Strategy::Identity => 1.0,
            Strategy::Context => 0.9,
            Strategy::Similarity => 0.8,
            Strategy::Position => 0.6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which criterion decides first between several context candidates.
pub enum TieBreak {
    /// Highest similarity first, then nearest index.
    Similarity,
    /// Nearest index first, then highest similarity.
    Position,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Tunable matching parameters.
pub struct MatchOptions {
    /// A similarity match must score strictly above this.
    pub similarity_threshold: f64,
    /// Below this shortest/longest length ratio, index hints are not trusted.
    pub min_length_ratio: f64,
    /// Ordering used to choose among several context candidates.
    pub tie_break: TieBreak,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            min_length_ratio: 0.5,
            tie_break: TieBreak::Similarity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Enclosing heading of a probe, expressed in the candidates' id space.
pub enum Parent {
    /// Not under any depth 1 or 2 heading.
    Root,
    /// Under the heading with this id.
    Heading(String),
    /// Under a heading with no known counterpart among the candidates.
    Unknown,
}

#[derive(Clone, Debug)]
/// A unit to be matched, with its id and context translated into the candidates' id space.
pub struct Probe<'a> {
    /// The unit being matched.
    pub unit: &'a Unit,
    /// Id to look for, if the unit has one with a known counterpart.
    pub id: Option<String>,
    /// Context to look in.
    pub parent: Parent,
    /// Whether the candidate at the same index may be taken.
    pub positional: bool,
}

impl<'a> Probe<'a> {
    #[must_use]
    /// A probe into a sequence that shares the unit's id space.
    pub fn same_space(unit: &'a Unit) -> Self {
        Self {
            unit,
            id: unit.id.clone(),
            parent: unit
                .parent_heading_id
                .clone()
                .map_or(Parent::Root, Parent::Heading),
            positional: true,
        }
    }

    fn keyed(&self) -> bool {
        self.unit.id.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A candidate chosen for a probe.
pub struct Match {
    /// Index of the candidate.
    pub index: usize,
    /// Strategy that found it.
    pub strategy: Strategy,
    /// Similarity score where one was computed.
    pub score: Option<f64>,
}

/// Candidates already taken by an earlier probe.
pub struct Claims {
    taken: Vec<bool>,
}

impl Claims {
    #[must_use]
    /// Nothing claimed among `len` candidates.
    pub fn new(len: usize) -> Self {
        Self {
            taken: vec![false; len],
        }
    }

    #[must_use]
    /// Whether candidate `index` is still available.
    pub fn is_free(&self, index: usize) -> bool {
        self.taken.get(index).is_some_and(|t| !t)
    }

    /// Mark candidate `index` as taken.
    pub fn claim(&mut self, index: usize) {
        if let Some(slot) = self.taken.get_mut(index) {
            *slot = true;
        }
    }
}

/// Signature shared by all strategies.
pub type Matcher = fn(&Probe<'_>, &[Unit], &Claims, &MatchOptions) -> Option<Match>;

/// Strategies in precedence order.
pub const CASCADE: [(Strategy, Matcher); 4] = [
    (Strategy::Identity, by_identity),
    (Strategy::Context, by_context),
    (Strategy::Position, by_position),
    (Strategy::Similarity, by_similarity),
];

/// Run a single strategy for one probe.
pub fn attempt(
    strategy: Strategy,
    probe: &Probe<'_>,
    candidates: &[Unit],
    claims: &Claims,
    options: &MatchOptions,
    observer: &dyn Observer,
) -> Option<Match> {
    let (_, matcher) = CASCADE.iter().find(|(s, _)| *s == strategy)?;
    observer.on_event(&Event::MatchAttempted {
        strategy,
        probe: probe.unit.index,
    });
    let found = matcher(probe, candidates, claims, options)?;
    observer.on_event(&Event::MatchSucceeded {
        strategy,
        probe: probe.unit.index,
        found: found.index,
        score: found.score,
    });
    Some(found)
}

/// Run the full cascade for one probe; the first strategy that matches wins.
pub fn find(
    probe: &Probe<'_>,
    candidates: &[Unit],
    claims: &Claims,
    options: &MatchOptions,
    observer: &dyn Observer,
) -> Option<Match> {
    let found = CASCADE
        .iter()
        .find_map(|(strategy, _)| attempt(*strategy, probe, candidates, claims, options, observer));
    if found.is_none() {
        observer.on_event(&Event::MatchFailed {
            probe: probe.unit.index,
        });
    }
    found
}

fn by_identity(
    probe: &Probe<'_>,
    candidates: &[Unit],
    claims: &Claims,
    _options: &MatchOptions,
) -> Option<Match> {
    let id = probe.id.as_deref()?;
    candidates
        .iter()
        .find(|c| claims.is_free(c.index) && c.kind == probe.unit.kind && c.id.as_deref() == Some(id))
        .map(|c| Match {
            index: c.index,
            strategy: Strategy::Identity,
            score: None,
        })
}

fn by_context(
    probe: &Probe<'_>,
    candidates: &[Unit],
    claims: &Claims,
    options: &MatchOptions,
) -> Option<Match> {
    // Headings open contexts rather than sit in them.
    if probe.keyed() {
        return None;
    }
    let parent = match &probe.parent {
        Parent::Root => None,
        Parent::Heading(id) => Some(id.as_str()),
        Parent::Unknown => return None,
    };
    let pool: Vec<&Unit> = candidates
        .iter()
        .filter(|c| {
            claims.is_free(c.index)
                && c.kind == probe.unit.kind
                && c.parent_heading_id.as_deref() == parent
        })
        .collect();

    match pool.as_slice() {
        [] => None,
        [only] => Some(Match {
            index: only.index,
            strategy: Strategy::Context,
            score: None,
        }),
        several => {
            let probe_tokens = tokens(&probe.unit.text);
            let scored = several.iter().map(|c| {
                let score = jaccard_sets(&probe_tokens, &tokens(&c.text));
                (c.index, score, c.index.abs_diff(probe.unit.index))
            });
            let best = scored.min_by(|a, b| {
                let by_score = b.1.total_cmp(&a.1);
                let by_distance = a.2.cmp(&b.2);
                let ordering = match options.tie_break {
                    TieBreak::Similarity => by_score.then(by_distance),
                    TieBreak::Position => by_distance.then(by_score),
                };
                ordering.then(a.0.cmp(&b.0))
            })?;
            Some(Match {
                index: best.0,
                strategy: Strategy::Context,
                score: Some(best.1),
            })
        }
    }
}

fn by_position(
    probe: &Probe<'_>,
    candidates: &[Unit],
    claims: &Claims,
    _options: &MatchOptions,
) -> Option<Match> {
    if probe.keyed() || !probe.positional {
        return None;
    }
    let candidate = candidates.get(probe.unit.index)?;
    (claims.is_free(candidate.index) && candidate.kind == probe.unit.kind).then_some(Match {
        index: candidate.index,
        strategy: Strategy::Position,
        score: None,
    })
}

fn by_similarity(
    probe: &Probe<'_>,
    candidates: &[Unit],
    claims: &Claims,
    options: &MatchOptions,
) -> Option<Match> {
    if probe.keyed() {
        return None;
    }
    let probe_tokens = tokens(&probe.unit.text);
    let mut best: Option<(usize, f64)> = None;
    for candidate in candidates
        .iter()
        .filter(|c| claims.is_free(c.index) && c.kind == probe.unit.kind)
    {
        let score = jaccard_sets(&probe_tokens, &tokens(&candidate.text));
        let better = match best {
            None => true,
            Some((index, top)) => {
                score > top
                    || (score == top
                        && candidate.index.abs_diff(probe.unit.index)
                            < index.abs_diff(probe.unit.index))
            }
        };
        if better {
            best = Some((candidate.index, score));
        }
    }
    let (index, score) = best?;
    (score > options.similarity_threshold).then_some(Match {
        index,
        strategy: Strategy::Similarity,
        score: Some(score),
    })
}

fn tokens(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

fn jaccard_sets(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(b).count();
    let total = a.union(b).count();
    #[allow(clippy::cast_precision_loss)]
    let score = shared as f64 / total as f64;
    score
}

#[must_use]
/// Jaccard similarity of the lower-cased whitespace-separated word sets of two texts.
pub fn jaccard(a: &str, b: &str) -> f64 {
    jaccard_sets(&tokens(a), &tokens(b))
}

#[cfg(test)]
#[path = "tests/matcher.rs"]
mod tests;
