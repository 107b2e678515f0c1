//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! Specifically, we try to find a lockstep.toml, and if present we load settings from there.
//! This provides the matching thresholds, the unit granularity and the front matter key that
//! holds the heading alignment table. Every field has a default, so a partial file is fine.

use crate::decompose::Granularity;
use crate::error::{Error, Result};
use crate::matcher::{MatchOptions, TieBreak};
use facet::Facet;
use std::fs;
use std::path::Path;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "lockstep.toml";

#[derive(Facet, Clone, Debug)]
/// Engine preferences loaded from lockstep.toml or falling back to defaults.
pub struct Config {
    #[facet(default = 0.7)]
    /// Jaccard score a similarity match must exceed.
    pub similarity_threshold: f64,
    #[facet(default = 0.5)]
    /// Shortest/longest length ratio below which index hints are not trusted.
    pub min_length_ratio: f64,
    #[facet(default = 2)]
    /// Neighbouring units passed to the translator on each side of a change.
    pub context_window: usize,
    #[facet(default = "blocks".to_string())]
    /// Unit granularity: "blocks" or "sections".
    pub granularity: String,
    #[facet(default = "similarity".to_string())]
    /// First tie-break for context matches: "similarity" or "position".
    pub tie_break: String,
    #[facet(default = "heading-map".to_string())]
    /// Front matter key holding the heading alignment table.
    pub heading_map_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            min_length_ratio: 0.5,
            context_window: 2,
            granularity: "blocks".to_string(),
            tie_break: "similarity".to_string(),
            heading_map_key: "heading-map".to_string(),
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from lockstep.toml if present, else defaults.
    pub fn load() -> Self {
        match Self::load_from(Path::new(CONFIG_FILE)) {
            Ok(config) => config,
            Err(e) => {
                if Path::new(CONFIG_FILE).exists() {
                    tracing::warn!("ignoring {CONFIG_FILE}: {e}");
                }
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for this struct.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not describe a valid configuration, including an
    /// unknown `granularity` or `tie_break` value.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config =
            facet_toml::from_str::<Self>(contents).map_err(|e| Error::Config(e.to_string()))?;
        config.granularity()?;
        config.match_options()?;
        Ok(config)
    }

    /// Unit granularity.
    ///
    /// # Errors
    ///
    /// Returns an error unless the value is "blocks" or "sections".
    pub fn granularity(&self) -> Result<Granularity> {
        match self.granularity.as_str() {
            "blocks" => Ok(Granularity::Blocks),
            "sections" => Ok(Granularity::Sections),
            other => Err(Error::Config(format!(
                "granularity must be \"blocks\" or \"sections\", not {other:?}"
            ))),
        }
    }

    /// Matching parameters shared by the diff engine and the locator.
    ///
    /// # Errors
    ///
    /// Returns an error unless `tie_break` is "similarity" or "position".
    pub fn match_options(&self) -> Result<MatchOptions> {
        let tie_break = match self.tie_break.as_str() {
            "similarity" => TieBreak::Similarity,
            "position" => TieBreak::Position,
            other => {
                return Err(Error::Config(format!(
                    "tie_break must be \"similarity\" or \"position\", not {other:?}"
                )))
            }
        };
        Ok(MatchOptions {
            similarity_threshold: self.similarity_threshold,
            min_length_ratio: self.min_length_ratio,
            tie_break,
        })
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
