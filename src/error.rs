//! Error types for decomposition, translation and patch application.

use thiserror::Error;

/// Errors that abort a synchronisation run.
///
/// A failed match is never an error: the locator degrades to a best-effort anchor instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The tree-sitter grammar could not be loaded into the parser.
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser produced no syntax tree for the input.
    #[error("failed to parse {what} into units")]
    Parse {
        /// Which document failed to parse.
        what: String,
    },

    /// The leading metadata block is not valid YAML.
    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    /// The translation capability failed for one edit.
    #[error("translation failed for edit {index}: {message}")]
    Translation {
        /// Position of the edit in the patch plan.
        index: usize,
        /// Reason reported by the translator.
        message: String,
    },

    /// A patch plan could not be applied to the target units.
    #[error("cannot apply patch: {0}")]
    Apply(String),

    /// Reading or writing a document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A patch plan file is not valid JSON.
    #[error("invalid patch plan: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
