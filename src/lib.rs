//! lockstep: keep a translated markdown document in step with its source.
//!
//! The source is decomposed into typed units, two revisions of it are diffed structurally, every
//! change is located inside the translation (whose headings and wording differ), and the batch
//! of replacements is applied without disturbing untouched content.
//!
//! ```no_run
//! use lockstep::config::Config;
//! use lockstep::sync::{synchronize, SyncRequest, TranslateError, TranslationRequest, Translator};
//!
//! struct Echo;
//!
//! impl Translator for Echo {
//!     fn translate(
//!         &mut self,
//!         request: &TranslationRequest<'_>,
//!     ) -> Result<Option<String>, TranslateError> {
//!         Ok(Some(request.text.to_string()))
//!     }
//! }
//!
//! let request = SyncRequest {
//!     old_source: "# Intro\n\nHello.\n",
//!     new_source: "# Intro\n\nHello there.\n",
//!     target: "# Einleitung\n\nHallo.\n",
//!     file_path: "docs/de/intro.md",
//!     source_lang: "en",
//!     target_lang: "de",
//!     glossary: None,
//! };
//! let text = synchronize(&request, &mut Echo, &Config::default())?;
//! # Ok::<(), lockstep::Error>(())
//! ```
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod decompose;
pub mod diff;
pub mod error;
pub mod formats;
pub mod front_matter;
pub mod heading_map;
pub mod locate;
pub mod matcher;
pub mod observer;
pub mod plan;
pub mod section;
pub mod sync;
pub mod unit;

pub use error::{Error, Result};
