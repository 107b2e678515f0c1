//! Leading `---` metadata block of a markdown document.
//!
//! The block is kept as raw YAML text alongside the body so that a document whose metadata is
//! not touched is written back byte for byte.

use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// A document split into its metadata block and body.
pub struct Document {
    /// YAML between the `---` fences, without the fences.
    pub front_matter: Option<String>,
    /// Everything after the closing fence.
    pub body: String,
}

impl Document {
    #[must_use]
    /// Split off a leading `---` fenced block if the text starts with one.
    ///
    /// A leading byte order mark is dropped either way.
    pub fn split(text: &str) -> Self {
        let rest = text.strip_prefix('\u{feff}').unwrap_or(text);
        let Some(after_open) = rest
            .strip_prefix("---\n")
            .or_else(|| rest.strip_prefix("---\r\n"))
        else {
            return Self {
                front_matter: None,
                body: rest.to_string(),
            };
        };

        let mut offset = 0;
        for line in after_open.split_inclusive('\n') {
            if line.trim_end() == "---" {
                let yaml = after_open[..offset].trim_end().to_string();
                let body = after_open[offset + line.len()..]
                    .trim_start_matches(['\r', '\n'])
                    .to_string();
                return Self {
                    front_matter: Some(yaml),
                    body,
                };
            }
            offset += line.len();
        }

        // No closing fence: not front matter after all.
        Self {
            front_matter: None,
            body: rest.to_string(),
        }
    }

    /// Parse the metadata block into a YAML mapping (empty if absent).
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not a YAML mapping.
    pub fn metadata(&self) -> Result<Mapping> {
        match self.front_matter.as_deref().map(str::trim) {
            None | Some("") => Ok(Mapping::new()),
            Some(yaml) => match serde_yaml::from_str::<Value>(yaml)? {
                Value::Mapping(map) => Ok(map),
                Value::Null => Ok(Mapping::new()),
                other => {
                    let message = format!("expected a mapping, found {}", kind_name(&other));
                    Err(Error::FrontMatter(<serde_yaml::Error as serde::de::Error>::custom(
                        message,
                    )))
                }
            },
        }
    }

    /// Replace the metadata block with a serialised mapping; an empty mapping removes the block.
    ///
    /// # Errors
    ///
    /// Returns an error if the mapping cannot be serialised.
    pub fn set_metadata(&mut self, metadata: &Mapping) -> Result<()> {
        if metadata.is_empty() {
            self.front_matter = None;
        } else {
            let yaml = serde_yaml::to_string(metadata)?;
            self.front_matter = Some(yaml.trim_end().to_string());
        }
        Ok(())
    }

    #[must_use]
    /// Reassemble the document text.
    pub fn render(&self) -> String {
        match &self.front_matter {
            Some(yaml) if !yaml.trim().is_empty() => format!("---\n{yaml}\n---\n\n{}", self.body),
            Some(_) => format!("---\n---\n\n{}", self.body),
            None => self.body.clone(),
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
#[path = "tests/front_matter.rs"]
mod tests;
