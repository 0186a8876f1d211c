//! Prompt configuration loaded from a JSON file.

use std::fs;
use std::io;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::error::SpriteError;

/// Everything needed to build prompts for one character.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PromptConfig {
    /// Style/quality prefix shared by every expression.
    pub base_prompt: String,
    /// Negative prompt sent with every request.
    pub negative_prompt: String,
    /// Appearance details appended to every prompt.
    pub character_details: String,
    /// Expression name to description, in file order.
    pub expressions: IndexMap<String, String>,
}

impl PromptConfig {
    /// Reads and parses the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, SpriteError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(SpriteError::ConfigNotFound(path.to_path_buf()));
            }
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                return Err(SpriteError::ConfigMalformed(
                    path.to_path_buf(),
                    err.to_string(),
                ));
            }
            Err(err) => return Err(SpriteError::Io(err)),
        };
        Self::from_json(&raw)
            .map_err(|err| SpriteError::ConfigMalformed(path.to_path_buf(), err.to_string()))
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Restricts `expressions` to the comma-separated names in `filter`.
///
/// No filter (or a blank one) keeps everything. The configuration's order is
/// kept regardless of the order names were requested in.
pub fn filter_expressions(
    expressions: &IndexMap<String, String>,
    filter: Option<&str>,
) -> Result<IndexMap<String, String>, SpriteError> {
    let Some(filter) = filter.filter(|filter| !filter.trim().is_empty()) else {
        return Ok(expressions.clone());
    };

    let requested: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    for name in requested.iter().filter(|name| !expressions.contains_key(**name)) {
        warn!("Requested expression {name:?} isn't in the prompt file, skipping it");
    }

    let filtered: IndexMap<String, String> = expressions
        .iter()
        .filter(|(name, _)| requested.contains(&name.as_str()))
        .map(|(name, description)| (name.clone(), description.clone()))
        .collect();

    if filtered.is_empty() {
        return Err(SpriteError::NoMatchingExpressions(filter.to_string()));
    }
    Ok(filtered)
}
