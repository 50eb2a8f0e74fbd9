//! Content-store loading for the character catalog.
//!
//! Accepts JSON or YAML, either as a bare list of characters or as an
//! object with a `characters` list.

use std::path::Path;

use serde::Deserialize;

use super::character::Character;
use super::repository::InMemoryCharacterRepository;
use crate::utilities::errors::CatalogError;

/// Catalog bundled with the binary.
const BUILTIN_CATALOG: &str = include_str!("../../data/characters.json");

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<Character>),
    Wrapped { characters: Vec<Character> },
}

impl CatalogDocument {
    fn into_characters(self) -> Vec<Character> {
        match self {
            CatalogDocument::List(characters) => characters,
            CatalogDocument::Wrapped { characters } => characters,
        }
    }
}

/// Source of the catalog at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The bundled catalog.
    Builtin,
    /// A `.json`, `.yaml` or `.yml` file.
    File(std::path::PathBuf),
}

impl CatalogSource {
    /// Load the catalog into an immutable repository.
    pub fn load(&self) -> Result<InMemoryCharacterRepository, CatalogError> {
        let characters = match self {
            CatalogSource::Builtin => parse_json(BUILTIN_CATALOG)?,
            CatalogSource::File(path) => load_file(path)?,
        };
        InMemoryCharacterRepository::new(characters)
    }
}

/// Parse a JSON catalog document.
pub fn parse_json(text: &str) -> Result<Vec<Character>, CatalogError> {
    let doc: CatalogDocument = serde_json::from_str(text)?;
    Ok(doc.into_characters())
}

/// Parse a YAML catalog document.
pub fn parse_yaml(text: &str) -> Result<Vec<Character>, CatalogError> {
    let doc: CatalogDocument = serde_yaml::from_str(text)?;
    Ok(doc.into_characters())
}

fn load_file(path: &Path) -> Result<Vec<Character>, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let characters = match extension.as_deref() {
        Some("json") => parse_json(&text)?,
        Some("yaml") | Some("yml") => parse_yaml(&text)?,
        other => {
            return Err(CatalogError::UnsupportedFormat {
                extension: other.unwrap_or("").to_string(),
            })
        }
    };

    tracing::info!(
        path = %path.display(),
        count = characters.len(),
        "Loaded character catalog from file"
    );
    Ok(characters)
}
