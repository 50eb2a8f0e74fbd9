//! Read-only character repository.
//!
//! The catalog is loaded once at startup and then only read, so the
//! in-memory implementation holds no locks and is shared across requests as
//! `Arc<dyn CharacterRepository>`.

use std::collections::HashMap;

use super::character::Character;
use crate::utilities::errors::CatalogError;

/// Read-only access to the character catalog.
pub trait CharacterRepository: Send + Sync {
    /// All characters in catalog order. An empty catalog yields an empty vec.
    fn list(&self) -> Vec<Character>;

    /// Exact, case-sensitive lookup by name.
    fn get(&self, name: &str) -> Option<Character>;

    /// Case-insensitive substring search over name and description.
    ///
    /// Returns every match. Name matches come first, then description-only
    /// matches; catalog order is kept within each group.
    fn search(&self, query: &str) -> Vec<Character>;

    /// Number of characters in the catalog.
    fn len(&self) -> usize;

    /// Whether the catalog is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCharacterRepository {
    characters: Vec<Character>,
    index: HashMap<String, usize>,
}

impl InMemoryCharacterRepository {
    /// Build a repository, rejecting blank or duplicate names.
    ///
    /// Names are trimmed before indexing.
    pub fn new(characters: Vec<Character>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(characters.len());
        let mut normalized = Vec::with_capacity(characters.len());

        for (position, mut character) in characters.into_iter().enumerate() {
            let trimmed = character.name.trim().to_string();
            if trimmed.is_empty() {
                return Err(CatalogError::MissingName { position });
            }
            character.name = trimmed;
            if index.contains_key(&character.name) {
                return Err(CatalogError::DuplicateName {
                    name: character.name,
                });
            }
            index.insert(character.name.clone(), normalized.len());
            normalized.push(character);
        }

        Ok(Self {
            characters: normalized,
            index,
        })
    }

    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl CharacterRepository for InMemoryCharacterRepository {
    fn list(&self) -> Vec<Character> {
        self.characters.clone()
    }

    fn get(&self, name: &str) -> Option<Character> {
        self.index
            .get(name)
            .map(|&position| self.characters[position].clone())
    }

    fn search(&self, query: &str) -> Vec<Character> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let (by_name, rest): (Vec<&Character>, Vec<&Character>) = self
            .characters
            .iter()
            .partition(|c| c.name_matches(&needle));

        by_name
            .into_iter()
            .chain(rest.into_iter().filter(|c| c.description_matches(&needle)))
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.characters.len()
    }
}
