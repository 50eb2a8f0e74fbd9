//! The `Character` record served by the catalog and used as chat persona.

use serde::{Deserialize, Serialize};

/// A fictional persona with fixed descriptive metadata.
///
/// Identity is the `name`. Records are loaded once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Unique, case-sensitive character name.
    pub name: String,
    /// Lore description; also used to bias chat responses.
    #[serde(default)]
    pub description: String,
    /// Image reference (URI string).
    #[serde(default)]
    pub image: String,
    /// Names of related characters, in catalog order.
    ///
    /// Informational only: entries may name characters that are not in the
    /// catalog.
    #[serde(default)]
    pub relationships: Vec<String>,
}

impl Character {
    /// Create a character with no image and no relationships.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: String::new(),
            relationships: Vec::new(),
        }
    }

    /// Builder-style image setter.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Builder-style relationships setter.
    pub fn with_relationships<I, S>(mut self, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationships = relationships.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `query` (already lowercased) occurs in the name.
    pub(crate) fn name_matches(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
    }

    /// Whether `query` (already lowercased) occurs in the description.
    pub(crate) fn description_matches(&self, query_lower: &str) -> bool {
        self.description.to_lowercase().contains(query_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let c: Character = serde_json::from_str(r#"{"name": "Misty Olszewski"}"#).unwrap();
        assert_eq!(c.name, "Misty Olszewski");
        assert!(c.description.is_empty());
        assert!(c.image.is_empty());
        assert!(c.relationships.is_empty());
    }

    #[test]
    fn test_relationships_keep_order_and_unknown_names() {
        let c = Character::new("V", "Merc")
            .with_relationships(["Jackie Welles", "Nobody In Catalog", "Johnny Silverhand"]);
        assert_eq!(
            c.relationships,
            vec!["Jackie Welles", "Nobody In Catalog", "Johnny Silverhand"]
        );
    }

    #[test]
    fn test_serialize_shape() {
        let c = Character::new("Judy Alvarez", "BD tech").with_image("https://img/judy.png");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["name"], "Judy Alvarez");
        assert_eq!(json["image"], "https://img/judy.png");
        assert!(json["relationships"].as_array().unwrap().is_empty());
    }
}
