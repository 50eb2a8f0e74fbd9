//! Character catalog: the `Character` record, its read-only repository and
//! the content-store loader.

pub mod catalog;
pub mod character;
pub mod repository;

pub use catalog::CatalogSource;
pub use character::Character;
pub use repository::{CharacterRepository, InMemoryCharacterRepository};
