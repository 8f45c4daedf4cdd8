//! ID and token generation.

use ulid::Ulid;
use uuid::Uuid;

/// Generator for entity ids and bearer tokens.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new entity id.
    ///
    /// Ids are lowercase ULIDs: 26 characters, sortable by creation time.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an opaque bearer token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // v4 has no time component, unlike the entity ids
        Uuid::new_v4().simple().to_string()
    }
}
