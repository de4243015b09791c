//! Logical variables.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named logical unknown, unified across every predicate that binds it.
///
/// Identity is carried entirely by the id: two `Variable` values denote the
/// same logical slot iff their ids are equal, regardless of display name.
/// Fresh ids are minted by the caller's query-construction scope (see
/// [`crate::builder::var`]); the compiler only ever compares them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    id: Uuid,
    name: String,
}

impl Variable {
    /// Creates a variable with an explicit id.
    ///
    /// Id uniqueness is the caller's responsibility.
    #[must_use]
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Variable {
            id,
            name: name.into(),
        }
    }

    /// Returns the opaque identity token.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the display label used for output columns.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

// Identity by id only: the display name is presentation, not identity.
impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}
