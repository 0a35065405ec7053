//! User identifiers.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Addressing key for a cached user.
///
/// Combines the stable unique id with an optional display name. Only the
/// unique id takes part in equality and hashing, so a user can be addressed
/// before (or without) knowing their name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentifier {
    unique_id: Uuid,
    display_name: Option<String>,
}

impl UserIdentifier {
    /// Creates an identifier from a unique id alone.
    pub fn of(unique_id: Uuid) -> Self {
        Self {
            unique_id,
            display_name: None,
        }
    }

    /// Creates an identifier carrying a display name.
    pub fn named(unique_id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            unique_id,
            display_name: Some(display_name.into()),
        }
    }

    /// Returns the unique id.
    pub fn unique_id(&self) -> Uuid {
        self.unique_id
    }

    /// Returns the display name, if known.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl PartialEq for UserIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id == other.unique_id
    }
}

impl Eq for UserIdentifier {}

impl Hash for UserIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_id.hash(state);
    }
}

impl From<Uuid> for UserIdentifier {
    fn from(unique_id: Uuid) -> Self {
        Self::of(unique_id)
    }
}

impl fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} ({})", name, self.unique_id),
            None => write!(f, "{}", self.unique_id),
        }
    }
}
