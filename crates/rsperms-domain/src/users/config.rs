//! Configuration for the user resolution service.

/// Name of the group every user falls back to.
pub const DEFAULT_GROUP: &str = "default";

/// Configuration for the user resolution service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserManagerConfig {
    /// Group assigned to users that have none; also the baseline group for
    /// save elision.
    pub default_group: String,
}

impl Default for UserManagerConfig {
    fn default() -> Self {
        Self {
            default_group: DEFAULT_GROUP.to_string(),
        }
    }
}

impl UserManagerConfig {
    /// Sets the default group. Group names are stored lowercased.
    pub fn with_default_group(mut self, group: &str) -> Self {
        self.default_group = group.to_lowercase();
        self
    }
}
