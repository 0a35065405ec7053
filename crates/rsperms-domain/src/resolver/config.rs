//! Configuration for the permission resolver.

/// Configuration for the permission resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum group inheritance depth followed from a user's direct
    /// memberships.
    pub max_depth: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_depth: 25 }
    }
}

impl ResolverConfig {
    /// Sets the maximum inheritance depth.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}
