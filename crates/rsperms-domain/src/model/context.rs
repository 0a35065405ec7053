//! Context a permission query is evaluated in.

use chrono::{DateTime, Utc};

/// The server, world and instant a permission query is evaluated against.
///
/// A node scoped to a server or world only applies when the context names
/// the same server or world. Unscoped nodes apply everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    /// Server the query originates from.
    pub server: Option<String>,
    /// World the query originates from.
    pub world: Option<String>,
    /// Instant used to decide whether temporary nodes have expired.
    pub now: DateTime<Utc>,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self {
            server: None,
            world: None,
            now: Utc::now(),
        }
    }
}

impl QueryContext {
    /// Creates a global context evaluated at the current instant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Sets the world.
    pub fn with_world(mut self, world: impl Into<String>) -> Self {
        self.world = Some(world.into());
        self
    }

    /// Evaluates the context at a fixed instant.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}
