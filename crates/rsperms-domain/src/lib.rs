//! rsperms-domain: Core permission cache and user resolution logic
//!
//! This crate contains the core logic including:
//! - Permission nodes, identifiers, users and groups
//! - The generic identity-keyed cache shared by users and groups
//! - The user resolution service (lookup, default-group repair, save elision,
//!   presence cleanup, bulk refresh)
//! - Effective permission resolution through group inheritance
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               rsperms-domain                 │
//! ├─────────────────────────────────────────────┤
//! │  model/     - Node, identifiers, entities   │
//! │  cache/     - Identity-keyed entity cache   │
//! │  users/     - User resolution service       │
//! │  resolver/  - Effective permission checks   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod error;
pub mod model;
pub mod resolver;
pub mod users;

// Re-export commonly used types at the crate root
pub use cache::{GroupCache, IdentityCache, UserCache};
pub use error::{DomainError, DomainResult};
pub use model::{Group, Node, QueryContext, User, UserIdentifier, UserSnapshot};
pub use resolver::{PermissionResolver, ResolverConfig, Tristate};
pub use users::{UserManager, UserManagerConfig, DEFAULT_GROUP};
