//! User resolution service.
//!
//! [`UserManager`] sits on top of the user [`IdentityCache`](crate::cache::IdentityCache)
//! and orchestrates:
//! - Lookup by display name (case-insensitive, cache-local) and by unique id
//! - Default-group repair for users holding no group
//! - Save elision for users indistinguishable from the default baseline
//! - Presence-based unloading
//! - Bulk reload of every connected user
//!
//! # Execution contexts
//!
//! ```text
//!  primary (serial)                 background (I/O)
//!  ────────────────                 ────────────────
//!  refresh_active_users()
//!    └─ snapshot present ids ──────▶ load_user(id) per id, concurrently
//!                                     └─ normalize (no persist)
//!                                   report ──▶ RefreshHandle
//!
//!  normalize_default_group(persist) ─▶ save_user(snapshot), detached
//! ```
//!
//! Storage calls never block the caller. Detached saves log and count their
//! failures instead of reporting them.

mod config;
mod manager;
mod refresh;
mod traits;

pub use config::{UserManagerConfig, DEFAULT_GROUP};
pub use manager::{Collaborators, UserManager};
pub use refresh::{RefreshHandle, RefreshOutcome, RefreshReport};
pub use traits::{
    BackgroundTask, IdentifierTranslator, IdentityTranslator, PresenceRegistry, PrimaryTask,
    TaskScheduler, UserStorage,
};

#[cfg(test)]
mod tests;
