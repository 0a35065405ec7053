//! Effective permission resolution.
//!
//! Walks a user's group memberships through the loaded groups in a
//! [`GroupCache`](crate::cache::GroupCache) to answer "does this user have
//! this permission here?".
//!
//! # Resolution Order
//!
//! 1. The user's own applicable nodes
//! 2. Each inherited group's applicable nodes, breadth-first from the user's
//!    direct memberships
//!
//! The first source holding a matching node decides. Within one source the
//! most specific scope wins (server+world, then server, then world, then
//! global), and a denial wins a tie.

mod config;
mod permission_resolver;
mod types;

pub use config::ResolverConfig;
pub use permission_resolver::PermissionResolver;
pub use types::Tristate;
