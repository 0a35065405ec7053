//! rsperms-server: Runtime wiring for the permission cache
//!
//! This crate connects the domain services to concrete infrastructure:
//! - Configuration management
//! - Logging and metrics initialization
//! - Tokio-backed primary and background execution contexts
//! - Adapter from the record store to the domain storage seam
//! - Connect/disconnect lifecycle glue
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               rsperms-server                 │
//! ├─────────────────────────────────────────────┤
//! │  config.rs     - Configuration management   │
//! │  observability - Logging and metrics        │
//! │  scheduler.rs  - Execution contexts         │
//! │  adapters.rs   - Storage adapter            │
//! │  lifecycle.rs  - Login/disconnect handling  │
//! │  bootstrap.rs  - Runtime wiring             │
//! └─────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod scheduler;

// Re-exports for convenience
pub use adapters::DataStoreUserStorage;
pub use bootstrap::Runtime;
pub use config::{ConfigLoadError, RspermsConfig};
pub use lifecycle::{DisconnectOutcome, UserLifecycle};
pub use scheduler::TokioScheduler;
