//! rsperms-storage: Storage abstraction for user records
//!
//! This crate provides the persistence seam for rsperms, including:
//! - UserDataStore trait for user record operations
//! - Stored record types independent of the domain entities
//! - In-memory implementation for testing and single-node use
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               rsperms-storage                │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs   - UserDataStore definition     │
//! │  memory.rs   - In-memory implementation     │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use memory::MemoryUserDataStore;
pub use traits::{StoredNode, StoredUser, UserDataStore};
