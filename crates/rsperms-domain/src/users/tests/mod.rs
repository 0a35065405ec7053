//! Tests for the user resolution service.
//!
//! Organized by operation:
//! - Lookup by name and unique id
//! - Default group normalization
//! - Save elision
//! - Presence cleanup
//! - Bulk refresh across execution contexts

mod mocks;
