//! In-memory response cache for upstream documents.
//!
//! This module provides the shared, process-lifetime cache used by every
//! request path. It supports:
//!
//! - TTL-checked reads with a terminal flag per entry
//! - Periodic age-based eviction on an independent timer
//! - Content fingerprints for conditional requests
//! - Resource keys shared by single, batch and polling fetches

pub mod fingerprint;
pub mod key;
pub mod store;
pub mod sweep;

pub use crate::Error;

pub use fingerprint::{fingerprint, fingerprint_value};
pub use key::{ResourceClass, ResourceKey};
pub use store::{CacheLookup, CacheStats, TtlCache};
pub use sweep::SweepTask;
