//! Core types and shared functionality for courtside.
//!
//! This crate provides:
//! - In-memory TTL cache with terminal promotion and periodic sweeping
//! - Content fingerprints for conditional requests
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{ResourceClass, ResourceKey, SweepTask, TtlCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
