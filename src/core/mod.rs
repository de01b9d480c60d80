//! Core utilities for the league metrics CLI
//!
//! This module consolidates common utilities that are used across
//! the application:
//! - `cache`: TTL memo cache and file system helpers
//! - `config`: engine tuning loaded from JSON
//! - `logging`: tracing subscriber setup

pub mod cache;
pub mod config;
pub mod logging;

// Re-export commonly used items for convenience
pub use cache::{history_path, try_read_to_string, write_string, MemoCache, SeasonWeekKey};
pub use config::{BracketFallback, EngineConfig};
