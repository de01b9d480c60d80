//! Sleeper data access.
//!
//! - `http`: the public read API client
//! - `types`: wire and history types
//! - `history`: the on-disk history cache and team names

pub mod history;
pub mod http;
pub mod types;

pub use history::{load_history_file, load_or_fetch_history, save_history, UserDirectory};
pub use http::SleeperClient;
