//! Todo Cache - A todo service fronted by a cache-aside coordinator
//!
//! Serves reads from a distributed text store, computing missing values at
//! most once at a time behind a single-flight gate.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod todos;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
