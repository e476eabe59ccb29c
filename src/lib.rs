//! User–center reconciliation service.
//!
//! Merges the dashboard's users, centers and per-center memberships into a
//! single deduplicated, reconciled population and serves filtered,
//! paginated views and headline counts over it.

pub mod api;
pub mod config;
pub mod database;
pub mod engine;
pub mod models;
pub mod repositories;
pub mod utils;

pub use config::Config;
pub use engine::ReconciliationEngine;
pub use models::{FilterSet, ReloadOutcome, Stats, View};
