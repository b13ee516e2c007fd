//! food-rescue/crates/fr-core/src/lib.rs
//!
//! Domain logic and interface definitions for the food rescue store:
//! donations, the requests that claim them, and the audit trail of both.

pub mod activity;
pub mod commands;
pub mod error;
pub mod models;
pub mod seed;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod traits;

// Re-exporting for easier access in other crates
pub use commands::*;
pub use error::*;
pub use models::*;
pub use state::StoreState;
pub use stats::*;
pub use storage::MemoryStorage;
pub use store::{InitSource, LifecycleStore};
pub use traits::*;
