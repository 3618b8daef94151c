//! Persistence layer

pub mod store;

// Re-exports
pub use store::{
    OrderCounts, OrderStore, StoreError, StoreResult, StoredOrder, TransitionApplied,
};
