//! Shared types for the Comanda order system
//!
//! Domain types used by both the server and the printer crate: the order
//! model, intake/edit DTOs, and the realtime lifecycle event.

pub mod models;

// Re-exports
pub use models::event::{OrderEvent, OrderEventKind};
pub use models::order::{
    LineItem, Order, OrderDraft, OrderKind, OrderPatch, OrderStatus, ParseStatusError,
};
