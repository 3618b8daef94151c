//! # comanda-printer
//!
//! Receipt dispatch boundary - transport only.
//!
//! ## Scope
//!
//! This crate handles HOW a finalized order reaches a physical printer:
//! - HTTP relay to a LAN print listener (the deployment this system runs with)
//! - No-op adapter for printerless setups and tests
//!
//! WHAT a receipt looks like stays outside: the relay receives the full
//! order snapshot as JSON and owns rendering and the printer connection.
//!
//! ## Example
//!
//! ```ignore
//! use comanda_printer::{HttpRelayDispatcher, ReceiptDispatcher};
//! use std::time::Duration;
//!
//! let relay = HttpRelayDispatcher::new("http://192.168.1.12:8989/print", Duration::from_secs(5))?;
//! relay.dispatch(&order).await?;
//! ```

mod dispatcher;
mod error;

// Re-exports
pub use dispatcher::{HttpRelayDispatcher, NoopDispatcher, ReceiptDispatcher};
pub use error::{DispatchError, DispatchResult};
