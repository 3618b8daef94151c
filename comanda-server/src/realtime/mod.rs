//! Realtime fan-out to connected staff displays

pub mod broadcaster;
pub mod ws;

pub use broadcaster::Broadcaster;
