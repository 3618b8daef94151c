//! External collaborator boundaries

pub mod catalog;

pub use catalog::{MenuCatalog, StaticMenu};
