//! Receipt print pipeline

pub mod service;

pub use service::{PrintService, ReceiptPrintWorker};
