//! Application layer - Printer connection management and receipt dispatch

pub mod printer;

pub use printer::{PrinterRegistry, ReceiptDispatcher, StatusBroadcaster};
