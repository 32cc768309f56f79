//! Domain layer - Printer connection model with no I/O
//!
//! This crate contains:
//! - Value objects (PrinterId, PrinterDescriptor, PrinterStatus)
//! - The transport, policy and fallback seams implemented by outer layers
//! - Status change events
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Testable in isolation

pub mod error;
pub mod event;
pub mod printer;

// Re-export commonly used types
pub use error::DomainError;
pub use event::StatusChanged;
pub use printer::{ConnectionStatus, PrinterDescriptor, PrinterError, PrinterId, PrinterStatus};
