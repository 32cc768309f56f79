use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid printer ID: {0}")]
    InvalidPrinterId(String),

    #[error("Invalid printer configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Printer not found: {0}")]
    PrinterNotFound(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
