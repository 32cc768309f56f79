use super::{PrinterDescriptor, PrinterError};

/// Describes where the application is running.
///
/// Queried on every connection attempt; implementations may change their
/// answer at any time.
pub trait ExecutionContext: Send + Sync {
    /// True when running under a secure (encrypted) top-level origin
    fn is_secure_origin(&self) -> bool;
}

/// Gate deciding whether a direct socket connection may be attempted
pub trait ConnectionPolicy: Send + Sync {
    fn check(&self, descriptor: &PrinterDescriptor) -> Result<(), PrinterError>;
}
