use thiserror::Error;

/// Status message when direct socket printing is refused by the execution context
pub const MSG_POLICY_BLOCKED: &str =
    "Direct IP printing is blocked by the browser on secure (https://) sites";
/// Status message when a socket could not be established or dropped with an error
pub const MSG_CONNECTION_FAILED: &str = "Connection failed";
/// Status message when bytes could not be written out
pub const MSG_WRITE_FAILED: &str = "Write failed";
/// Status message when a descriptor address cannot be turned into a socket target
pub const MSG_INVALID_ADDRESS: &str = "Invalid address";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrinterError {
    #[error("{MSG_POLICY_BLOCKED}")]
    PolicyBlocked,
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Write failed: {0}")]
    WriteFailed(String),
    #[error("Not connected")]
    NotConnected,
}

impl PrinterError {
    /// Short diagnostic recorded in the printer's status entry
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::PolicyBlocked => MSG_POLICY_BLOCKED,
            Self::InvalidAddress(_) => MSG_INVALID_ADDRESS,
            Self::WriteFailed(_) => MSG_WRITE_FAILED,
            Self::ConnectionFailed(_) | Self::NotConnected => MSG_CONNECTION_FAILED,
        }
    }
}
