use serde::{Deserialize, Serialize};

/// Connection status of a single printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// A transport exists and the handshake has not completed yet
    Connecting,
    /// The transport is open and can accept payloads
    Connected,
    /// The transport was closed (locally or by the printer)
    Disconnected,
    /// The connection was refused, failed, or could not be attempted
    Error,
    /// Never connected through this registry
    Unmanaged,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
            Self::Unmanaged => "unmanaged",
        }
    }

    /// A live connection in one of these states makes `connect()` a no-op
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// States after which the live connection is gone
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Error)
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::Unmanaged
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status entry published for one printer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub status: ConnectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PrinterStatus {
    pub fn connecting() -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            message: None,
        }
    }

    pub fn connected() -> Self {
        Self {
            status: ConnectionStatus::Connected,
            message: None,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn unmanaged() -> Self {
        Self::default()
    }
}
