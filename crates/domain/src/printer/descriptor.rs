use serde::{Deserialize, Serialize};

use super::PrinterId;

/// How a printer is physically reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    Network,
    #[serde(alias = "USB")]
    Usb,
    Bluetooth,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Usb => "USB",
            Self::Bluetooth => "Bluetooth",
        }
    }

    /// Only network printers get a live connection; the other kinds are placeholders
    pub fn is_managed(&self) -> bool {
        matches!(self, Self::Network)
    }
}

/// Configuration record identifying a physical printer and how to reach it.
///
/// Created, edited and deleted by the configuration layer. The connection
/// manager only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterDescriptor {
    pub id: PrinterId,
    pub name: String,
    pub transport_kind: TransportKind,
    /// `host[:port]`, only meaningful for network printers
    #[serde(default)]
    pub address: String,
}

impl PrinterDescriptor {
    pub fn network(id: PrinterId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transport_kind: TransportKind::Network,
            address: address.into(),
        }
    }

    pub fn new(id: PrinterId, name: impl Into<String>, transport_kind: TransportKind) -> Self {
        Self {
            id,
            name: name.into(),
            transport_kind,
            address: String::new(),
        }
    }

    /// True when this descriptor can be handed to a network transport at all
    pub fn is_connectable(&self) -> bool {
        self.transport_kind.is_managed() && !self.address.trim().is_empty()
    }
}
