use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::printer::{ConnectionStatus, PrinterId, PrinterStatus};

/// A printer moved from one status entry to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub printer_id: PrinterId,
    pub previous: PrinterStatus,
    pub current: PrinterStatus,
    pub timestamp: DateTime<Utc>,
}

impl StatusChanged {
    pub fn new(printer_id: PrinterId, previous: PrinterStatus, current: PrinterStatus) -> Self {
        Self {
            printer_id,
            previous,
            current,
            timestamp: Utc::now(),
        }
    }

    /// True when the printer just became able to take payloads
    pub fn came_online(&self) -> bool {
        self.current.status == ConnectionStatus::Connected
            && self.previous.status != ConnectionStatus::Connected
    }

    /// True when the printer just stopped being able to take payloads
    pub fn went_offline(&self) -> bool {
        self.previous.status == ConnectionStatus::Connected
            && self.current.status != ConnectionStatus::Connected
    }
}
