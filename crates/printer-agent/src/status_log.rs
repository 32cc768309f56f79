use application::printer::{StatusBroadcaster, SubscriptionId};
use domain::ConnectionStatus;
use tracing::{info, warn};

/// Log every printer status transition
pub fn log_status_changes(broadcaster: &StatusBroadcaster) -> SubscriptionId {
    broadcaster.subscribe(|update| {
        let change = &update.change;
        if change.went_offline() {
            warn!(printer_id = %change.printer_id, "Printer went offline");
        }
        match change.current.status {
            ConnectionStatus::Error => warn!(
                printer_id = %change.printer_id,
                previous = %change.previous.status,
                message = change.current.message.as_deref().unwrap_or(""),
                "🔴 Printer error"
            ),
            ConnectionStatus::Connected => info!(
                printer_id = %change.printer_id,
                "🟢 Printer online"
            ),
            status => info!(
                printer_id = %change.printer_id,
                previous = %change.previous.status,
                %status,
                "Printer status changed"
            ),
        }
    })
}
