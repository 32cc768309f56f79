use std::sync::Arc;

use domain::printer::{FallbackPrinter, PrinterError, PrinterId, ReceiptFormatter};
use tracing::{info, warn};

use super::registry::PrinterRegistry;

/// Where a receipt ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the selected network printer
    Printed(PrinterId),
    /// Sent through the local fallback path instead
    FellBack,
    /// Neither the printer nor the fallback took it
    Failed(PrinterError),
}

impl DispatchOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed(_))
    }
}

/// Sends formatted receipts to the selected printer and falls back to the
/// local print path when the printer cannot take them. One attempt per receipt:
/// nothing is queued or retried.
pub struct ReceiptDispatcher {
    registry: Arc<PrinterRegistry>,
    fallback: Option<Arc<dyn FallbackPrinter>>,
}

impl ReceiptDispatcher {
    pub fn new(registry: Arc<PrinterRegistry>) -> Self {
        Self {
            registry,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackPrinter>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn registry(&self) -> &Arc<PrinterRegistry> {
        &self.registry
    }

    pub async fn print<T: ?Sized>(
        &self,
        selected: Option<&PrinterId>,
        formatter: &dyn ReceiptFormatter<T>,
        entity: &T,
    ) -> DispatchOutcome {
        let payload = formatter.format_for_printer(entity);
        self.dispatch(selected, &payload).await
    }

    pub async fn dispatch(&self, selected: Option<&PrinterId>, payload: &[u8]) -> DispatchOutcome {
        if let Some(printer_id) = selected {
            if self.registry.send(printer_id, payload) {
                info!(printer_id = %printer_id, bytes = payload.len(), "Receipt sent to printer");
                return DispatchOutcome::Printed(printer_id.clone());
            }
            let status = self.registry.status(printer_id);
            warn!(
                printer_id = %printer_id,
                status = %status.status,
                "Printer unavailable, using fallback"
            );
        } else {
            info!("No printer selected, using fallback");
        }

        let Some(fallback) = &self.fallback else {
            warn!(bytes = payload.len(), "No fallback printer configured, receipt not printed");
            return DispatchOutcome::Failed(PrinterError::NotConnected);
        };

        match fallback.print(payload).await {
            Ok(()) => DispatchOutcome::FellBack,
            Err(e) => {
                warn!(error = %e, "Fallback printing failed");
                DispatchOutcome::Failed(e)
            }
        }
    }
}
