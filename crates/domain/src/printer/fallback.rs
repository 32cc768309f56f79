use async_trait::async_trait;

use super::PrinterError;

/// Non-network print path used when a printer cannot take a payload
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait FallbackPrinter: Send + Sync {
    async fn print(&self, payload: &[u8]) -> Result<(), PrinterError>;
}

/// Turns a sale, purchase order or similar entity into printer-ready bytes.
///
/// The output is opaque: it may embed raw control codes and is transmitted
/// unmodified.
pub trait ReceiptFormatter<T: ?Sized>: Send + Sync {
    fn format_for_printer(&self, entity: &T) -> Vec<u8>;
}

impl<T, F> ReceiptFormatter<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> Vec<u8> + Send + Sync,
{
    fn format_for_printer(&self, entity: &T) -> Vec<u8> {
        self(entity)
    }
}
