mod descriptor;
mod error;
mod fallback;
mod policy;
mod printer_id;
mod status;
mod transport;

pub use descriptor::{PrinterDescriptor, TransportKind};
pub use error::{
    MSG_CONNECTION_FAILED, MSG_INVALID_ADDRESS, MSG_POLICY_BLOCKED, MSG_WRITE_FAILED, PrinterError,
};
#[cfg(any(test, feature = "mocks"))]
pub use fallback::MockFallbackPrinter;
pub use fallback::{FallbackPrinter, ReceiptFormatter};
pub use policy::{ConnectionPolicy, ExecutionContext};
pub use printer_id::PrinterId;
pub use status::{ConnectionStatus, PrinterStatus};
pub use transport::{
    ConnectionId, PrinterTransport, TransportEvent, TransportEventSink, TransportFactory,
};
