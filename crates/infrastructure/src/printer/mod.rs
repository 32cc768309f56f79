mod address;
pub mod file_printer;
pub mod mock_printer;
pub mod network_printer;
mod ready_state;
pub mod websocket_printer;

pub use address::PrinterAddress;
pub use file_printer::SpoolFilePrinter;
pub use mock_printer::{MockTransport, MockTransportFactory, MockTransportHandle};
pub use network_printer::NetworkPrinter;
pub use websocket_printer::WebSocketPrinter;

use std::sync::Arc;

use domain::printer::{PrinterError, PrinterTransport, TransportEventSink, TransportFactory};
use tokio::runtime::Handle;
use tracing::debug;

use crate::config::{TransportConfig, WireScheme};

/// Builds socket transports for network printers
#[derive(Debug, Clone, Default)]
pub struct NetworkTransportFactory {
    config: TransportConfig,
}

impl NetworkTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl TransportFactory for NetworkTransportFactory {
    fn open(
        &self,
        address: &str,
        events: Arc<dyn TransportEventSink>,
    ) -> Result<Box<dyn PrinterTransport>, PrinterError> {
        let target = PrinterAddress::parse(address, self.config.default_port)?;
        let handle = Handle::try_current()
            .map_err(|e| PrinterError::ConnectionFailed(format!("no async runtime: {e}")))?;
        let timeout = self.config.connect_timeout();

        debug!(address = %target, scheme = ?self.config.scheme, "Opening printer transport");
        let transport: Box<dyn PrinterTransport> = match self.config.scheme {
            WireScheme::Tcp => Box::new(NetworkPrinter::spawn(&handle, target, timeout, events)),
            WireScheme::Ws => Box::new(WebSocketPrinter::spawn(&handle, &target, timeout, events)),
        };
        Ok(transport)
    }
}
