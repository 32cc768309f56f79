use std::sync::Arc;
use std::time::Duration;

use application::printer::{
    DispatchOutcome, OriginContext, PrinterRegistry, ReceiptDispatcher, SecureContextPolicy,
    test_page,
};
use chrono::Local;
use domain::printer::{ConnectionStatus, PrinterError, PrinterId, TransportFactory};
use infrastructure::config::AgentConfig;
use infrastructure::printer::{NetworkTransportFactory, SpoolFilePrinter};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{info, warn};

/// Wires the configured printers to a registry and a receipt dispatcher
pub struct PrinterAgent {
    config: AgentConfig,
    context: Arc<OriginContext>,
    registry: Arc<PrinterRegistry>,
    dispatcher: ReceiptDispatcher,
}

impl PrinterAgent {
    pub fn new(config: AgentConfig) -> Self {
        let factory = NetworkTransportFactory::new(config.transport.clone());
        Self::with_factory(config, Arc::new(factory))
    }

    pub fn with_factory(config: AgentConfig, factory: Arc<dyn TransportFactory>) -> Self {
        let context = Arc::new(OriginContext::new(config.secure_origin));
        let policy = SecureContextPolicy::new(context.clone());
        let registry = Arc::new(PrinterRegistry::new(factory, Arc::new(policy)));
        let fallback = SpoolFilePrinter::new(&config.fallback.spool_dir);
        let dispatcher = ReceiptDispatcher::new(registry.clone()).with_fallback(Arc::new(fallback));

        Self {
            config,
            context,
            registry,
            dispatcher,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PrinterRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &ReceiptDispatcher {
        &self.dispatcher
    }

    /// Applies to the next connect attempt of every printer
    pub fn set_secure_origin(&self, secure: bool) {
        self.context.set_secure_origin(secure);
    }

    /// Start a connection to every configured printer. Non-network printers
    /// are skipped by the registry.
    pub fn connect_all(&self) {
        for printer in &self.config.printers {
            self.registry.connect(printer);
        }
    }

    /// Wait until the printer settles. Returns `Connected`, the failure status,
    /// or `Connecting` if nothing happened within `within`.
    pub async fn wait_for_printer(&self, printer_id: &PrinterId, within: Duration) -> ConnectionStatus {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let watched = printer_id.clone();
        let subscription = self.registry.broadcaster().subscribe(move |update| {
            if update.change.printer_id == watched {
                let _ = tx.send(update.change.current.status);
            }
        });

        let mut status = self.registry.status(printer_id).status;
        if status == ConnectionStatus::Connecting {
            let settle = async {
                while let Some(next) = rx.recv().await {
                    if next.is_connected() || next.is_terminal() {
                        return next;
                    }
                }
                ConnectionStatus::Connecting
            };
            status = timeout(within, settle)
                .await
                .unwrap_or(ConnectionStatus::Connecting);
        }

        self.registry.broadcaster().unsubscribe(subscription);
        status
    }

    /// Print a connectivity ticket on the selected printer, spooling it when
    /// the printer is not connected
    pub async fn print_test_page(&self) -> DispatchOutcome {
        let Some(printer) = self.config.selected_printer() else {
            warn!("No printer selected, skipping test page");
            return DispatchOutcome::Failed(PrinterError::NotConnected);
        };

        let printed_at = Local::now().format("%Y-%m-%d %H:%M").to_string();
        let page = test_page(printer, &self.config.terminal_id, &printed_at);
        let outcome = self.dispatcher.dispatch(Some(&printer.id), &page).await;
        info!(printer_id = %printer.id, ?outcome, "Test page dispatched");
        outcome
    }

    pub fn shutdown(&self) {
        info!(live = self.registry.live_count(), "Closing printer connections");
        self.registry.disconnect_all();
    }
}
