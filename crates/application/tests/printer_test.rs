use std::sync::Arc;
use std::time::Duration;

use application::printer::{
    AllowDirectConnections, DispatchOutcome, PrinterRegistry, ReceiptDispatcher, test_page,
};
use domain::printer::{
    ConnectionStatus, MockFallbackPrinter, PrinterDescriptor, PrinterError, PrinterId,
};
use infrastructure::printer::{MockTransportFactory, NetworkTransportFactory};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

struct Sale {
    number: u32,
    total_cents: u64,
}

fn p(id: &str) -> PrinterId {
    PrinterId::new(id).unwrap()
}

fn mock_registry() -> (Arc<PrinterRegistry>, MockTransportFactory) {
    let factory = MockTransportFactory::new();
    let registry = PrinterRegistry::new(Arc::new(factory.clone()), Arc::new(AllowDirectConnections));
    (Arc::new(registry), factory)
}

fn connected_printer(registry: &PrinterRegistry, factory: &MockTransportFactory, id: &str) {
    registry.connect(&PrinterDescriptor::network(p(id), "Front", "192.168.1.50:9100"));
    factory.last().unwrap().open();
}

async fn next_status(updates: &mut mpsc::UnboundedReceiver<ConnectionStatus>) -> ConnectionStatus {
    timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("timed out waiting for status")
        .expect("status channel closed")
}

#[tokio::test]
async fn test_dispatch_to_connected_printer() {
    let (registry, factory) = mock_registry();
    connected_printer(&registry, &factory, "p1");

    let mut fallback = MockFallbackPrinter::new();
    fallback.expect_print().never();
    let dispatcher = ReceiptDispatcher::new(registry).with_fallback(Arc::new(fallback));

    let outcome = dispatcher.dispatch(Some(&p("p1")), b"RECEIPT").await;

    assert_eq!(outcome, DispatchOutcome::Printed(p("p1")));
    assert_eq!(factory.last().unwrap().sent(), vec![b"RECEIPT".to_vec()]);
}

#[tokio::test]
async fn test_dispatch_falls_back_when_printer_offline() {
    let (registry, _) = mock_registry();

    let mut fallback = MockFallbackPrinter::new();
    fallback
        .expect_print()
        .withf(|payload| payload == b"RECEIPT")
        .times(1)
        .returning(|_| Ok(()));
    let dispatcher = ReceiptDispatcher::new(registry).with_fallback(Arc::new(fallback));

    let outcome = dispatcher.dispatch(Some(&p("p1")), b"RECEIPT").await;
    assert_eq!(outcome, DispatchOutcome::FellBack);
}

#[tokio::test]
async fn test_dispatch_falls_back_while_connecting() {
    let (registry, factory) = mock_registry();
    registry.connect(&PrinterDescriptor::network(p("p1"), "Front", "192.168.1.50:9100"));

    let mut fallback = MockFallbackPrinter::new();
    fallback.expect_print().times(1).returning(|_| Ok(()));
    let dispatcher = ReceiptDispatcher::new(registry).with_fallback(Arc::new(fallback));

    let outcome = dispatcher.dispatch(Some(&p("p1")), b"RECEIPT").await;

    assert_eq!(outcome, DispatchOutcome::FellBack);
    assert!(factory.last().unwrap().sent().is_empty());
}

#[tokio::test]
async fn test_dispatch_without_selection_uses_fallback() {
    let (registry, _) = mock_registry();

    let mut fallback = MockFallbackPrinter::new();
    fallback.expect_print().times(1).returning(|_| Ok(()));
    let dispatcher = ReceiptDispatcher::new(registry).with_fallback(Arc::new(fallback));

    assert_eq!(dispatcher.dispatch(None, b"RECEIPT").await, DispatchOutcome::FellBack);
}

#[tokio::test]
async fn test_dispatch_reports_fallback_failure() {
    let (registry, _) = mock_registry();

    let mut fallback = MockFallbackPrinter::new();
    fallback
        .expect_print()
        .returning(|_| Err(PrinterError::WriteFailed("disk full".into())));
    let dispatcher = ReceiptDispatcher::new(registry).with_fallback(Arc::new(fallback));

    let outcome = dispatcher.dispatch(Some(&p("p1")), b"RECEIPT").await;
    assert_eq!(
        outcome,
        DispatchOutcome::Failed(PrinterError::WriteFailed("disk full".into()))
    );
}

#[tokio::test]
async fn test_dispatch_without_fallback_fails() {
    let (registry, _) = mock_registry();
    let dispatcher = ReceiptDispatcher::new(registry);

    let outcome = dispatcher.dispatch(Some(&p("p1")), b"RECEIPT").await;
    assert_eq!(outcome, DispatchOutcome::Failed(PrinterError::NotConnected));
    assert!(!outcome.is_printed());
}

#[tokio::test]
async fn test_print_formats_entity_before_sending() {
    let (registry, factory) = mock_registry();
    connected_printer(&registry, &factory, "p1");
    let dispatcher = ReceiptDispatcher::new(registry);

    let formatter = |sale: &Sale| {
        format!("SALE #{} TOTAL {}\n", sale.number, sale.total_cents).into_bytes()
    };
    let sale = Sale {
        number: 42,
        total_cents: 1250,
    };

    let outcome = dispatcher.print(Some(&p("p1")), &formatter, &sale).await;

    assert!(outcome.is_printed());
    assert_eq!(
        factory.last().unwrap().sent(),
        vec![b"SALE #42 TOTAL 1250\n".to_vec()]
    );
}

#[tokio::test]
async fn test_registry_prints_over_real_socket() {
    // 1. Fake printer listening on an ephemeral port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    // 2. Registry over the real socket transport
    let registry = PrinterRegistry::new(
        Arc::new(NetworkTransportFactory::default()),
        Arc::new(AllowDirectConnections),
    );
    let (tx, mut updates) = mpsc::unbounded_channel();
    registry.broadcaster().subscribe(move |update| {
        let _ = tx.send(update.change.current.status);
    });

    let descriptor = PrinterDescriptor::network(p("front"), "Front Counter", address);
    registry.connect(&descriptor);
    let (mut printer_side, _) = listener.accept().await.unwrap();

    assert_eq!(next_status(&mut updates).await, ConnectionStatus::Connecting);
    assert_eq!(next_status(&mut updates).await, ConnectionStatus::Connected);

    // 3. Test page goes out byte for byte
    let page = test_page(&descriptor, "till-1", "2024-01-01 10:00");
    assert!(registry.send(&descriptor.id, &page));

    let mut received = vec![0u8; page.len()];
    timeout(Duration::from_secs(5), printer_side.read_exact(&mut received))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, page);

    // 4. Printer hangs up
    drop(printer_side);
    assert_eq!(next_status(&mut updates).await, ConnectionStatus::Disconnected);
    assert!(!registry.is_live(&descriptor.id));
    assert!(!registry.send(&descriptor.id, "TEST"));
}
