use std::sync::Arc;
use std::time::Duration;

use application::printer::DispatchOutcome;
use domain::printer::{ConnectionStatus, PrinterDescriptor, PrinterId, TransportKind};
use infrastructure::config::{AgentConfig, FallbackConfig, TransportConfig};
use infrastructure::printer::MockTransportFactory;
use printer_agent::agent::PrinterAgent;
use uuid::Uuid;

const BLOCKED: &str = "Direct IP printing is blocked by the browser on secure (https://) sites";

fn p(id: &str) -> PrinterId {
    PrinterId::new(id).unwrap()
}

fn config(secure_origin: bool) -> AgentConfig {
    let spool_dir = std::env::temp_dir().join(format!("pos_agent_{}", Uuid::new_v4()));
    AgentConfig {
        terminal_id: "till-1".to_string(),
        secure_origin,
        transport: TransportConfig::default(),
        printers: vec![
            PrinterDescriptor::network(p("front"), "Front Counter", "192.168.1.50:9100"),
            PrinterDescriptor::network(p("kitchen"), "Kitchen", "192.168.1.51"),
            PrinterDescriptor::new(p("drawer"), "Cash Drawer", TransportKind::Usb),
        ],
        selected_printer_id: Some(p("front")),
        fallback: FallbackConfig {
            spool_dir: spool_dir.to_string_lossy().into_owned(),
        },
    }
}

fn agent(secure_origin: bool) -> (PrinterAgent, MockTransportFactory) {
    let factory = MockTransportFactory::new();
    let agent = PrinterAgent::with_factory(config(secure_origin), Arc::new(factory.clone()));
    (agent, factory)
}

#[tokio::test]
async fn test_connect_all_skips_non_network_printers() {
    let (agent, factory) = agent(false);

    agent.connect_all();

    assert_eq!(factory.opened_count(), 2);
    assert_eq!(agent.registry().live_count(), 2);
    assert_eq!(
        agent.registry().status(&p("drawer")).status,
        ConnectionStatus::Unmanaged
    );
}

#[tokio::test]
async fn test_secure_origin_blocks_every_printer() {
    let (agent, factory) = agent(true);

    agent.connect_all();

    assert_eq!(factory.opened_count(), 0);
    for id in ["front", "kitchen"] {
        let status = agent.registry().status(&p(id));
        assert_eq!(status.message.as_deref(), Some(BLOCKED));
    }

    agent.set_secure_origin(false);
    agent.connect_all();
    assert_eq!(factory.opened_count(), 2);
}

#[tokio::test]
async fn test_test_page_goes_to_connected_printer() {
    let (agent, factory) = agent(false);
    agent.connect_all();
    factory.transport(0).unwrap().open();

    let status = agent
        .wait_for_printer(&p("front"), Duration::from_millis(100))
        .await;
    assert_eq!(status, ConnectionStatus::Connected);

    let outcome = agent.print_test_page().await;

    assert_eq!(outcome, DispatchOutcome::Printed(p("front")));
    let sent = factory.transport(0).unwrap().sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].ends_with(&[0x1D, 0x56, 0x41, 0x00]));
}

#[tokio::test]
async fn test_test_page_is_spooled_when_printer_offline() {
    let (agent, factory) = agent(false);
    agent.connect_all();
    factory.transport(0).unwrap().fail("Connection failed");

    let outcome = agent.print_test_page().await;
    assert_eq!(outcome, DispatchOutcome::FellBack);

    let spool = std::path::Path::new(&agent.config().fallback.spool_dir);
    let files: Vec<_> = std::fs::read_dir(spool).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_wait_for_printer_reports_failure() {
    let (agent, factory) = agent(false);
    agent.connect_all();
    let transport = factory.transport(0).unwrap();

    let front = p("front");
    let waiting = agent.wait_for_printer(&front, Duration::from_secs(5));
    let fail = async {
        tokio::task::yield_now().await;
        transport.fail("Connection failed");
    };
    let (status, ()) = tokio::join!(waiting, fail);

    assert_eq!(status, ConnectionStatus::Error);
}

#[tokio::test]
async fn test_wait_for_printer_times_out_while_connecting() {
    let (agent, _) = agent(false);
    agent.connect_all();

    let status = agent
        .wait_for_printer(&p("front"), Duration::from_millis(50))
        .await;
    assert_eq!(status, ConnectionStatus::Connecting);
}

#[tokio::test]
async fn test_shutdown_closes_every_connection() {
    let (agent, factory) = agent(false);
    agent.connect_all();
    factory.transport(0).unwrap().open();

    agent.shutdown();

    assert!(factory.transport(0).unwrap().close_requested());
    assert!(factory.transport(1).unwrap().close_requested());
    factory.transport(0).unwrap().confirm_close();
    assert_eq!(
        agent.registry().status(&p("front")).status,
        ConnectionStatus::Disconnected
    );
}
