use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use domain::{ConnectionStatus, PrinterId};
use dotenv::dotenv;
use infrastructure::config::AgentConfig;
use printer_agent::agent::PrinterAgent;
use printer_agent::status_log::log_status_changes;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Override terminal ID
    #[arg(long)]
    terminal_id: Option<String>,

    /// Treat the application as running under a secure origin
    #[arg(long)]
    secure_origin: Option<bool>,

    /// Override the selected receipt printer
    #[arg(long)]
    printer: Option<String>,

    /// Print a test page once the selected printer is reachable
    #[arg(long)]
    test_print: bool,

    /// Seconds to wait for the selected printer before spooling the test page
    #[arg(long, default_value_t = 10)]
    wait_secs: u64,
}

async fn run() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,printer_agent=debug,application=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🧾 POS Printer Agent Starting...");
    info!("🆔 Process ID: {}", std::process::id());

    let args = Args::parse();

    // Run from the workspace root during development
    let dev_config = "crates/printer-agent/config";
    let config_dir = if args.config_dir == "config" && Path::new(dev_config).exists() {
        dev_config.to_string()
    } else {
        args.config_dir.clone()
    };
    info!("📂 Config directory: {}", config_dir);

    // 1. Load Configuration
    let mut config = AgentConfig::load(&config_dir)?;
    if let Some(id) = args.terminal_id {
        config.terminal_id = id;
    }
    if let Some(secure) = args.secure_origin {
        config.secure_origin = secure;
    }
    if let Some(printer) = args.printer {
        config.selected_printer_id = Some(PrinterId::new(printer)?);
    }
    config.validate()?;

    info!(
        terminal_id = %config.terminal_id,
        printers = config.printers.len(),
        scheme = ?config.transport.scheme,
        "✅ Loaded configuration"
    );

    // 2. Registry and status logging
    let agent = PrinterAgent::new(config);
    log_status_changes(agent.registry().broadcaster());

    // 3. Connect
    agent.connect_all();

    // 4. Optional test print
    if args.test_print {
        if let Some(selected) = agent.config().selected_printer_id.clone() {
            let status = agent
                .wait_for_printer(&selected, Duration::from_secs(args.wait_secs))
                .await;
            if status != ConnectionStatus::Connected {
                warn!(printer_id = %selected, %status, "Selected printer not connected");
            }
        }
        let outcome = agent.print_test_page().await;
        info!(?outcome, "🖨️ Test print finished");
    }

    // 5. Shutdown Signal
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("🛑 Shutting down..."),
        Err(err) => warn!(error = %err, "Unable to listen for shutdown signal"),
    }

    agent.shutdown();
    // Give the socket tasks a moment to send their close
    tokio::time::sleep(Duration::from_millis(200)).await;

    info!("👋 Good bye!");
    Ok(())
}

fn main() {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(run()) {
        eprintln!("\n❌ CRITICAL ERROR: {:?}", e);
        std::process::exit(1);
    }
}
