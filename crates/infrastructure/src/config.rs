use std::collections::HashSet;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use domain::DomainError;
use domain::error::Result as DomainResult;
use domain::printer::{PrinterDescriptor, PrinterId};
use serde::{Deserialize, Serialize};

/// Socket flavour used to reach network printers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireScheme {
    /// Raw TCP, the native receipt-printer socket
    #[default]
    Tcp,
    /// `ws://<address>` through a printer bridge
    Ws,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransportConfig {
    #[serde(default)]
    pub scheme: WireScheme,
    #[serde(default = "default_printer_port")]
    pub default_port: u16,
    /// Unset means a handshake may stay `Connecting` indefinitely
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            scheme: WireScheme::default(),
            default_port: default_printer_port(),
            connect_timeout_ms: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FallbackConfig {
    #[serde(default = "default_spool_dir")]
    pub spool_dir: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            spool_dir: default_spool_dir(),
        }
    }
}

fn default_printer_port() -> u16 {
    9100
}
fn default_spool_dir() -> String {
    "data/spool".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    pub terminal_id: String,
    /// Whether the application runs under a secure origin, which forbids
    /// direct socket printing
    #[serde(default)]
    pub secure_origin: bool,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub printers: Vec<PrinterDescriptor>,
    #[serde(default)]
    pub selected_printer_id: Option<PrinterId>,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl AgentConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("terminal_id", "pos-terminal")?
            // Local config file, required so we never start without a printer list
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(true))
            // Per-environment overrides
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. POS__SECURE_ORIGIN=true)
            .add_source(Environment::with_prefix("POS").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Reject printer lists the registry could not address unambiguously
    pub fn validate(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for printer in &self.printers {
            if !seen.insert(&printer.id) {
                return Err(DomainError::InvalidConfiguration(format!(
                    "duplicate printer id {}",
                    printer.id
                )));
            }
        }

        if let Some(selected) = &self.selected_printer_id {
            if !seen.contains(selected) {
                return Err(DomainError::PrinterNotFound(selected.to_string()));
            }
        }
        Ok(())
    }

    pub fn selected_printer(&self) -> Option<&PrinterDescriptor> {
        let selected = self.selected_printer_id.as_ref()?;
        self.printers.iter().find(|p| &p.id == selected)
    }
}
