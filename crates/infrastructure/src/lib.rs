//! Infrastructure layer - Sockets, spool files and configuration

pub mod config;
pub mod printer;

pub use config::{AgentConfig, TransportConfig, WireScheme};
pub use printer::{MockTransportFactory, NetworkTransportFactory, SpoolFilePrinter};
