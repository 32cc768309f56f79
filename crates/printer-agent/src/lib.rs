pub mod agent;
pub mod status_log;
