// mvrkuma-api: Async Socket.IO client for the Uptime Kuma monitoring server

pub mod client;
pub mod error;
pub mod models;
pub mod socketio;
pub mod transport;

pub use client::KumaClient;
pub use error::Error;
pub use models::{AddMonitorRequest, MonitorRecord, MonitorTagRecord, MonitorType, TagRecord};
pub use transport::TransportConfig;
