// ── Uptime Kuma binding ──
//
// `Connector` / `MonitorService` over the Socket.IO client from
// `mvrkuma-api`. Each `connect` opens a socket and logs in.

use mvrkuma_api::{AddMonitorRequest, KumaClient, TransportConfig};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::CoreError;
use crate::model::{Monitor, NewMonitor, RemoteTag};
use crate::reconcile::{Connector, MonitorService};

/// Opens logged-in Uptime Kuma sessions.
#[derive(Debug, Clone)]
pub struct KumaConnector {
    config: ConnectionConfig,
}

impl KumaConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl Connector for KumaConnector {
    type Session = KumaSession;

    async fn connect(&self) -> Result<KumaSession, CoreError> {
        let transport = TransportConfig::with_timeout(self.config.timeout);
        let mut client = KumaClient::connect(&self.config.url, &transport)
            .await
            .map_err(|e| match CoreError::from(e) {
                CoreError::ConnectionFailed { reason, .. } => CoreError::ConnectionFailed {
                    url: self.config.url.to_string(),
                    reason,
                },
                other => other,
            })?;

        if let Err(e) = client
            .login(&self.config.username, &self.config.password)
            .await
        {
            client.disconnect().await;
            return Err(e.into());
        }
        debug!(url = %self.config.url, username = %self.config.username, "session open");
        Ok(KumaSession { client })
    }
}

/// A logged-in Uptime Kuma session.
pub struct KumaSession {
    client: KumaClient,
}

impl MonitorService for KumaSession {
    async fn get_monitors(&mut self) -> Result<Vec<Monitor>, CoreError> {
        let records = self.client.get_monitors().await?;
        Ok(records.into_iter().map(Monitor::from).collect())
    }

    async fn get_tags(&mut self) -> Result<Vec<RemoteTag>, CoreError> {
        let records = self.client.get_tags().await?;
        Ok(records.into_iter().map(RemoteTag::from).collect())
    }

    async fn add_monitor(&mut self, monitor: &NewMonitor) -> Result<u64, CoreError> {
        self.client
            .add_monitor(&AddMonitorRequest::from(monitor))
            .await
            .map_err(CoreError::from)
    }

    async fn add_tag(&mut self, name: &str, color: &str) -> Result<u64, CoreError> {
        self.client
            .add_tag(name, color)
            .await
            .map_err(CoreError::from)
    }

    async fn add_monitor_tag(&mut self, monitor_id: u64, tag_id: u64) -> Result<(), CoreError> {
        self.client
            .add_monitor_tag(monitor_id, tag_id, "")
            .await
            .map_err(CoreError::from)
    }

    async fn delete_monitor_tag(
        &mut self,
        monitor_id: u64,
        tag_id: u64,
        value: &str,
    ) -> Result<(), CoreError> {
        self.client
            .delete_monitor_tag(monitor_id, tag_id, value)
            .await
            .map_err(CoreError::from)
    }

    async fn delete_tag(&mut self, tag_id: u64) -> Result<(), CoreError> {
        self.client
            .delete_tag(tag_id)
            .await
            .map_err(CoreError::from)
    }

    async fn delete_monitor(&mut self, monitor_id: u64) -> Result<(), CoreError> {
        self.client
            .delete_monitor(monitor_id)
            .await
            .map_err(CoreError::from)
    }

    async fn disconnect(&mut self) {
        self.client.disconnect().await;
    }
}
