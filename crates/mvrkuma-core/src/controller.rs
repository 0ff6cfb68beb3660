// ── Controller facade ──
//
// Every public operation opens its own session (connect + login), takes a
// fresh snapshot of the server, applies its changes, and disconnects on
// every exit path. Operations are sequential: callers run one at a time.

use tracing::{debug, info};

use crate::config::MonitorSettings;
use crate::error::CoreError;
use crate::model::{ActualState, SyncReport, TagCategories};
use crate::reconcile::{self, Connector, DeleteScope, MonitorService};
use crate::store::DesiredState;

/// Entry point for consumers.
pub struct Controller<C> {
    connector: C,
    settings: MonitorSettings,
}

impl<C: Connector> Controller<C> {
    pub fn new(connector: C, settings: MonitorSettings) -> Self {
        Self {
            connector,
            settings,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch the server's monitors and tags.
    pub async fn fetch(&self) -> Result<ActualState, CoreError> {
        let mut session = self.connector.connect().await?;
        let result = fetch_state(&mut session).await;
        session.disconnect().await;
        result
    }

    // ── Reconciliation ───────────────────────────────────────────────

    /// Create every desired tag missing on the server.
    pub async fn ensure_tags(&self, desired: &DesiredState) -> Result<SyncReport, CoreError> {
        let mut session = self.connector.connect().await?;
        let result = async {
            let tags = session.get_tags().await?;
            let mut report = SyncReport::default();
            reconcile::ensure_tags_exist(&mut session, desired, &tags, &mut report).await?;
            Ok::<_, CoreError>(report)
        }
        .await;
        session.disconnect().await;
        log_outcome("ensure tags", &result);
        result
    }

    /// Full import: ensure tags, refresh tags, then create and tag
    /// monitors for every fixture with an ipv4 address.
    pub async fn import(
        &self,
        desired: &DesiredState,
        categories: TagCategories,
    ) -> Result<SyncReport, CoreError> {
        let mut session = self.connector.connect().await?;
        let result = self.import_in(&mut session, desired, categories).await;
        session.disconnect().await;
        log_outcome("import", &result);
        result
    }

    async fn import_in(
        &self,
        session: &mut C::Session,
        desired: &DesiredState,
        categories: TagCategories,
    ) -> Result<SyncReport, CoreError> {
        let mut report = SyncReport::default();
        let mut actual = fetch_state(session).await?;

        reconcile::ensure_tags_exist(session, desired, &actual.tags, &mut report).await?;
        if report.tags_created > 0 {
            actual.tags = session.get_tags().await?;
            debug!(tags = actual.tags.len(), "refreshed tags");
        }

        reconcile::reconcile_monitors(
            session,
            desired,
            &actual,
            categories,
            &self.settings,
            &mut report,
        )
        .await?;
        Ok(report)
    }

    // ── Deletion ─────────────────────────────────────────────────────

    pub async fn delete_tags(
        &self,
        scope: DeleteScope,
        desired: &DesiredState,
    ) -> Result<SyncReport, CoreError> {
        let mut session = self.connector.connect().await?;
        let result = async {
            let tags = session.get_tags().await?;
            let mut report = SyncReport::default();
            reconcile::delete_tags(&mut session, scope, desired, &tags, &mut report).await?;
            Ok::<_, CoreError>(report)
        }
        .await;
        session.disconnect().await;
        log_outcome("delete tags", &result);
        result
    }

    pub async fn delete_monitors(
        &self,
        scope: DeleteScope,
        desired: &DesiredState,
    ) -> Result<SyncReport, CoreError> {
        let mut session = self.connector.connect().await?;
        let result = async {
            let monitors = session.get_monitors().await?;
            let mut report = SyncReport::default();
            reconcile::delete_monitors(&mut session, scope, desired, &monitors, &mut report)
                .await?;
            Ok::<_, CoreError>(report)
        }
        .await;
        session.disconnect().await;
        log_outcome("delete monitors", &result);
        result
    }

    // ── Manual tagging ───────────────────────────────────────────────

    /// Replace the tag set of the monitors with ids `monitor_ids`.
    pub async fn retag(
        &self,
        monitor_ids: &[u64],
        tag_names: &[String],
    ) -> Result<SyncReport, CoreError> {
        let mut session = self.connector.connect().await?;
        let result = async {
            let actual = fetch_state(&mut session).await?;
            let mut selected = Vec::with_capacity(monitor_ids.len());
            for id in monitor_ids {
                let monitor = actual
                    .monitors
                    .iter()
                    .find(|m| m.id == *id)
                    .ok_or_else(|| CoreError::NotFound {
                        entity_type: "Monitor".into(),
                        identifier: id.to_string(),
                    })?;
                selected.push(monitor.clone());
            }

            let mut report = SyncReport::default();
            reconcile::replace_tags_on_monitors(
                &mut session,
                &selected,
                tag_names,
                &actual.tags,
                &mut report,
            )
            .await?;
            Ok::<_, CoreError>(report)
        }
        .await;
        session.disconnect().await;
        log_outcome("retag", &result);
        result
    }
}

async fn fetch_state<S: MonitorService>(session: &mut S) -> Result<ActualState, CoreError> {
    let monitors = session.get_monitors().await?;
    let tags = session.get_tags().await?;
    debug!(monitors = monitors.len(), tags = tags.len(), "fetched actual state");
    Ok(ActualState { monitors, tags })
}

fn log_outcome(operation: &str, result: &Result<SyncReport, CoreError>) {
    match result {
        Ok(report) => info!(operation, summary = %report.summary(), "operation finished"),
        Err(e) => debug!(operation, error = %e, "operation aborted"),
    }
}
