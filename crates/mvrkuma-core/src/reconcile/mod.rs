// ── Reconciliation engine ──
//
// Converges the server's monitors and tags toward the desired state.
// `plan` holds the pure decision functions; `apply` drives a
// `MonitorService` with them, one call at a time, recording rejected
// calls in a `SyncReport` instead of aborting.

pub mod apply;
pub mod plan;

use std::future::Future;

use crate::error::CoreError;
use crate::model::{Monitor, NewMonitor, RemoteTag};

pub use apply::{delete_monitors, delete_tags, ensure_tags_exist, reconcile_monitors, replace_tags_on_monitors};
pub use plan::{DeleteScope, TagChange, TagChangeKind};

/// Remote operations the engine needs from a logged-in session.
pub trait MonitorService: Send {
    fn get_monitors(&mut self) -> impl Future<Output = Result<Vec<Monitor>, CoreError>> + Send;

    fn get_tags(&mut self) -> impl Future<Output = Result<Vec<RemoteTag>, CoreError>> + Send;

    /// Create a monitor, returning its id.
    fn add_monitor(
        &mut self,
        monitor: &NewMonitor,
    ) -> impl Future<Output = Result<u64, CoreError>> + Send;

    /// Create a tag, returning its id.
    fn add_tag(
        &mut self,
        name: &str,
        color: &str,
    ) -> impl Future<Output = Result<u64, CoreError>> + Send;

    fn add_monitor_tag(
        &mut self,
        monitor_id: u64,
        tag_id: u64,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete_monitor_tag(
        &mut self,
        monitor_id: u64,
        tag_id: u64,
        value: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete_tag(&mut self, tag_id: u64) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete_monitor(
        &mut self,
        monitor_id: u64,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Release the session. Best effort, never fails.
    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;
}

/// Opens logged-in sessions. One session per top-level operation.
pub trait Connector: Send + Sync {
    type Session: MonitorService;

    fn connect(&self) -> impl Future<Output = Result<Self::Session, CoreError>> + Send;
}
