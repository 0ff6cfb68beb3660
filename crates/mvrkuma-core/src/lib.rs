//! Show-file to Uptime Kuma reconciliation engine.
//!
//! This crate owns the domain model and the business logic between the
//! show-file collaborator (`mvrkuma-mvr`), the Uptime Kuma client
//! (`mvrkuma-api`) and the CLI:
//!
//! - **[`Controller`]**: facade that opens one logged-in session per
//!   operation, takes a fresh snapshot of the server, converges it toward
//!   the [`DesiredState`], and disconnects on every exit path.
//!
//! - **[`DesiredState`]**: fixtures and tags accumulated from imported MVR
//!   files. Imports are atomic: a file that fails to parse leaves the
//!   state untouched.
//!
//! - **Reconciliation** ([`reconcile`]): pure planning functions plus an
//!   applier written against the [`MonitorService`] / [`Connector`]
//!   capability traits. Per-call failures land in a [`SyncReport`] and
//!   never abort a pass.
//!
//! - **Merge** ([`merge`]): copies ipv4 networks from a scanned show file
//!   onto the fixtures of the real show, matching by uuid and then by
//!   DMX patch.
//!
//! - **Discovery** ([`discovery`]): Art-Net polling and export of the
//!   replying nodes as a minimal MVR.

pub mod config;
pub mod controller;
pub mod convert;
pub mod discovery;
pub mod error;
pub mod kuma;
pub mod merge;
pub mod model;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectionConfig, MonitorSettings};
pub use controller::Controller;
pub use discovery::{ArtNetDiscovery, DiscoveredDevice, discovered_scene};
pub use error::CoreError;
pub use kuma::{KumaConnector, KumaSession};
pub use merge::{MergeSummary, NetworkAssignment, merge_files};
pub use reconcile::{Connector, DeleteScope, MonitorService};
pub use store::{DesiredState, ImportSummary};

pub use model::{
    ActualState, DmxAddress, Fixture, FixtureAddresses, LayerFixtures, Monitor, MonitorKind,
    Network, NewMonitor, RemoteTag, SyncReport, Tag, TagAttachment, TagCategories, TagCategory,
};
