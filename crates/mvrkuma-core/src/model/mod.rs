// ── Domain model ──
//
// Desired state (fixtures and tags parsed from show files) and actual
// state (monitors and tags on the Uptime Kuma server) as plain value
// snapshots. Every fetch or import replaces them wholesale.

pub mod fixture;
pub mod monitor;
pub mod report;
pub mod tag;

// ── Re-exports ──────────────────────────────────────────────────────

pub use fixture::{DmxAddress, Fixture, FixtureAddresses, LayerFixtures, Network};
pub use monitor::{ActualState, Monitor, MonitorKind, NewMonitor, TagAttachment};
pub use report::SyncReport;
pub use tag::{RemoteTag, Tag, TagCategories, TagCategory};
