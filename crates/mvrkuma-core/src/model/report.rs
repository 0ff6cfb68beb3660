// ── Operation report ──

use std::fmt;

use serde::Serialize;
use tracing::warn;

/// Outcome of one mutating operation.
///
/// Rejected remote calls do not abort a reconciliation pass; each one is
/// logged and kept here as a line the caller can show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub tags_created: usize,
    pub monitors_created: usize,
    pub tags_attached: usize,
    pub tags_detached: usize,
    pub monitors_deleted: usize,
    pub tags_deleted: usize,
    pub fixtures_skipped: usize,
    pub failures: Vec<String>,
}

impl SyncReport {
    /// Record a failed call and keep going.
    pub fn record_failure(&mut self, what: impl fmt::Display, err: impl fmt::Display) {
        warn!(error = %err, "{what} failed");
        self.failures.push(format!("{what}: {err}"));
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of remote mutations that succeeded.
    pub fn changes(&self) -> usize {
        self.tags_created
            + self.monitors_created
            + self.tags_attached
            + self.tags_detached
            + self.monitors_deleted
            + self.tags_deleted
    }

    /// One-line human summary; zero counters are left out.
    pub fn summary(&self) -> String {
        let counters = [
            (self.monitors_created, "monitors created"),
            (self.tags_created, "tags created"),
            (self.tags_attached, "tags attached"),
            (self.tags_detached, "tags detached"),
            (self.monitors_deleted, "monitors deleted"),
            (self.tags_deleted, "tags deleted"),
            (self.fixtures_skipped, "fixtures skipped"),
        ];
        let mut parts: Vec<String> = counters
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, label)| format!("{count} {label}"))
            .collect();
        if !self.failures.is_empty() {
            parts.push(format!("{} failed", self.failures.len()));
        }
        if parts.is_empty() {
            "nothing to do".into()
        } else {
            parts.join(", ")
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
