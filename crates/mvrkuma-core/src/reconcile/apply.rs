// Drives a `MonitorService` with the decisions from `plan`.
//
// Every remote mutation is attempted independently: a rejected call is
// logged and recorded in the report, and the pass moves on. A lost or
// unauthenticated session ends the pass with an error.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use tracing::{debug, info, warn};

use super::MonitorService;
use super::plan::{self, DeleteScope, TagChangeKind};
use crate::config::MonitorSettings;
use crate::error::CoreError;
use crate::model::{ActualState, Monitor, RemoteTag, SyncReport, TagCategories};
use crate::store::DesiredState;

/// Random `#rrggbb` display color for a new tag.
pub(crate) fn random_color() -> String {
    format!("#{:06x}", rand::thread_rng().gen_range(0..=0x00FF_FFFF_u32))
}

/// Record a rejected call, or hand back a session failure to abort on.
fn record_or_abort(
    report: &mut SyncReport,
    what: impl fmt::Display,
    err: CoreError,
) -> Result<(), CoreError> {
    if err.is_session_failure() {
        return Err(err);
    }
    report.record_failure(what, err);
    Ok(())
}

// ── Tag existence ───────────────────────────────────────────────────

/// Create every desired tag the server does not have yet.
pub async fn ensure_tags_exist<S: MonitorService>(
    service: &mut S,
    desired: &DesiredState,
    actual_tags: &[RemoteTag],
    report: &mut SyncReport,
) -> Result<(), CoreError> {
    let missing = plan::missing_tags(desired.tags(), actual_tags);
    if missing.is_empty() {
        debug!("all desired tags already exist");
        return Ok(());
    }

    for tag in missing {
        let color = random_color();
        match service.add_tag(&tag.name, &color).await {
            Ok(id) => {
                debug!(tag_id = id, tag = %tag.name, category = %tag.category, "created tag");
                report.tags_created += 1;
            }
            Err(e) => record_or_abort(report, format!("create tag '{}'", tag.name), e)?,
        }
    }
    Ok(())
}

// ── Monitors and tagging ────────────────────────────────────────────

/// Create missing monitors for fixtures with an ipv4 address and attach
/// their layer, position and class tags.
///
/// `actual` must be fresh, with tags fetched after [`ensure_tags_exist`].
pub async fn reconcile_monitors<S: MonitorService>(
    service: &mut S,
    desired: &DesiredState,
    actual: &ActualState,
    categories: TagCategories,
    settings: &MonitorSettings,
    report: &mut SyncReport,
) -> Result<(), CoreError> {
    // Monitor id and attached tag names by fixture uuid, for both existing
    // and newly created monitors, so a fixture imported twice is created
    // and tagged once.
    let mut seen: HashMap<String, (u64, Vec<String>)> = HashMap::new();

    for layer in &desired.layers {
        for fixture in &layer.fixtures {
            let Some(ipv4) = fixture.ipv4() else {
                debug!(fixture = %fixture.name, "no ipv4 network, skipping");
                report.fixtures_skipped += 1;
                continue;
            };
            if !fixture.has_uuid() {
                warn!(fixture = %fixture.name, "fixture has no uuid, skipping");
                report.fixtures_skipped += 1;
                continue;
            }

            let (monitor_id, current_tags) = if let Some((id, tags)) = seen.get(&fixture.uuid) {
                (*id, tags.clone())
            } else if let Some(existing) = actual.monitor_by_uuid(&fixture.uuid) {
                debug!(monitor_id = existing.id, fixture = %fixture.name, "monitor exists");
                (existing.id, existing.tags.clone())
            } else {
                let request = plan::monitor_for(fixture, ipv4, settings);
                match service.add_monitor(&request).await {
                    Ok(id) => {
                        info!(monitor_id = id, fixture = %fixture.name, target = %request.target(), "created monitor");
                        report.monitors_created += 1;
                        (id, Vec::new())
                    }
                    Err(e) => {
                        record_or_abort(
                            report,
                            format!("create monitor for '{}'", fixture.name),
                            e,
                        )?;
                        continue;
                    }
                }
            };

            let attachments = plan::plan_attachments(
                fixture,
                &layer.layer.name,
                desired,
                &actual.tags,
                &current_tags,
                categories,
            );

            let mut now_attached = current_tags;
            for tag in attachments {
                match service.add_monitor_tag(monitor_id, tag.id).await {
                    Ok(()) => {
                        debug!(monitor_id, tag = %tag.name, "attached tag");
                        report.tags_attached += 1;
                        now_attached.push(tag.name.clone());
                    }
                    Err(e) => record_or_abort(
                        report,
                        format!("attach tag '{}' to monitor {monitor_id}", tag.name),
                        e,
                    )?,
                }
            }

            seen.insert(fixture.uuid.clone(), (monitor_id, now_attached));
        }
    }
    Ok(())
}

// ── Deletion ────────────────────────────────────────────────────────

pub async fn delete_tags<S: MonitorService>(
    service: &mut S,
    scope: DeleteScope,
    desired: &DesiredState,
    actual_tags: &[RemoteTag],
    report: &mut SyncReport,
) -> Result<(), CoreError> {
    for tag in plan::tags_to_delete(scope, desired, actual_tags) {
        match service.delete_tag(tag.id).await {
            Ok(()) => {
                debug!(tag_id = tag.id, tag = %tag.name, "deleted tag");
                report.tags_deleted += 1;
            }
            Err(e) => record_or_abort(report, format!("delete tag '{}'", tag.name), e)?,
        }
    }
    Ok(())
}

pub async fn delete_monitors<S: MonitorService>(
    service: &mut S,
    scope: DeleteScope,
    desired: &DesiredState,
    actual_monitors: &[Monitor],
    report: &mut SyncReport,
) -> Result<(), CoreError> {
    for monitor in plan::monitors_to_delete(scope, desired, actual_monitors) {
        match service.delete_monitor(monitor.id).await {
            Ok(()) => {
                debug!(monitor_id = monitor.id, monitor = %monitor.name, "deleted monitor");
                report.monitors_deleted += 1;
            }
            Err(e) => {
                record_or_abort(report, format!("delete monitor '{}'", monitor.name), e)?;
            }
        }
    }
    Ok(())
}

// ── Tag-set replacement ─────────────────────────────────────────────

/// Make the tag set of each monitor exactly `tag_names`.
///
/// Fails before any call if a name is not a tag on the server.
pub async fn replace_tags_on_monitors<S: MonitorService>(
    service: &mut S,
    monitors: &[Monitor],
    tag_names: &[String],
    actual_tags: &[RemoteTag],
    report: &mut SyncReport,
) -> Result<(), CoreError> {
    let changes = plan::plan_tag_replacement(monitors, tag_names, actual_tags)?;

    for change in changes {
        let result = match change.kind {
            TagChangeKind::Attach => service.add_monitor_tag(change.monitor_id, change.tag_id).await,
            TagChangeKind::Detach => {
                service
                    .delete_monitor_tag(change.monitor_id, change.tag_id, &change.value)
                    .await
            }
        };
        match (result, change.kind) {
            (Ok(()), TagChangeKind::Attach) => report.tags_attached += 1,
            (Ok(()), TagChangeKind::Detach) => report.tags_detached += 1,
            (Err(e), kind) => record_or_abort(
                report,
                format!("{kind} tag '{}' on monitor {}", change.tag_name, change.monitor_id),
                e,
            )?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_call_is_recorded() {
        let mut report = SyncReport::default();
        let err = CoreError::remote_call("addTag", "duplicate");
        assert!(record_or_abort(&mut report, "create tag 'Wash'", err).is_ok());
        assert_eq!(report.failures, vec!["create tag 'Wash': addTag failed: duplicate"]);
    }

    #[test]
    fn lost_session_aborts() {
        let mut report = SyncReport::default();
        let err = CoreError::Timeout {
            waiting_for: "addMonitorTag".into(),
            timeout_secs: 10,
        };
        let result = record_or_abort(&mut report, "attach tag 'Wash'", err);
        assert!(matches!(result, Err(CoreError::Timeout { .. })));
        assert!(report.is_clean());
    }

    #[test]
    fn random_color_is_hex_rgb() {
        for _ in 0..32 {
            let color = random_color();
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
