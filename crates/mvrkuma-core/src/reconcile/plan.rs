// Pure reconciliation decisions. No I/O; every function here answers
// "what should change" from snapshots and is tested directly.

use std::collections::HashSet;

use serde::Serialize;
use strum::Display;

use crate::config::MonitorSettings;
use crate::error::CoreError;
use crate::model::{Fixture, Monitor, NewMonitor, RemoteTag, Tag, TagCategories, TagCategory};
use crate::store::DesiredState;

// ── Tag existence ───────────────────────────────────────────────────

/// Desired tags with no remote counterpart (by name or uuid), first
/// occurrence per name only. Blank names are never created.
pub fn missing_tags<'a>(
    desired: impl IntoIterator<Item = &'a Tag>,
    actual: &[RemoteTag],
) -> Vec<&'a Tag> {
    let mut seen = HashSet::new();
    desired
        .into_iter()
        .filter(|tag| !tag.name.trim().is_empty())
        .filter(|tag| !actual.iter().any(|remote| remote.matches(tag)))
        .filter(|tag| seen.insert(tag.name.clone()))
        .collect()
}

// ── Monitor creation ────────────────────────────────────────────────

/// The monitor to create for a fixture reachable at `ipv4`.
pub fn monitor_for(fixture: &Fixture, ipv4: &str, settings: &MonitorSettings) -> NewMonitor {
    NewMonitor {
        kind: settings.kind,
        name: fixture.name.clone(),
        ipv4: ipv4.to_owned(),
        description: fixture.uuid.clone(),
        interval: settings.interval,
        retry_interval: settings.retry_interval,
        resend_interval: settings.resend_interval,
        max_retries: settings.max_retries,
    }
}

// ── Tag attachment intents ──────────────────────────────────────────

/// Remote tags named after the fixture's layer.
pub fn layer_tag_intents<'a>(layer_name: &str, actual: &'a [RemoteTag]) -> Vec<&'a RemoteTag> {
    actual.iter().filter(|t| t.name == layer_name).collect()
}

/// Remote tags named like the desired position the fixture points at.
pub fn position_tag_intents<'a>(
    fixture: &Fixture,
    desired: &DesiredState,
    actual: &'a [RemoteTag],
) -> Vec<&'a RemoteTag> {
    keyed_tag_intents(fixture.position.as_deref(), TagCategory::Position, desired, actual)
}

/// Remote tags named like the desired class the fixture points at.
pub fn class_tag_intents<'a>(
    fixture: &Fixture,
    desired: &DesiredState,
    actual: &'a [RemoteTag],
) -> Vec<&'a RemoteTag> {
    keyed_tag_intents(fixture.classing.as_deref(), TagCategory::Class, desired, actual)
}

fn keyed_tag_intents<'a>(
    key: Option<&str>,
    category: TagCategory,
    desired: &DesiredState,
    actual: &'a [RemoteTag],
) -> Vec<&'a RemoteTag> {
    let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) else {
        return Vec::new();
    };
    let names: HashSet<&str> = desired
        .tags_with_uuid(category, key)
        .map(|t| t.name.as_str())
        .collect();
    actual
        .iter()
        .filter(|t| names.contains(t.name.as_str()))
        .collect()
}

/// Tags to attach to a fixture's monitor.
///
/// The enabled passes (layer, position, class) are folded left to right
/// over a set seeded with the monitor's current tag names, so no name is
/// attached twice.
pub fn plan_attachments<'a>(
    fixture: &Fixture,
    layer_name: &str,
    desired: &DesiredState,
    actual: &'a [RemoteTag],
    current_tags: &[String],
    categories: TagCategories,
) -> Vec<&'a RemoteTag> {
    let passes = [
        (TagCategory::Layer, layer_tag_intents(layer_name, actual)),
        (TagCategory::Position, position_tag_intents(fixture, desired, actual)),
        (TagCategory::Class, class_tag_intents(fixture, desired, actual)),
    ];

    let seen: HashSet<String> = current_tags.iter().cloned().collect();
    let (_, attachments) = passes
        .into_iter()
        .filter(|(category, _)| categories.includes(*category))
        .flat_map(|(_, intents)| intents)
        .fold((seen, Vec::new()), |(mut seen, mut out), tag| {
            if seen.insert(tag.name.clone()) {
                out.push(tag);
            }
            (seen, out)
        });
    attachments
}

// ── Deletion ────────────────────────────────────────────────────────

/// What a bulk deletion may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum DeleteScope {
    /// Everything on the server.
    #[strum(serialize = "all")]
    All,
    /// Only what the current desired state would have created.
    #[strum(serialize = "referenced by show files")]
    ReferencedByDesiredState,
}

pub fn tags_to_delete<'a>(
    scope: DeleteScope,
    desired: &DesiredState,
    actual: &'a [RemoteTag],
) -> Vec<&'a RemoteTag> {
    actual
        .iter()
        .filter(|tag| match scope {
            DeleteScope::All => true,
            DeleteScope::ReferencedByDesiredState => desired.references_tag(&tag.name),
        })
        .collect()
}

pub fn monitors_to_delete<'a>(
    scope: DeleteScope,
    desired: &DesiredState,
    actual: &'a [Monitor],
) -> Vec<&'a Monitor> {
    actual
        .iter()
        .filter(|monitor| match scope {
            DeleteScope::All => true,
            DeleteScope::ReferencedByDesiredState => desired.references_fixture(&monitor.uuid),
        })
        .collect()
}

// ── Tag-set replacement ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TagChangeKind {
    Attach,
    Detach,
}

/// One attach or detach on one monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChange {
    pub kind: TagChangeKind,
    pub monitor_id: u64,
    pub tag_id: u64,
    pub tag_name: String,
    /// Link value; detaching must name the value the link was made with.
    pub value: String,
}

/// Changes that make each monitor's tag set exactly `tag_names`.
///
/// Every name must exist on the server; nothing is planned otherwise.
pub fn plan_tag_replacement(
    monitors: &[Monitor],
    tag_names: &[String],
    actual_tags: &[RemoteTag],
) -> Result<Vec<TagChange>, CoreError> {
    let mut wanted: Vec<&RemoteTag> = Vec::new();
    for name in tag_names {
        let tag = actual_tags
            .iter()
            .find(|t| &t.name == name)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "Tag".into(),
                identifier: name.clone(),
            })?;
        if !wanted.iter().any(|w| w.name == tag.name) {
            wanted.push(tag);
        }
    }

    let mut changes = Vec::new();
    for monitor in monitors {
        for tag in &wanted {
            if !monitor.tags.contains(&tag.name) {
                changes.push(TagChange {
                    kind: TagChangeKind::Attach,
                    monitor_id: monitor.id,
                    tag_id: tag.id,
                    tag_name: tag.name.clone(),
                    value: String::new(),
                });
            }
        }
        for link in &monitor.attachments {
            if !wanted.iter().any(|w| w.name == link.name) {
                changes.push(TagChange {
                    kind: TagChangeKind::Detach,
                    monitor_id: monitor.id,
                    tag_id: link.tag_id,
                    tag_name: link.name.clone(),
                    value: link.value.clone(),
                });
            }
        }
    }
    Ok(changes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{LayerFixtures, TagAttachment};

    fn remote(id: u64, name: &str) -> RemoteTag {
        RemoteTag {
            id,
            name: name.into(),
            uuid: None,
            color: None,
        }
    }

    fn names(tags: &[&RemoteTag]) -> Vec<String> {
        tags.iter().map(|t| t.name.clone()).collect()
    }

    fn desired() -> DesiredState {
        DesiredState {
            layers: vec![LayerFixtures {
                layer: Tag::new(TagCategory::Layer, "L-1", "Stage"),
                fixtures: vec![Fixture {
                    uuid: "F-1".into(),
                    name: "Spot".into(),
                    layer_name: "Stage".into(),
                    position: Some("P-1".into()),
                    classing: Some("C-1".into()),
                    ..Fixture::default()
                }],
            }],
            classes: vec![Tag::new(TagCategory::Class, "C-1", "Wash")],
            positions: vec![Tag::new(TagCategory::Position, "P-1", "Truss")],
        }
    }

    fn monitor(id: u64, uuid: &str, tags: &[(u64, &str)]) -> Monitor {
        Monitor {
            id,
            uuid: uuid.into(),
            name: format!("m{id}"),
            tags: tags.iter().map(|(_, n)| (*n).to_owned()).collect(),
            attachments: tags
                .iter()
                .map(|(tag_id, n)| TagAttachment {
                    tag_id: *tag_id,
                    name: (*n).to_owned(),
                    value: String::new(),
                })
                .collect(),
            target: None,
        }
    }

    #[test]
    fn missing_tags_skips_existing_and_duplicates() {
        let state = desired();
        let mut tags: Vec<Tag> = state.tags().cloned().collect();
        tags.push(Tag::new(TagCategory::Layer, "L-2", "Stage"));
        let actual = vec![remote(1, "Truss")];

        let missing: Vec<&str> = missing_tags(&tags, &actual)
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(missing, vec!["Wash", "Stage"]);
    }

    #[test]
    fn missing_tags_matches_remote_uuid() {
        let state = desired();
        let actual = vec![RemoteTag {
            uuid: Some("C-1".into()),
            ..remote(1, "Renamed wash")
        }];
        let missing: Vec<&str> = missing_tags(state.tags(), &actual)
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(missing, vec!["Truss", "Stage"]);
    }

    #[test]
    fn missing_tags_is_empty_once_all_exist() {
        let state = desired();
        let actual = vec![remote(1, "Wash"), remote(2, "Truss"), remote(3, "Stage")];
        assert!(missing_tags(state.tags(), &actual).is_empty());
    }

    #[test]
    fn attachments_follow_layer_position_class_order() {
        let state = desired();
        let fixture = &state.layers[0].fixtures[0];
        let actual = vec![
            remote(1, "Wash"),
            remote(2, "Truss"),
            remote(3, "Stage"),
            remote(4, "Unrelated"),
        ];
        let planned = plan_attachments(
            fixture,
            "Stage",
            &state,
            &actual,
            &[],
            TagCategories::default(),
        );
        assert_eq!(names(&planned), vec!["Stage", "Truss", "Wash"]);
    }

    #[test]
    fn attachments_skip_current_tags_and_disabled_categories() {
        let state = desired();
        let fixture = &state.layers[0].fixtures[0];
        let actual = vec![remote(1, "Wash"), remote(2, "Truss"), remote(3, "Stage")];
        let categories = TagCategories {
            layers: true,
            classes: false,
            positions: true,
        };
        let planned = plan_attachments(
            fixture,
            "Stage",
            &state,
            &actual,
            &["Stage".to_owned()],
            categories,
        );
        assert_eq!(names(&planned), vec!["Truss"]);
    }

    #[test]
    fn attachments_dedupe_across_passes() {
        // A class named like the layer is attached once.
        let mut state = desired();
        state.classes[0].name = "Stage".into();
        let fixture = state.layers[0].fixtures[0].clone();
        let actual = vec![remote(3, "Stage"), remote(2, "Truss")];
        let planned = plan_attachments(
            &fixture,
            "Stage",
            &state,
            &actual,
            &[],
            TagCategories::default(),
        );
        assert_eq!(names(&planned), vec!["Stage", "Truss"]);
    }

    #[test]
    fn fixture_without_keys_gets_layer_only() {
        let state = desired();
        let fixture = Fixture {
            uuid: "F-2".into(),
            ..Fixture::default()
        };
        let actual = vec![remote(1, "Wash"), remote(3, "Stage")];
        let planned = plan_attachments(
            &fixture,
            "Stage",
            &state,
            &actual,
            &[],
            TagCategories::default(),
        );
        assert_eq!(names(&planned), vec!["Stage"]);
    }

    #[test]
    fn scoped_tag_deletion_is_precise() {
        let state = DesiredState {
            layers: vec![LayerFixtures {
                layer: Tag::new(TagCategory::Layer, "L", "Stage"),
                fixtures: vec![],
            }],
            classes: vec![Tag::new(TagCategory::Class, "C", "FOH")],
            positions: vec![],
        };
        let actual = vec![remote(1, "Stage"), remote(2, "FOH"), remote(3, "Unrelated")];

        let scoped = tags_to_delete(DeleteScope::ReferencedByDesiredState, &state, &actual);
        assert_eq!(names(&scoped), vec!["Stage", "FOH"]);

        let all = tags_to_delete(DeleteScope::All, &state, &actual);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn scoped_monitor_deletion_matches_uuid_only() {
        let state = desired();
        let actual = vec![monitor(1, "F-1", &[]), monitor(2, "F-9", &[]), monitor(3, "", &[])];
        let scoped = monitors_to_delete(DeleteScope::ReferencedByDesiredState, &state, &actual);
        assert_eq!(scoped.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(monitors_to_delete(DeleteScope::All, &state, &actual).len(), 3);
    }

    #[test]
    fn tag_replacement_attaches_and_detaches() {
        let actual = vec![remote(1, "Stage"), remote(2, "FOH"), remote(3, "Spare")];
        let monitors = vec![monitor(10, "A", &[(1, "Stage"), (3, "Spare")])];
        let changes =
            plan_tag_replacement(&monitors, &["Stage".into(), "FOH".into()], &actual).unwrap();
        assert_eq!(
            changes
                .iter()
                .map(|c| (c.kind, c.tag_name.as_str()))
                .collect::<Vec<_>>(),
            vec![(TagChangeKind::Attach, "FOH"), (TagChangeKind::Detach, "Spare")]
        );
    }

    #[test]
    fn tag_replacement_with_empty_set_detaches_everything() {
        let monitors = vec![monitor(10, "A", &[(1, "Stage"), (2, "FOH")])];
        let changes = plan_tag_replacement(&monitors, &[], &[]).unwrap();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.kind == TagChangeKind::Detach));
    }

    #[test]
    fn tag_replacement_rejects_unknown_tag() {
        let err = plan_tag_replacement(&[], &["Ghost".into()], &[remote(1, "Stage")]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn monitor_for_stores_uuid_as_description() {
        let fixture = Fixture {
            uuid: "F-1".into(),
            name: "Spot".into(),
            ..Fixture::default()
        };
        let m = monitor_for(&fixture, "10.0.0.5", &MonitorSettings::default());
        assert_eq!(m.description, "F-1");
        assert_eq!(m.name, "Spot");
        assert_eq!(m.target(), "http://10.0.0.5");
    }
}
