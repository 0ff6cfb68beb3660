//! Network fusion between two show files.
//!
//! A *source* scene (typically a network scan exported as a minimal MVR)
//! donates ipv4 networks to the fixtures of a *target* scene (the real
//! show). Each source fixture is matched to at most one target fixture:
//!
//! 1. equal non-empty uuid, searched across every unconsumed target;
//! 2. otherwise the first unconsumed target whose first DMX address has the
//!    same `(address, universe)` as the source's first DMX address.
//!
//! Sources are consumed last-first. A matched target is consumed and never
//! receives a second network. Sources without an ipv4 network are skipped.

use std::path::{Path, PathBuf};

use mvrkuma_mvr::{MvrNetwork, SceneDocument};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info};

use crate::convert::fixture_from_mvr;
use crate::error::CoreError;
use crate::model::{Fixture, Network};

/// Default output file name for [`merge_files`].
pub const DEFAULT_MERGE_OUTPUT: &str = "merged_with_network.mvr";

/// Which identity rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MatchRule {
    Uuid,
    Address,
}

/// A network to copy onto the target fixture at `target_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkAssignment {
    pub target_index: usize,
    pub source_index: usize,
    pub rule: MatchRule,
    pub network: Network,
}

/// Compute which target fixture receives which source network.
pub fn plan_merge(sources: &[Fixture], targets: &[Fixture]) -> Vec<NetworkAssignment> {
    let mut consumed = vec![false; targets.len()];
    let mut assignments = Vec::new();

    for (source_index, source) in sources.iter().enumerate().rev() {
        let Some(network) = source.ipv4_network() else {
            continue;
        };

        let by_uuid = targets
            .iter()
            .enumerate()
            .find(|(i, target)| !consumed[*i] && source.same_identity(target))
            .map(|(i, _)| (i, MatchRule::Uuid));

        let matched = by_uuid.or_else(|| {
            let source_address = source.dmx_address()?;
            targets
                .iter()
                .enumerate()
                .find(|(i, target)| {
                    !consumed[*i]
                        && target
                            .dmx_address()
                            .is_some_and(|a| a.same_patch(source_address))
                })
                .map(|(i, _)| (i, MatchRule::Address))
        });

        match matched {
            Some((target_index, rule)) => {
                consumed[target_index] = true;
                debug!(
                    source = %source.name,
                    target = %targets[target_index].name,
                    %rule,
                    "matched fixture"
                );
                assignments.push(NetworkAssignment {
                    target_index,
                    source_index,
                    rule,
                    network: network.clone(),
                });
            }
            None => debug!(source = %source.name, "no target for source fixture"),
        }
    }
    assignments
}

/// Targets with the source networks fused in. Only networks change.
pub fn merge(sources: &[Fixture], targets: &[Fixture]) -> Vec<Fixture> {
    let mut merged = targets.to_vec();
    for assignment in plan_merge(sources, targets) {
        if let Some(target) = merged.get_mut(assignment.target_index) {
            target.set_ipv4_network(assignment.network);
        }
    }
    merged
}

/// Result of [`merge_files`].
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub source_fixtures: usize,
    pub target_fixtures: usize,
    pub assignments: Vec<NetworkAssignment>,
}

/// Fuse networks from `source_path` into `target_path`, writing `output_path`.
pub fn merge_files(
    target_path: &Path,
    source_path: &Path,
    output_path: &Path,
) -> Result<MergeSummary, CoreError> {
    if same_file(target_path, source_path) {
        return Err(CoreError::ValidationFailed {
            message: "target and source must be different files".into(),
        });
    }

    let mut target = open_scene(target_path)?;
    let source = open_scene(source_path)?;

    let source_fixtures = flatten(&source);
    let target_fixtures = flatten(&target);
    let assignments = plan_merge(&source_fixtures, &target_fixtures);

    for assignment in &assignments {
        target.set_network(assignment.target_index, &MvrNetwork::from(&assignment.network))?;
    }
    target.write(output_path)?;

    info!(
        output = %output_path.display(),
        matched = assignments.len(),
        "merged show files"
    );
    Ok(MergeSummary {
        output: output_path.to_path_buf(),
        source_fixtures: source_fixtures.len(),
        target_fixtures: target_fixtures.len(),
        assignments,
    })
}

fn open_scene(path: &Path) -> Result<SceneDocument, CoreError> {
    SceneDocument::open(path).map_err(|e| CoreError::ParseFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Fixtures in the order `SceneDocument::set_network` indexes them.
fn flatten(document: &SceneDocument) -> Vec<Fixture> {
    document
        .layers()
        .iter()
        .flat_map(|layer| {
            layer
                .fixtures
                .iter()
                .map(|f| fixture_from_mvr(f, &layer.name))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{DmxAddress, FixtureAddresses};

    fn fixture(uuid: &str, dmx: Option<(u32, u32)>, ipv4: Option<&str>) -> Fixture {
        Fixture {
            uuid: uuid.into(),
            name: format!("fixture-{uuid}"),
            addresses: FixtureAddresses {
                networks: ipv4.map(Network::with_ipv4).into_iter().collect(),
                addresses: dmx
                    .map(|(universe, address)| DmxAddress {
                        dmx_break: 0,
                        universe,
                        address,
                    })
                    .into_iter()
                    .collect(),
            },
            ..Fixture::default()
        }
    }

    #[test]
    fn uuid_match_copies_network() {
        let sources = vec![fixture("A", None, Some("10.0.0.5"))];
        let targets = vec![fixture("A", None, None)];
        let merged = merge(&sources, &targets);
        assert_eq!(merged[0].addresses.networks, vec![Network::with_ipv4("10.0.0.5")]);
    }

    #[test]
    fn address_fallback_when_uuids_differ() {
        let sources = vec![fixture("X", Some((1, 5)), Some("10.0.0.9"))];
        let targets = vec![fixture("Y", Some((1, 5)), None)];
        let plan = plan_merge(&sources, &targets);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].rule, MatchRule::Address);
        assert_eq!(merge(&sources, &targets)[0].ipv4(), Some("10.0.0.9"));
    }

    #[test]
    fn uuid_match_wins_over_earlier_address_match() {
        let sources = vec![fixture("A", Some((1, 1)), Some("10.0.0.1"))];
        let targets = vec![
            fixture("B", Some((1, 1)), None),
            fixture("A", Some((2, 7)), None),
        ];
        let merged = merge(&sources, &targets);
        assert_eq!(merged[0].ipv4(), None);
        assert_eq!(merged[1].ipv4(), Some("10.0.0.1"));
    }

    #[test]
    fn target_is_consumed_at_most_once() {
        // Both sources patch to 1.5; sources are consumed last-first.
        let sources = vec![
            fixture("S1", Some((1, 5)), Some("10.0.0.1")),
            fixture("S2", Some((1, 5)), Some("10.0.0.2")),
        ];
        let targets = vec![fixture("T", Some((1, 5)), None)];
        let plan = plan_merge(&sources, &targets);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].source_index, 1);
        assert_eq!(merge(&sources, &targets)[0].ipv4(), Some("10.0.0.2"));
    }

    #[test]
    fn second_source_falls_through_to_next_target() {
        let sources = vec![
            fixture("S1", Some((1, 5)), Some("10.0.0.1")),
            fixture("S2", Some((1, 5)), Some("10.0.0.2")),
        ];
        let targets = vec![
            fixture("T1", Some((1, 5)), None),
            fixture("T2", Some((1, 5)), None),
        ];
        let merged = merge(&sources, &targets);
        assert_eq!(merged[0].ipv4(), Some("10.0.0.2"));
        assert_eq!(merged[1].ipv4(), Some("10.0.0.1"));
    }

    #[test]
    fn sources_without_network_change_nothing() {
        let sources = vec![fixture("A", Some((1, 1)), None)];
        let targets = vec![fixture("A", Some((1, 1)), None)];
        assert!(plan_merge(&sources, &targets).is_empty());
        assert_eq!(merge(&sources, &targets), targets);
    }

    #[test]
    fn missing_dmx_on_either_side_prevents_address_match() {
        let sources = vec![fixture("X", None, Some("10.0.0.1"))];
        let targets = vec![fixture("Y", Some((1, 1)), None)];
        assert!(plan_merge(&sources, &targets).is_empty());

        let sources = vec![fixture("X", Some((1, 1)), Some("10.0.0.1"))];
        let targets = vec![fixture("Y", None, None)];
        assert!(plan_merge(&sources, &targets).is_empty());
    }

    #[test]
    fn empty_uuids_do_not_match_each_other() {
        let sources = vec![fixture("", None, Some("10.0.0.1"))];
        let targets = vec![fixture("", None, None)];
        assert!(plan_merge(&sources, &targets).is_empty());
    }

    #[test]
    fn existing_target_network_is_replaced() {
        let sources = vec![fixture("A", None, Some("10.0.0.5"))];
        let targets = vec![fixture("A", None, Some("192.168.0.1"))];
        let merged = merge(&sources, &targets);
        assert_eq!(merged[0].addresses.networks.len(), 1);
        assert_eq!(merged[0].ipv4(), Some("10.0.0.5"));
    }

    #[test]
    fn target_geometry_survives_the_merge() {
        let sources = vec![fixture("A", None, Some("10.0.0.5"))];
        let mut targets = vec![fixture("A", None, Some("192.168.0.1"))];
        targets[0].addresses.networks[0].geometry = Some("NetworkInOut_1".into());

        let merged = merge(&sources, &targets);
        assert_eq!(merged[0].ipv4(), Some("10.0.0.5"));
        assert_eq!(
            merged[0].addresses.networks[0].geometry.as_deref(),
            Some("NetworkInOut_1")
        );
    }

    #[test]
    fn same_file_is_rejected() {
        let path = Path::new("/tmp/show.mvr");
        let err = merge_files(path, path, Path::new("/tmp/out.mvr")).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }
}
