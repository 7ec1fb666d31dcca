//! Deterministic graph and evolution metrics over the conflict network.

use chrono::{DateTime, Utc};
use dramaturg_network::{ConflictNetwork, ConflictPhase, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// How evenly dramatic weight is spread over the characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DramaticBalance {
    /// Gini coefficient of per-character involvement, 0 (even) to 1
    pub involvement_gini: f64,
    /// `1 - involvement_gini`
    pub balance_score: f64,
}

/// Shares of entities that add nothing new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redundancy {
    /// Characters in no relationship and no conflict
    pub character_redundancy: f64,
    /// Relationships repeating an earlier pair and type
    pub relationship_redundancy: f64,
    /// Conflicts repeating an earlier subject and cast
    pub conflict_redundancy: f64,
}

/// `1 - redundancy` per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeEfficiency {
    /// Character efficiency
    pub character: f64,
    /// Relationship efficiency
    pub relationship: f64,
    /// Conflict efficiency
    pub conflict: f64,
}

impl NarrativeEfficiency {
    fn mean(&self) -> f64 {
        (self.character + self.relationship + self.conflict) / 3.0
    }
}

/// Station 4 metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyMetrics {
    /// Mean share of connected character pairs inside each conflict
    pub conflict_cohesion: f64,
    /// Spread of involvement
    pub dramatic_balance: DramaticBalance,
    /// Relationships over possible pairs
    pub narrative_density: f64,
    /// Duplicated or idle entities
    pub redundancy: Redundancy,
    /// Complement of redundancy
    pub narrative_efficiency: NarrativeEfficiency,
    /// 0 to 10
    pub overall_efficiency_score: f64,
    /// Excellent, Good, Fair or Poor
    pub overall_rating: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Gini coefficient of non-negative values; 0 when empty or all zero.
pub(crate) fn gini(values: &[usize]) -> f64 {
    let n = values.len();
    let total: usize = values.iter().sum();
    if n == 0 || total == 0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i + 1) as f64 * *x as f64)
        .sum();
    let n = n as f64;
    ((2.0 * weighted) / (n * total as f64) - (n + 1.0) / n).clamp(0.0, 1.0)
}

fn conflict_cohesion(network: &ConflictNetwork) -> f64 {
    let conflicts = network.conflicts();
    if conflicts.is_empty() {
        return 0.0;
    }
    let connected: HashSet<(&str, &str)> = network
        .relationships()
        .values()
        .map(|r| r.unordered_pair())
        .collect();

    let total: f64 = conflicts
        .values()
        .map(|conflict| {
            let cast = conflict.involved_characters();
            if cast.len() < 2 {
                return 1.0;
            }
            let mut pairs = 0usize;
            let mut linked = 0usize;
            for (i, a) in cast.iter().enumerate() {
                for b in &cast[i + 1..] {
                    pairs += 1;
                    let key = if a <= b {
                        (a.as_str(), b.as_str())
                    } else {
                        (b.as_str(), a.as_str())
                    };
                    if connected.contains(&key) {
                        linked += 1;
                    }
                }
            }
            share(linked, pairs)
        })
        .sum();
    total / conflicts.len() as f64
}

fn redundancy(network: &ConflictNetwork) -> Redundancy {
    let characters = network.characters();
    let idle = characters
        .keys()
        .filter(|id| network.involvement(id) == 0)
        .count();

    let mut seen_pairs = HashSet::new();
    let duplicate_relationships = network
        .relationships()
        .values()
        .filter(|r| !seen_pairs.insert((r.unordered_pair(), *r.kind())))
        .count();

    let mut seen_conflicts = HashSet::new();
    let duplicate_conflicts = network
        .conflicts()
        .values()
        .filter(|c| {
            let cast: BTreeSet<&str> = c.involved_characters().iter().map(String::as_str).collect();
            !seen_conflicts.insert((*c.subject(), cast))
        })
        .count();

    Redundancy {
        character_redundancy: share(idle, characters.len()),
        relationship_redundancy: share(duplicate_relationships, network.relationships().len()),
        conflict_redundancy: share(duplicate_conflicts, network.conflicts().len()),
    }
}

fn rating(score: f64) -> &'static str {
    match score {
        s if s >= 8.0 => "Excellent",
        s if s >= 6.0 => "Good",
        s if s >= 4.0 => "Fair",
        _ => "Poor",
    }
}

/// Compute the station 4 metrics.
///
/// # Examples
///
/// ```
/// use dramaturg_network::ConflictNetwork;
/// use dramaturg_stations::network_metrics;
///
/// let metrics = network_metrics(&ConflictNetwork::new("empty"));
/// assert_eq!(metrics.conflict_cohesion, 0.0);
/// assert_eq!(metrics.overall_rating, "Poor");
/// ```
pub fn network_metrics(network: &ConflictNetwork) -> EfficiencyMetrics {
    let n = network.characters().len();
    let involvement: Vec<usize> = network
        .characters()
        .keys()
        .map(|id| network.involvement(id))
        .collect();
    let involvement_gini = gini(&involvement);
    let balance_score = 1.0 - involvement_gini;

    let possible_pairs = n * n.saturating_sub(1) / 2;
    let narrative_density = share(network.relationships().len(), possible_pairs).min(1.0);

    let conflict_cohesion = conflict_cohesion(network);
    let redundancy = redundancy(network);
    let narrative_efficiency = NarrativeEfficiency {
        character: 1.0 - redundancy.character_redundancy,
        relationship: 1.0 - redundancy.relationship_redundancy,
        conflict: 1.0 - redundancy.conflict_redundancy,
    };

    let overall = if n == 0 {
        0.0
    } else {
        10.0 * (conflict_cohesion + balance_score + narrative_density + narrative_efficiency.mean())
            / 4.0
    };
    let overall = round2(overall.clamp(0.0, 10.0));

    EfficiencyMetrics {
        conflict_cohesion: round2(conflict_cohesion),
        dramatic_balance: DramaticBalance {
            involvement_gini: round2(involvement_gini),
            balance_score: round2(balance_score),
        },
        narrative_density: round2(narrative_density),
        redundancy: Redundancy {
            character_redundancy: round2(redundancy.character_redundancy),
            relationship_redundancy: round2(redundancy.relationship_redundancy),
            conflict_redundancy: round2(redundancy.conflict_redundancy),
        },
        narrative_efficiency: NarrativeEfficiency {
            character: round2(narrative_efficiency.character),
            relationship: round2(narrative_efficiency.relationship),
            conflict: round2(narrative_efficiency.conflict),
        },
        overall_efficiency_score: overall,
        overall_rating: rating(overall).to_string(),
    }
}

/// A conflict that moved between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChange {
    /// Conflict id
    pub conflict_id: String,
    /// Conflict name
    pub conflict_name: String,
    /// Phase in the earlier snapshot
    pub from: ConflictPhase,
    /// Phase in the later snapshot
    pub to: ConflictPhase,
}

/// One snapshot on the event timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// Snapshot position
    pub snapshot_index: usize,
    /// Snapshot time
    pub timestamp: DateTime<Utc>,
    /// Snapshot description
    pub description: String,
    /// Character count
    pub characters: usize,
    /// Relationship count
    pub relationships: usize,
    /// Conflict count
    pub conflicts: usize,
    /// Phase moves since the previous snapshot
    pub phase_changes: Vec<PhaseChange>,
}

/// How the network changed across its snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionMetrics {
    /// Snapshots considered
    pub snapshots_analyzed: usize,
    /// Relationships gained from first to last snapshot
    pub relationship_growth: i64,
    /// Conflicts gained from first to last snapshot
    pub conflict_growth: i64,
    /// Phase moves across the whole history
    pub phase_transitions: usize,
    /// 1 when nothing changed, 0 when everything did
    pub stability_score: f64,
}

fn phase_changes(previous: &Snapshot, current: &Snapshot) -> Vec<PhaseChange> {
    current
        .conflicts()
        .iter()
        .filter_map(|(id, conflict)| {
            let before = previous.conflicts().get(id)?;
            (before.phase() != conflict.phase()).then(|| PhaseChange {
                conflict_id: id.clone(),
                conflict_name: conflict.name().clone(),
                from: *before.phase(),
                to: *conflict.phase(),
            })
        })
        .collect()
}

/// One timeline event per snapshot, oldest first.
pub fn event_timeline(snapshots: &[Snapshot]) -> Vec<TimelineEvent> {
    snapshots
        .iter()
        .enumerate()
        .map(|(i, snapshot)| TimelineEvent {
            snapshot_index: *snapshot.index(),
            timestamp: *snapshot.timestamp(),
            description: snapshot.description().clone(),
            characters: snapshot.characters().len(),
            relationships: snapshot.relationships().len(),
            conflicts: snapshot.conflicts().len(),
            phase_changes: if i == 0 {
                Vec::new()
            } else {
                phase_changes(&snapshots[i - 1], snapshot)
            },
        })
        .collect()
}

/// Count keys that differ between two maps of comparable records.
fn changed_entities<V: PartialEq>(
    first: &std::collections::BTreeMap<String, V>,
    last: &std::collections::BTreeMap<String, V>,
) -> (usize, usize) {
    let keys: BTreeSet<&String> = first.keys().chain(last.keys()).collect();
    let changed = keys
        .iter()
        .filter(|key| first.get(key.as_str()) != last.get(key.as_str()))
        .count();
    (changed, keys.len())
}

/// Evolution metrics between the first and last snapshot.
pub fn evolution_metrics(snapshots: &[Snapshot]) -> EvolutionMetrics {
    let (Some(first), Some(last)) = (snapshots.first(), snapshots.last()) else {
        return EvolutionMetrics {
            stability_score: 1.0,
            ..Default::default()
        };
    };

    let phase_transitions = snapshots
        .windows(2)
        .map(|pair| phase_changes(&pair[0], &pair[1]).len())
        .sum();

    let (c_changed, c_total) = changed_entities(first.characters(), last.characters());
    let (r_changed, r_total) = changed_entities(first.relationships(), last.relationships());
    let (k_changed, k_total) = changed_entities(first.conflicts(), last.conflicts());
    let changed = c_changed + r_changed + k_changed;
    let total = (c_total + r_total + k_total).max(1);

    EvolutionMetrics {
        snapshots_analyzed: snapshots.len(),
        relationship_growth: last.relationships().len() as i64
            - first.relationships().len() as i64,
        conflict_growth: last.conflicts().len() as i64 - first.conflicts().len() as i64,
        phase_transitions,
        stability_score: round2((1.0 - changed as f64 / total as f64).clamp(0.0, 1.0)),
    }
}
