use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{RandomiserError, Result};

/// One row of the progression table.
///
/// `dependent` unlocks once every key in `requires` has been discovered;
/// unlocking it also unlocks everything in `on_satisfied`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRule {
    pub dependent: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub on_satisfied: Vec<String>,
    /// Depth the player can reach once `dependent` is unlocked.
    #[serde(default)]
    pub grants_depth: Option<u32>,
}

struct StaticRule {
    dependent: &'static str,
    requires: &'static [&'static str],
    on_satisfied: &'static [&'static str],
    grants_depth: Option<u32>,
}

const DEFAULT_RULES: &[StaticRule] = &[
    StaticRule {
        dependent: "seaglide",
        requires: &["seaglide_fragment"],
        on_satisfied: &[],
        grants_depth: Some(200),
    },
    StaticRule {
        dependent: "seamoth",
        requires: &["seamoth_fragment"],
        on_satisfied: &[],
        grants_depth: Some(300),
    },
    StaticRule {
        dependent: "moonpool",
        requires: &["moonpool_fragment"],
        // The upgrade console and the first depth module come with it.
        on_satisfied: &["vehicle_upgrade_console", "seamoth_depth_module_1"],
        grants_depth: None,
    },
    StaticRule {
        dependent: "seamoth_depth_module_1",
        requires: &[],
        on_satisfied: &[],
        grants_depth: Some(500),
    },
    StaticRule {
        dependent: "cyclops",
        requires: &[
            "cyclops_hull_fragment",
            "cyclops_bridge_fragment",
            "cyclops_engine_fragment",
        ],
        on_satisfied: &[],
        grants_depth: Some(900),
    },
    StaticRule {
        dependent: "prawn_suit",
        requires: &["prawn_suit_fragment"],
        on_satisfied: &["prawn_suit_depth_module_1"],
        grants_depth: Some(1300),
    },
    StaticRule {
        dependent: "prawn_suit_depth_module_1",
        requires: &[],
        on_satisfied: &[],
        grants_depth: Some(1700),
    },
    StaticRule {
        dependent: "laser_cutter",
        requires: &["laser_cutter_fragment"],
        on_satisfied: &[],
        grants_depth: None,
    },
];

pub fn default_rules() -> Vec<ProgressionRule> {
    DEFAULT_RULES
        .iter()
        .map(|r| ProgressionRule {
            dependent: r.dependent.to_string(),
            requires: r.requires.iter().map(|s| s.to_string()).collect(),
            on_satisfied: r.on_satisfied.iter().map(|s| s.to_string()).collect(),
            grants_depth: r.grants_depth,
        })
        .collect()
}

/// Reverse-indexed view of the progression table.
#[derive(Clone, Debug, Default)]
pub struct ProgressionGraph {
    rules: BTreeMap<String, ProgressionRule>,
    dependent_of: BTreeMap<String, String>,
    relevant: BTreeSet<String>,
}

impl ProgressionGraph {
    pub fn new(rules: Vec<ProgressionRule>) -> Result<Self> {
        let mut graph = Self::default();
        for rule in rules {
            for prereq in &rule.requires {
                if let Some(other) = graph
                    .dependent_of
                    .insert(prereq.clone(), rule.dependent.clone())
                {
                    if other != rule.dependent {
                        return Err(RandomiserError::Config(format!(
                            "{prereq} gates both {other} and {}",
                            rule.dependent
                        )));
                    }
                }
            }
            graph.relevant.insert(rule.dependent.clone());
            graph.relevant.extend(rule.on_satisfied.iter().cloned());
            if graph.rules.insert(rule.dependent.clone(), rule).is_some() {
                return Err(RandomiserError::Config(
                    "progression table lists a dependent twice".to_string(),
                ));
            }
        }
        Ok(graph)
    }

    /// Which higher-tier item `item` is a prerequisite for.
    pub fn dependent_of(&self, item: &str) -> Option<&str> {
        self.dependent_of.get(item).map(String::as_str)
    }

    pub fn is_progression_relevant(&self, item: &str) -> bool {
        self.relevant.contains(item)
    }

    pub fn rule(&self, dependent: &str) -> Option<&ProgressionRule> {
        self.rules.get(dependent)
    }

    /// Record that `discovered` has been placed and unlock whatever that
    /// completes. Returns the keys that became unlocked by this call, in the
    /// order they were unlocked.
    pub fn propagate(&self, state: &mut ProgressionState, discovered: &str) -> Vec<String> {
        let mut newly = Vec::new();
        let Some(dependent) = self.dependent_of(discovered) else {
            return newly;
        };
        if !self.is_progression_relevant(dependent) || state.is_unlocked(dependent) {
            return newly;
        }
        let Some(rule) = self.rule(dependent) else {
            return newly;
        };

        let satisfied = state
            .partial
            .entry(dependent.to_string())
            .or_default();
        satisfied.insert(discovered.to_string());
        if !rule.requires.iter().all(|r| satisfied.contains(r)) {
            return newly;
        }
        state.partial.remove(dependent);

        if state.unlock(dependent) {
            newly.push(dependent.to_string());
        }
        for extra in &rule.on_satisfied {
            if state.unlock(extra) {
                newly.push(extra.clone());
            }
        }
        newly
    }

    /// The deepest depth granted by any unlocked item, or `base` if deeper.
    pub fn reachable_depth(&self, state: &ProgressionState, base: u32) -> u32 {
        self.rules
            .values()
            .filter(|r| state.is_unlocked(&r.dependent))
            .filter_map(|r| r.grants_depth)
            .fold(base, u32::max)
    }
}

/// Append-only record of what a simulated playthrough has unlocked so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressionState {
    unlocked: BTreeSet<String>,
    partial: BTreeMap<String, BTreeSet<String>>,
}

impl ProgressionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, item: &str) -> bool {
        self.unlocked.contains(item)
    }

    /// Returns `true` only the first time `item` is unlocked.
    pub fn unlock(&mut self, item: &str) -> bool {
        self.unlocked.insert(item.to_string())
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &str> {
        self.unlocked.iter().map(String::as_str)
    }

    /// Prerequisites already seen for a dependent that is not unlocked yet.
    pub fn satisfied_for(&self, dependent: &str) -> usize {
        self.partial.get(dependent).map_or(0, BTreeSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> ProgressionGraph {
        ProgressionGraph::new(default_rules()).unwrap()
    }

    #[test]
    fn reverse_lookup() {
        let g = graph();
        assert_eq!(g.dependent_of("cyclops_bridge_fragment"), Some("cyclops"));
        assert_eq!(g.dependent_of("cyclops"), None);
        assert!(g.is_progression_relevant("seamoth_depth_module_1"));
        assert!(!g.is_progression_relevant("seamoth_fragment"));
    }

    #[test]
    fn single_prerequisite_unlocks_at_once() {
        let g = graph();
        let mut state = ProgressionState::new();
        assert_eq!(g.propagate(&mut state, "seamoth_fragment"), vec!["seamoth"]);
        assert!(state.is_unlocked("seamoth"));
    }

    #[test]
    fn fan_out_unlocks_siblings() {
        let g = graph();
        let mut state = ProgressionState::new();
        let unlocked = g.propagate(&mut state, "moonpool_fragment");
        assert_eq!(
            unlocked,
            vec!["moonpool", "vehicle_upgrade_console", "seamoth_depth_module_1"]
        );
        assert_eq!(g.reachable_depth(&state, 100), 500);
    }

    #[test]
    fn multi_prerequisite_waits_for_all() {
        let g = graph();
        let mut state = ProgressionState::new();
        assert!(g.propagate(&mut state, "cyclops_hull_fragment").is_empty());
        assert!(g.propagate(&mut state, "cyclops_hull_fragment").is_empty());
        assert_eq!(state.satisfied_for("cyclops"), 1);
        assert!(g.propagate(&mut state, "cyclops_engine_fragment").is_empty());
        assert!(!state.is_unlocked("cyclops"));
        assert_eq!(
            g.propagate(&mut state, "cyclops_bridge_fragment"),
            vec!["cyclops"]
        );
        assert!(g.propagate(&mut state, "cyclops_bridge_fragment").is_empty());
        assert_eq!(state.unlocked().filter(|k| *k == "cyclops").count(), 1);
    }

    #[test]
    fn already_unlocked_dependent_is_left_alone() {
        let g = graph();
        let mut state = ProgressionState::new();
        state.unlock("seaglide");
        assert!(g.propagate(&mut state, "seaglide_fragment").is_empty());
    }

    #[test]
    fn reachable_depth_uses_deepest_grant() {
        let g = graph();
        let mut state = ProgressionState::new();
        assert_eq!(g.reachable_depth(&state, 100), 100);
        state.unlock("seaglide");
        state.unlock("cyclops");
        assert_eq!(g.reachable_depth(&state, 100), 900);
        assert_eq!(g.reachable_depth(&state, 1000), 1000);
    }

    #[test]
    fn shared_prerequisite_is_rejected() {
        let rules = vec![
            ProgressionRule {
                dependent: "a".into(),
                requires: vec!["frag".into()],
                on_satisfied: vec![],
                grants_depth: None,
            },
            ProgressionRule {
                dependent: "b".into(),
                requires: vec!["frag".into()],
                on_satisfied: vec![],
                grants_depth: None,
            },
        ];
        assert!(matches!(
            ProgressionGraph::new(rules),
            Err(RandomiserError::Config(_))
        ));
    }
}
