use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::biome::RegionDef;
use crate::items::{ItemTable, PlaceableItem};
use crate::progression::{default_rules, ProgressionGraph, ProgressionRule};
use crate::{RandomiserError, Result};

/// File names tried, in order, when loading from a directory.
const WORLD_CANDIDATES: &[&str] = &["world.json", "data/world.json", "demos/world.json"];

/// The immutable world table a run is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticData {
    pub regions: Vec<RegionDef>,
    pub items: Vec<PlaceableItem>,
    #[serde(default = "default_rules")]
    pub progression: Vec<ProgressionRule>,
}

fn join_candidate(base: &Path, candidate: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for part in candidate.split(['/', '\\']) {
        if !part.is_empty() {
            path.push(part);
        }
    }
    path
}

fn find_first_existing(base: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|c| join_candidate(base, c))
        .find(|p| p.exists())
}

impl StaticData {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let data: StaticData = serde_json::from_str(s)?;
        data.check()?;
        Ok(data)
    }

    /// Load a world file, or the first known world file under a directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = if path.is_dir() {
            find_first_existing(path, WORLD_CANDIDATES).ok_or_else(|| {
                RandomiserError::Config(format!(
                    "no world.json under {}",
                    path.display()
                ))
            })?
        } else {
            path.to_path_buf()
        };
        let text = fs::read_to_string(&file)?;
        Self::from_json_str(&text)
    }

    fn check(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(RandomiserError::Config("world has no regions".to_string()));
        }

        let mut names = BTreeSet::new();
        for region in &self.regions {
            if !names.insert(region.name.to_ascii_lowercase()) {
                return Err(RandomiserError::Config(format!(
                    "duplicate region {}",
                    region.name
                )));
            }
            if let Some(rate) = region.fragment_rate {
                if !rate.is_finite() || rate < 0.0 {
                    return Err(RandomiserError::Config(format!(
                        "region {} has invalid fragment rate {}",
                        region.name, rate
                    )));
                }
            }
            for b in &region.spawn_boxes {
                if b.x_min > b.x_max || b.z_min > b.z_max {
                    return Err(RandomiserError::Config(format!(
                        "region {} has an inverted spawn box",
                        region.name
                    )));
                }
            }
        }

        ItemTable::new(self.items.clone())?;
        ProgressionGraph::new(self.progression.clone())?;
        Ok(())
    }
}
