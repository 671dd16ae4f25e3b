use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::start::Coordinate;
use crate::{RandomiserError, Result};

/// One (region, count, probability) tuple for a single variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeSpawn {
    pub region: String,
    pub count: u32,
    pub probability: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantSpawn {
    pub class_id: String,
    pub biomes: Vec<BiomeSpawn>,
}

impl VariantSpawn {
    pub fn total_probability(&self) -> f32 {
        self.biomes.iter().map(|b| b.probability).sum()
    }
}

/// Everything decided about one item's spawns in a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub item: String,
    pub variants: Vec<VariantSpawn>,
}

impl PlacementRecord {
    pub fn new(item: &str) -> Self {
        Self {
            item: item.to_string(),
            variants: Vec::new(),
        }
    }

    /// Add a tuple for `class_id`, merging into the variant's existing entry.
    /// A region already listed for that variant is rejected.
    pub fn add(&mut self, class_id: &str, spawn: BiomeSpawn) -> Result<()> {
        let variant = match self.variants.iter_mut().position(|v| v.class_id == class_id) {
            Some(i) => &mut self.variants[i],
            None => {
                self.variants.push(VariantSpawn {
                    class_id: class_id.to_string(),
                    biomes: Vec::new(),
                });
                let last = self.variants.len() - 1;
                &mut self.variants[last]
            }
        };
        if variant.biomes.iter().any(|b| b.region == spawn.region) {
            return Err(RandomiserError::Config(format!(
                "{} already spawns {} in {}",
                self.item, class_id, spawn.region
            )));
        }
        variant.biomes.push(spawn);
        Ok(())
    }

    /// Distinct regions referenced by any variant.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = Vec::new();
        for variant in &self.variants {
            for biome in &variant.biomes {
                if !regions.contains(&biome.region.as_str()) {
                    regions.push(&biome.region);
                }
            }
        }
        regions
    }
}

/// In-memory accumulation of committed records for the current run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTable {
    records: BTreeMap<String, PlacementRecord>,
}

impl SpawnTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records are immutable once committed; committing an item twice fails.
    pub fn commit(&mut self, record: PlacementRecord) -> Result<()> {
        if self.records.contains_key(&record.item) {
            return Err(RandomiserError::Config(format!(
                "{} was already placed this run",
                record.item
            )));
        }
        self.records.insert(record.item.clone(), record);
        Ok(())
    }

    pub fn contains(&self, item: &str) -> bool {
        self.records.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> BTreeMap<String, PlacementRecord> {
        self.records
    }
}

/// Result of a whole run, handed to the persistence layer in one piece.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub seed: u64,
    pub placements: BTreeMap<String, PlacementRecord>,
    #[serde(default)]
    pub discovery_overrides: BTreeMap<String, u32>,
    #[serde(default)]
    pub start: Option<Coordinate>,
}

impl Distribution {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
