use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::biome::{RegionId, RegionRegistry};
use crate::config::{RandomiserSettings, MIN_BIOMES_PER_ITEM};
use crate::items::{ItemTable, DEFAULT_DISCOVERIES_TO_UNLOCK};
use crate::progression::{ProgressionGraph, ProgressionState};
use crate::random::RandomHandler;
use crate::spawn::{BiomeSpawn, PlacementRecord, SpawnTable};
use crate::{RandomiserError, Result};

/// Share of the base percentage added per discovery above the default.
const DISCOVERY_BONUS_PER_EXTRA: f32 = 0.05;

/// Outcome of one `place_item` call.
#[derive(Clone, Debug, PartialEq)]
pub enum Placement {
    Placed(PlacementRecord),
    /// Not reachable yet at the current depth.
    Skipped,
}

/// Split `budget` over `count` variants with the normalize-random method.
///
/// One raw draw per variant, scaled so the parts sum to `budget`.
pub fn split_budget(rng: &mut RandomHandler, budget: f32, count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![budget],
        _ => {
            let raw: Vec<f64> = (0..count).map(|_| rng.next_double()).collect();
            let sum: f64 = raw.iter().sum();
            if sum <= 0.0 {
                return vec![budget / count as f32; count];
            }
            let scale = budget as f64 / sum;
            let mut parts: Vec<f32> = raw.iter().map(|r| (r * scale) as f32).collect();
            // Park the rounding residue on the largest part so the total is exact.
            let residue = budget - parts.iter().sum::<f32>();
            if let Some(largest) = parts
                .iter_mut()
                .max_by(|a, b| a.total_cmp(b))
            {
                *largest = (*largest + residue).max(0.0);
            }
            parts
        }
    }
}

/// Base spawn percentage for one region pick, before the region's weight.
pub fn spawn_percentage(rng: &mut RandomHandler, min: f32, max: f32, discoveries: u32) -> f32 {
    let mut percentage = min + rng.next_double() as f32 * (max - min);
    if discoveries > DEFAULT_DISCOVERIES_TO_UNLOCK {
        let excess = (discoveries - DEFAULT_DISCOVERIES_TO_UNLOCK) as f32;
        percentage += percentage * DISCOVERY_BONUS_PER_EXTRA * excess;
    }
    percentage
}

/// The placement engine. Borrows the static tables and owns the mutable state
/// of a single run.
pub struct FragmentLogic<'a> {
    items: &'a ItemTable,
    graph: &'a ProgressionGraph,
    settings: &'a RandomiserSettings,
    registry: &'a mut RegionRegistry,
    rng: &'a mut RandomHandler,
    spawns: SpawnTable,
    discoveries: BTreeMap<String, u32>,
}

impl<'a> FragmentLogic<'a> {
    pub fn new(
        items: &'a ItemTable,
        graph: &'a ProgressionGraph,
        settings: &'a RandomiserSettings,
        registry: &'a mut RegionRegistry,
        rng: &'a mut RandomHandler,
    ) -> Self {
        Self {
            items,
            graph,
            settings,
            registry,
            rng,
            spawns: SpawnTable::new(),
            discoveries: BTreeMap::new(),
        }
    }

    /// Decide how many discoveries each item needs. Only randomised counts are
    /// returned as overrides.
    pub fn decide_discovery_counts(&mut self) -> BTreeMap<String, u32> {
        let mut overrides = BTreeMap::new();
        for item in self.items.iter() {
            let count = if self.settings.randomize_discovery_count {
                let n = self.rng.range_inclusive(
                    self.settings.min_discoveries_to_unlock,
                    self.settings.max_discoveries_to_unlock,
                );
                overrides.insert(item.key.clone(), n);
                n
            } else {
                item.discoveries_or_default()
            };
            self.discoveries.insert(item.key.clone(), count);
        }
        overrides
    }

    pub fn discoveries_for(&self, key: &str) -> u32 {
        self.discoveries
            .get(key)
            .copied()
            .or_else(|| self.items.get(key).ok().map(|i| i.discoveries_or_default()))
            .unwrap_or(DEFAULT_DISCOVERIES_TO_UNLOCK)
    }

    pub fn spawns(&self) -> &SpawnTable {
        &self.spawns
    }

    pub fn into_spawns(self) -> SpawnTable {
        self.spawns
    }

    /// Spread `key`'s variants over between `MIN_BIOMES_PER_ITEM` and
    /// `max_biomes_per_item` distinct regions, then propagate progression.
    /// The count never exceeds the number of regions reachable at
    /// `reachable_depth`.
    pub fn place_item(
        &mut self,
        key: &str,
        progression: &mut ProgressionState,
        reachable_depth: u32,
    ) -> Result<Placement> {
        let items = self.items;
        let item = items.get(key)?;
        if item.accessibility_depth >= reachable_depth {
            debug!(
                item = key,
                item_depth = item.accessibility_depth,
                reachable_depth,
                "skipping item, not reachable yet"
            );
            return Ok(Placement::Skipped);
        }
        if self.spawns.contains(key) {
            return Err(RandomiserError::Config(format!("{key} was already placed this run")));
        }

        let drawn = self
            .rng
            .range_inclusive(MIN_BIOMES_PER_ITEM, self.settings.max_biomes_per_item);
        // Regions are distinct per item, so the reachable world bounds the count.
        let reachable_regions = self.registry.full_regions(reachable_depth).len() as u32;
        if reachable_regions == 0 {
            return Err(RandomiserError::Infeasible {
                item: key.to_string(),
                depth: reachable_depth,
            });
        }
        let biome_count = drawn.min(reachable_regions);
        if biome_count < drawn {
            debug!(
                item = key,
                drawn,
                biome_count,
                reachable_depth,
                "clamped biome count to reachable regions"
            );
        }
        let discoveries = self.discoveries_for(key);
        let mut record = PlacementRecord::new(key);
        let mut chosen: BTreeSet<RegionId> = BTreeSet::new();

        for _ in 0..biome_count {
            let region_id = self.pick_region(key, reachable_depth, &chosen)?;
            chosen.insert(region_id);
            self.registry.mark_used(region_id);

            let region = self.registry.region(region_id);
            let percentage = spawn_percentage(
                self.rng,
                self.settings.spawn_chance_min,
                self.settings.spawn_chance_max,
                discoveries,
            );
            let budget = percentage * region.fragment_rate();
            let region_name = region.name().to_string();

            let parts = split_budget(self.rng, budget, item.variants.len());
            for (class_id, probability) in item.variants.iter().zip(parts) {
                record.add(
                    class_id,
                    BiomeSpawn {
                        region: region_name.clone(),
                        count: 1,
                        probability,
                    },
                )?;
            }
        }

        if !self.settings.recipes_randomized {
            for unlocked in self.graph.propagate(progression, key) {
                info!(item = key, unlocked = %unlocked, "progression unlocked");
            }
        }

        self.spawns.commit(record.clone())?;
        Ok(Placement::Placed(record))
    }

    fn pick_region(
        &mut self,
        key: &str,
        reachable_depth: u32,
        chosen: &BTreeSet<RegionId>,
    ) -> Result<RegionId> {
        let mut candidates = self.registry.available_regions(reachable_depth, chosen);
        if candidates.is_empty() {
            candidates = self
                .registry
                .full_regions(reachable_depth)
                .into_iter()
                .filter(|id| !chosen.contains(id))
                .collect();
            debug!(
                item = key,
                candidates = candidates.len(),
                "available pool exhausted, using full pool"
            );
        }
        let &id = self
            .rng
            .choice(&candidates)
            .ok_or_else(|| RandomiserError::Infeasible {
                item: key.to_string(),
                depth: reachable_depth,
            })?;
        debug!(item = key, region = self.registry.region(id).name(), "picked region");
        Ok(id)
    }
}
