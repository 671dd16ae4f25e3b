use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Broad classification of a region. Accessibility depth is derived from it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Void,
    Shallows,
    Kelp,
    Plateau,
    Reef,
    Forest,
    Canyon,
    Trench,
    Caves,
    Volcanic,
}

impl Zone {
    /// Depth the player must be able to reach before this zone counts as
    /// accessible.
    pub fn accessibility_depth(self) -> u32 {
        match self {
            Zone::Void => 0,
            Zone::Shallows => 50,
            Zone::Kelp => 100,
            Zone::Plateau => 200,
            Zone::Reef => 300,
            Zone::Forest => 400,
            Zone::Canyon => 500,
            Zone::Trench => 900,
            Zone::Caves => 1200,
            Zone::Volcanic => 1400,
        }
    }
}

/// Axis-aligned horizontal box a start point may be sampled from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SpawnBox {
    pub x_min: i32,
    pub x_max: i32,
    pub z_min: i32,
    pub z_max: i32,
}

impl SpawnBox {
    pub fn contains(&self, x: i32, z: i32) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.z_min..=self.z_max).contains(&z)
    }
}

/// Static definition of a region as it appears in the world table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionDef {
    pub name: String,
    pub zone: Zone,
    #[serde(default)]
    pub creature_slots: u32,
    #[serde(default)]
    pub medium_slots: u32,
    #[serde(default)]
    pub small_slots: u32,
    /// `None` means fragments are never placed here from the available pool.
    #[serde(default)]
    pub fragment_rate: Option<f32>,
    /// Gated behind a tool; only reachable through the fallback pool.
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub spawn_boxes: Vec<SpawnBox>,
}

#[derive(Clone, Debug)]
pub struct Region {
    pub def: RegionDef,
    pub depth: u32,
    pub used: u32,
}

impl Region {
    fn new(def: RegionDef) -> Self {
        let depth = def.zone.accessibility_depth();
        Self { def, depth, used: 0 }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn fragment_rate(&self) -> f32 {
        self.def.fragment_rate.unwrap_or(0.0)
    }
}

/// Index of a region inside its registry.
pub type RegionId = usize;

/// All regions of the world plus the per-run usage counters.
///
/// `available` is kept in registry order so that uniform choices over it are
/// reproducible for a fixed seed.
#[derive(Clone, Debug)]
pub struct RegionRegistry {
    regions: Vec<Region>,
    available: Vec<RegionId>,
    cap: u32,
}

impl RegionRegistry {
    pub fn new(defs: Vec<RegionDef>, max_items_per_region: u32) -> Self {
        let mut registry = Self {
            regions: defs.into_iter().map(Region::new).collect(),
            available: Vec::new(),
            cap: max_items_per_region,
        };
        registry.reset();
        registry
    }

    /// Clear all usage and rebuild the available pool. Called once per run.
    pub fn reset(&mut self) {
        for region in &mut self.regions {
            region.used = 0;
        }
        let cap = self.cap;
        self.available = self
            .regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.def.fragment_rate.is_some() && !r.def.restricted && cap > 0)
            .map(|(id, _)| id)
            .collect();
    }

    pub fn set_cap(&mut self, max_items_per_region: u32) {
        self.cap = max_items_per_region;
        self.reset();
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id]
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn find(&self, name: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.def.name.eq_ignore_ascii_case(name))
    }

    pub fn deepest(&self) -> u32 {
        self.regions.iter().map(|r| r.depth).max().unwrap_or(0)
    }

    /// Regions still under their cap, reachable at `max_depth`, and not in
    /// `excluding`.
    pub fn available_regions(&self, max_depth: u32, excluding: &BTreeSet<RegionId>) -> Vec<RegionId> {
        self.available
            .iter()
            .copied()
            .filter(|id| self.regions[*id].depth <= max_depth && !excluding.contains(id))
            .collect()
    }

    /// Every region reachable at `max_depth`, ignoring caps, rates and tool
    /// gating.
    pub fn full_regions(&self, max_depth: u32) -> Vec<RegionId> {
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.depth <= max_depth)
            .map(|(id, _)| id)
            .collect()
    }

    /// Count one placement against `id`. The counter saturates at the cap and
    /// the region leaves the available pool once it gets there.
    pub fn mark_used(&mut self, id: RegionId) {
        let region = &mut self.regions[id];
        if region.used < self.cap {
            region.used += 1;
        }
        if region.used >= self.cap {
            self.available.retain(|a| *a != id);
        }
    }

    pub fn is_available(&self, id: RegionId) -> bool {
        self.available.contains(&id)
    }

    pub fn total_used(&self) -> u32 {
        self.regions.iter().map(|r| r.used).sum()
    }
}
