use thiserror::Error;
use tracing::{debug, info};

pub mod biome;
pub mod config;
pub mod data;
pub mod fragments;
pub mod items;
pub mod persist;
pub mod progression;
pub mod random;
pub mod spawn;
pub mod start;

pub use biome::{Region, RegionDef, RegionRegistry, SpawnBox, Zone};
pub use config::{RandomiserSettings, SeedPolicy, MIN_BIOMES_PER_ITEM};
pub use data::StaticData;
pub use fragments::{FragmentLogic, Placement};
pub use items::{ItemTable, PlaceableItem};
pub use persist::{GzJsonFile, MemoryStore, Persistence};
pub use progression::{ProgressionGraph, ProgressionRule, ProgressionState};
pub use random::RandomHandler;
pub use spawn::{BiomeSpawn, Distribution, PlacementRecord, VariantSpawn};
pub use start::{select_start, Coordinate};

/// Reachable depth at the start of the progression loop.
pub const BASE_REACHABLE_DEPTH: u32 = 100;

/// How far the simulated player pushes deeper when a pass places nothing.
pub const DEPTH_STEP: u32 = 100;

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("unknown start mode: {0}")]
    UnknownStartMode(String),
    #[error("no region can hold {item} at depth {depth}")]
    Infeasible { item: String, depth: u32 },
}

pub type Result<T> = std::result::Result<T, RandomiserError>;

/// Owns everything one run needs. Holding the loaded [`StaticData`] is the
/// precondition for placing anything.
pub struct Randomiser {
    settings: RandomiserSettings,
    items: ItemTable,
    graph: ProgressionGraph,
    registry: RegionRegistry,
    rng: RandomHandler,
}

impl Randomiser {
    pub fn new(data: StaticData, settings: RandomiserSettings) -> Result<Self> {
        settings.validate()?;
        let items = ItemTable::new(data.items)?;
        let graph = ProgressionGraph::new(data.progression)?;
        let registry = RegionRegistry::new(data.regions, settings.max_items_per_region);
        Ok(Self {
            settings,
            items,
            graph,
            registry,
            rng: RandomHandler::new(0),
        })
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// Run the whole randomisation in memory. Nothing is persisted here.
    pub fn request_run(&mut self, policy: SeedPolicy) -> Result<Distribution> {
        let seed = policy.resolve();
        self.rng.reseed(seed);
        self.registry.reset();
        info!(seed, items = self.items.len(), "starting fragment randomisation");

        let mut progression = ProgressionState::new();
        let deepest = self.registry.deepest();
        let mut logic = FragmentLogic::new(
            &self.items,
            &self.graph,
            &self.settings,
            &mut self.registry,
            &mut self.rng,
        );
        let discovery_overrides = logic.decide_discovery_counts();

        let mut pending: Vec<&str> = self.items.keys().collect();
        let mut reachable = BASE_REACHABLE_DEPTH;

        loop {
            let mut still_pending = Vec::with_capacity(pending.len());
            for key in pending {
                if logic.place_item(key, &mut progression, reachable)? == Placement::Skipped {
                    still_pending.push(key);
                }
            }
            pending = still_pending;
            if pending.is_empty() {
                break;
            }

            let granted = self.graph.reachable_depth(&progression, reachable);
            if granted > reachable {
                debug!(from = reachable, to = granted, "progression raised reachable depth");
                reachable = granted;
                continue;
            }
            if reachable > deepest + DEPTH_STEP {
                return Err(RandomiserError::Config(format!(
                    "{} needs a depth no region provides",
                    pending[0]
                )));
            }
            reachable += DEPTH_STEP;
        }

        let spawns = logic.into_spawns();
        let start = select_start(&self.registry, &mut self.rng, &self.settings.start_mode)?;

        info!(
            seed,
            placed = spawns.len(),
            region_uses = self.registry.total_used(),
            "fragment randomisation finished"
        );

        Ok(Distribution {
            seed,
            placements: spawns.into_records(),
            discovery_overrides,
            start,
        })
    }
}

/// Run once and hand the result to `store`, only if the whole run succeeded.
pub fn run(
    data: StaticData,
    settings: RandomiserSettings,
    policy: SeedPolicy,
    store: &mut dyn Persistence,
) -> Result<Distribution> {
    let mut randomiser = Randomiser::new(data, settings)?;
    let distribution = randomiser.request_run(policy)?;
    store.save(&distribution)?;
    Ok(distribution)
}
