use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::biome::{RegionId, RegionRegistry};
use crate::random::RandomHandler;
use crate::{RandomiserError, Result};

pub const UNCHANGED_START: &str = "unchanged";
pub const RANDOM_REACHABLE_START: &str = "random-reachable";
pub const FULLY_RANDOM_START: &str = "fully-random";

/// Region that exists in the table but is never a fair start.
pub const VOID_REGION: &str = "void";

/// Deepest region a "random-reachable" start may land in, so the seafloor is
/// always within reach on spawn.
pub const SHALLOW_START_DEPTH: u32 = 100;

/// Height every start point is placed at.
pub const START_HEIGHT: i32 = 0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Pick the start region for `mode` and sample a point in it.
///
/// Returns `Ok(None)` for the unchanged start.
pub fn select_start(
    registry: &RegionRegistry,
    rng: &mut RandomHandler,
    mode: &str,
) -> Result<Option<Coordinate>> {
    let mode = mode.trim();
    if mode.eq_ignore_ascii_case(UNCHANGED_START) {
        return Ok(None);
    }

    let candidates: Vec<RegionId> = if mode.eq_ignore_ascii_case(RANDOM_REACHABLE_START) {
        registry
            .regions()
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.depth <= SHALLOW_START_DEPTH
                    && !r.name().eq_ignore_ascii_case(VOID_REGION)
                    && !r.def.spawn_boxes.is_empty()
            })
            .map(|(id, _)| id)
            .collect()
    } else if mode.eq_ignore_ascii_case(FULLY_RANDOM_START) {
        registry
            .regions()
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.def.spawn_boxes.is_empty())
            .map(|(id, _)| id)
            .collect()
    } else {
        let id = registry
            .find(mode)
            .ok_or_else(|| RandomiserError::UnknownStartMode(mode.to_string()))?;
        if registry.region(id).def.spawn_boxes.is_empty() {
            return Err(RandomiserError::Config(format!(
                "start region {} has no spawn boxes",
                registry.region(id).name()
            )));
        }
        vec![id]
    };

    let &region_id = rng.choice(&candidates).ok_or_else(|| RandomiserError::Infeasible {
        item: format!("start:{mode}"),
        depth: SHALLOW_START_DEPTH,
    })?;
    let region = registry.region(region_id);
    let Some(spawn_box) = rng.choice(&region.def.spawn_boxes) else {
        return Err(RandomiserError::Config(format!(
            "start region {} has no spawn boxes",
            region.name()
        )));
    };

    let x = rng.range_inclusive(spawn_box.x_min, spawn_box.x_max);
    let z = rng.range_inclusive(spawn_box.z_min, spawn_box.z_max);
    debug!(region = region.name(), x, z, "selected start point");
    Ok(Some(Coordinate {
        x,
        y: START_HEIGHT,
        z,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{RegionDef, SpawnBox, Zone};

    fn def(name: &str, zone: Zone, boxes: Vec<SpawnBox>) -> RegionDef {
        RegionDef {
            name: name.to_string(),
            zone,
            creature_slots: 0,
            medium_slots: 0,
            small_slots: 0,
            fragment_rate: Some(1.0),
            restricted: false,
            spawn_boxes: boxes,
        }
    }

    fn bx(x_min: i32, x_max: i32, z_min: i32, z_max: i32) -> SpawnBox {
        SpawnBox {
            x_min,
            x_max,
            z_min,
            z_max,
        }
    }

    fn registry() -> RegionRegistry {
        RegionRegistry::new(
            vec![
                def("safe_shallows", Zone::Shallows, vec![bx(-50, 50, -40, 40)]),
                def("void", Zone::Void, vec![bx(-2000, -1900, 0, 10)]),
                def("grassy_plateau", Zone::Plateau, vec![bx(300, 400, 300, 400)]),
                def("mushroom_forest", Zone::Forest, vec![bx(-700, -600, 500, 600), bx(-500, -450, 100, 150)]),
                def("lost_river", Zone::Caves, Vec::new()),
            ],
            5,
        )
    }

    #[test]
    fn unchanged_gives_no_override() {
        let mut rng = RandomHandler::new(1);
        assert_eq!(select_start(&registry(), &mut rng, "Unchanged").unwrap(), None);
    }

    #[test]
    fn random_reachable_only_lands_in_shallow_region() {
        let reg = registry();
        let shallow = reg.find("safe_shallows").unwrap();
        for seed in 0..200 {
            let mut rng = RandomHandler::new(seed);
            let c = select_start(&reg, &mut rng, RANDOM_REACHABLE_START)
                .unwrap()
                .unwrap();
            assert_eq!(c.y, START_HEIGHT);
            assert!(reg.region(shallow).def.spawn_boxes[0].contains(c.x, c.z));
        }
    }

    #[test]
    fn fully_random_can_use_void() {
        let reg = registry();
        let void_box = reg.region(reg.find("void").unwrap()).def.spawn_boxes[0];
        let hit = (0..500).any(|seed| {
            let mut rng = RandomHandler::new(seed);
            let c = select_start(&reg, &mut rng, FULLY_RANDOM_START).unwrap().unwrap();
            void_box.contains(c.x, c.z)
        });
        assert!(hit);
    }

    #[test]
    fn named_region_samples_one_of_its_boxes() {
        let reg = registry();
        let forest = reg.region(reg.find("mushroom_forest").unwrap());
        for seed in 0..100 {
            let mut rng = RandomHandler::new(seed);
            let c = select_start(&reg, &mut rng, "Mushroom_Forest").unwrap().unwrap();
            assert!(forest.def.spawn_boxes.iter().any(|b| b.contains(c.x, c.z)));
        }
    }

    #[test]
    fn unknown_mode_is_a_config_error() {
        let mut rng = RandomHandler::new(1);
        assert!(matches!(
            select_start(&registry(), &mut rng, "atlantis"),
            Err(RandomiserError::UnknownStartMode(_))
        ));
    }

    #[test]
    fn region_without_boxes_is_rejected() {
        let mut rng = RandomHandler::new(1);
        assert!(matches!(
            select_start(&registry(), &mut rng, "lost_river"),
            Err(RandomiserError::Config(_))
        ));
    }

    #[test]
    fn empty_candidate_set_is_infeasible() {
        let reg = RegionRegistry::new(
            vec![def("deep", Zone::Trench, vec![bx(0, 1, 0, 1)])],
            5,
        );
        let mut rng = RandomHandler::new(3);
        assert!(matches!(
            select_start(&reg, &mut rng, RANDOM_REACHABLE_START),
            Err(RandomiserError::Infeasible { .. })
        ));
    }
}
