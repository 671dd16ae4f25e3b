use serde::{Deserialize, Serialize};

use crate::start::UNCHANGED_START;
use crate::{RandomiserError, Result};

/// Every item is spread over at least this many regions.
pub const MIN_BIOMES_PER_ITEM: u32 = 3;

/// How a run obtains its seed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    Fixed(u64),
    /// Draw a new seed from the thread RNG.
    Fresh,
}

impl SeedPolicy {
    pub fn resolve(self) -> u64 {
        match self {
            SeedPolicy::Fixed(seed) => seed,
            SeedPolicy::Fresh => rand::random::<u64>(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomiserSettings {
    pub max_biomes_per_item: u32,
    pub spawn_chance_min: f32,
    pub spawn_chance_max: f32,
    pub min_discoveries_to_unlock: u32,
    pub max_discoveries_to_unlock: u32,
    pub max_items_per_region: u32,
    pub randomize_discovery_count: bool,
    pub recipes_randomized: bool,
    pub start_mode: String,
}

impl Default for RandomiserSettings {
    fn default() -> Self {
        let mut settings = Self {
            max_biomes_per_item: 0,
            spawn_chance_min: 0.0,
            spawn_chance_max: 0.0,
            min_discoveries_to_unlock: 0,
            max_discoveries_to_unlock: 0,
            max_items_per_region: 0,
            randomize_discovery_count: false,
            recipes_randomized: false,
            start_mode: UNCHANGED_START.to_string(),
        };
        for bound in SETTING_BOUNDS {
            settings.set(bound.key, bound.default);
        }
        settings
    }
}

/// Range and default of one numeric setting.
#[derive(Copy, Clone, Debug)]
pub struct SettingBound {
    pub key: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

pub const SETTING_BOUNDS: &[SettingBound] = &[
    SettingBound {
        key: "max_biomes_per_item",
        min: MIN_BIOMES_PER_ITEM as f64,
        max: 20.0,
        default: 5.0,
    },
    SettingBound {
        key: "spawn_chance_min",
        min: 0.01,
        max: 1.0,
        default: 0.1,
    },
    SettingBound {
        key: "spawn_chance_max",
        min: 0.01,
        max: 1.0,
        default: 0.3,
    },
    SettingBound {
        key: "min_discoveries_to_unlock",
        min: 1.0,
        max: 20.0,
        default: 2.0,
    },
    SettingBound {
        key: "max_discoveries_to_unlock",
        min: 1.0,
        max: 20.0,
        default: 6.0,
    },
    SettingBound {
        key: "max_items_per_region",
        min: 1.0,
        max: 50.0,
        default: 7.0,
    },
];

impl RandomiserSettings {
    pub fn get(&self, key: &str) -> Option<f64> {
        let v = match key {
            "max_biomes_per_item" => self.max_biomes_per_item as f64,
            "spawn_chance_min" => self.spawn_chance_min as f64,
            "spawn_chance_max" => self.spawn_chance_max as f64,
            "min_discoveries_to_unlock" => self.min_discoveries_to_unlock as f64,
            "max_discoveries_to_unlock" => self.max_discoveries_to_unlock as f64,
            "max_items_per_region" => self.max_items_per_region as f64,
            _ => return None,
        };
        Some(v)
    }

    fn set(&mut self, key: &str, value: f64) {
        match key {
            "max_biomes_per_item" => self.max_biomes_per_item = value as u32,
            "spawn_chance_min" => self.spawn_chance_min = value as f32,
            "spawn_chance_max" => self.spawn_chance_max = value as f32,
            "min_discoveries_to_unlock" => self.min_discoveries_to_unlock = value as u32,
            "max_discoveries_to_unlock" => self.max_discoveries_to_unlock = value as u32,
            "max_items_per_region" => self.max_items_per_region = value as u32,
            _ => {}
        }
    }

    /// Check every known field against its bounds, then the min/max pairs.
    pub fn validate(&self) -> Result<()> {
        for bound in SETTING_BOUNDS {
            let value = self.get(bound.key).ok_or_else(|| {
                RandomiserError::Config(format!("unknown setting {}", bound.key))
            })?;
            if !value.is_finite() || value < bound.min || value > bound.max {
                return Err(RandomiserError::Config(format!(
                    "{} = {} is outside [{}, {}]",
                    bound.key, value, bound.min, bound.max
                )));
            }
        }
        if self.spawn_chance_min > self.spawn_chance_max {
            return Err(RandomiserError::Config(
                "spawn_chance_min is greater than spawn_chance_max".to_string(),
            ));
        }
        if self.min_discoveries_to_unlock > self.max_discoveries_to_unlock {
            return Err(RandomiserError::Config(
                "min_discoveries_to_unlock is greater than max_discoveries_to_unlock".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
