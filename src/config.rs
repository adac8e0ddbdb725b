//! Simulation configuration
//!
//! Loaded from JSON; any field left out falls back to its default.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World size in pixels
    pub world_width: f32,
    pub world_height: f32,

    /// Simulation time per tick in milliseconds
    pub tick_ms: u64,

    /// Seed for every random choice the simulation makes
    pub seed: u64,

    // === Levels ===
    /// Number of levels, each a splitter wave followed by a spinner wave
    pub levels: usize,
    pub splitters_per_wave: usize,
    /// Spinners come in pairs
    pub spinners_per_wave: usize,
    pub bombers_per_wave: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 480.0,
            world_height: 640.0,
            tick_ms: 16,
            seed: 0x5EED_B1A5,
            levels: 2,
            splitters_per_wave: 15,
            spinners_per_wave: 10,
            bombers_per_wave: 5,
        }
    }
}

impl SimConfig {
    /// Smallest width that leaves a spawn band for splitters
    pub const MIN_WORLD_WIDTH: f32 = 320.0;
    /// Smallest height that leaves a flight band for bombers
    pub const MIN_WORLD_HEIGHT: f32 = 240.0;

    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.world_width >= Self::MIN_WORLD_WIDTH) {
            return Err(SimError::configuration(format!(
                "world_width must be at least {}, got {}",
                Self::MIN_WORLD_WIDTH,
                self.world_width
            )));
        }
        if !(self.world_height >= Self::MIN_WORLD_HEIGHT) {
            return Err(SimError::configuration(format!(
                "world_height must be at least {}, got {}",
                Self::MIN_WORLD_HEIGHT,
                self.world_height
            )));
        }
        if self.tick_ms == 0 {
            return Err(SimError::configuration("tick_ms must be positive"));
        }
        if self.levels == 0 {
            return Err(SimError::configuration("levels must be at least 1"));
        }
        Ok(())
    }
}
