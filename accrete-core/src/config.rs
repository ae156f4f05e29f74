//! Simulation tunables and run configuration files
//!
//! Configuration files are JSON. Every field is optional; anything missing
//! falls back to the defaults below.

use crate::bodies::RadiusMapping;
use crate::broad_phase::BroadPhase;
use crate::error::ConfigError;
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Physics tunables consumed by every step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Gravitational constant
    pub gravity: f32,
    /// Force workers (1 = sequential)
    pub workers: usize,
    /// Tile size as a multiple of the largest radius
    pub tile_factor: f32,
    /// Half-width of the square domain on x/y
    pub edge: f32,
    pub time_step: f32,
    pub broad_phase: BroadPhase,
    pub radius: RadiusMapping,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: 1e-9,
            workers: 8,
            tile_factor: 1.5,
            edge: 10.0,
            time_step: 1.0,
            broad_phase: BroadPhase::Grid,
            radius: RadiusMapping::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gravity >= 0.0 && self.gravity.is_finite()) {
            return Err(ConfigError::invalid(
                "gravity",
                format!("must be finite and non-negative, got {}", self.gravity),
            ));
        }
        if self.workers == 0 {
            return Err(ConfigError::invalid("workers", "need at least one worker"));
        }
        // below 1.0 two overlapping bodies could miss each other's tiles
        if !(self.tile_factor >= 1.0 && self.tile_factor.is_finite()) {
            return Err(ConfigError::invalid(
                "tile_factor",
                format!("must be at least 1.0, got {}", self.tile_factor),
            ));
        }
        if !(self.edge > 0.0) {
            return Err(ConfigError::invalid(
                "edge",
                format!("must be positive, got {}", self.edge),
            ));
        }
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(ConfigError::invalid(
                "time_step",
                format!("must be finite and positive, got {}", self.time_step),
            ));
        }
        self.radius.validate()
    }
}

/// Everything needed to start a run: tunables, initial bodies, length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub sim: SimConfig,
    pub scenario: Scenario,
    pub steps: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            scenario: Scenario::default(),
            steps: 1000,
        }
    }
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.sim.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
