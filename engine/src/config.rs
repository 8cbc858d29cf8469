use std::fs;
use std::path::Path as FsPath;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api::{Result, Seed, TrackError};
use crate::bezier::sample_quadratic_chain;
use crate::extrude::UvMode;
use crate::path::{Path, Profile};
use crate::sampling::NoiseKind;

/// Island synthesizer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// 0..=0.35, lower gives smaller and rarer islands.
    pub complexity: f32,
    /// 30..=250, noise sampling scale in grid cells.
    pub size: f32,
    /// 1..=1000 uniform smoothing passes over the raw outline.
    pub smooth_count: usize,
    pub hill_height: f32,
    pub hill_size: f32,
    pub seed: String,
    pub noise: NoiseKind,
    pub noise_seed: u32,
    /// Budget for the diagonal search of the first land cell.
    pub max_seed_steps: u32,
    /// Budget for the flood fill.
    pub max_island_cells: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            complexity: 0.1,
            size: 30.0,
            smooth_count: 4,
            hill_height: 4.0,
            hill_size: 50.0,
            seed: "Empty".to_string(),
            noise: NoiseKind::default(),
            noise_seed: 0,
            max_seed_steps: 100_000,
            max_island_cells: 1_000_000,
        }
    }
}

fn check_range(name: &str, value: f32, lo: f32, hi: f32) -> Result<()> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(TrackError::InvalidConfig(format!("{name} = {value} outside [{lo}, {hi}]")))
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("complexity", self.complexity, 0.0, 0.35)?;
        check_range("size", self.size, 30.0, 250.0)?;
        check_range("smooth_count", self.smooth_count as f32, 1.0, 1000.0)?;
        check_range("hill_height", self.hill_height, 0.0, 100.0)?;
        check_range("hill_size", self.hill_size, 0.0, 100.0)?;
        Ok(())
    }

    pub fn seed(&self) -> Seed {
        Seed(self.seed.clone())
    }

    /// Noise value a cell has to exceed to count as land.
    pub fn threshold(&self) -> f32 {
        0.35 - self.complexity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrudeConfig {
    pub world_uv_cords: bool,
    pub world_uv_scale: f32,
}

impl Default for ExtrudeConfig {
    fn default() -> Self {
        Self { world_uv_cords: true, world_uv_scale: 0.1 }
    }
}

impl ExtrudeConfig {
    pub fn uv_mode(&self) -> UvMode {
        if self.world_uv_cords {
            UvMode::World { scale: self.world_uv_scale }
        } else {
            UvMode::PathFraction
        }
    }
}

/// Which crossing test drives intersection smoothing in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossingCheck {
    /// Centerline segments against non-adjacent segments.
    #[default]
    Centerline,
    /// The road's cross-section span at each sample against every other span.
    Span,
}

/// Everything the track pipeline needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub generator: GeneratorConfig,
    pub extrude: ExtrudeConfig,
    /// Cross-section as (lateral, vertical) offsets.
    pub profile: Vec<[f32; 2]>,
    /// Fixed waypoints. When absent the island synthesizer supplies them.
    pub waypoints: Option<Vec<[f32; 3]>>,
    /// Treat fixed waypoints as quadratic bezier control points.
    pub bezier: bool,
    pub divide: bool,
    pub smooth_intersections: bool,
    pub crossing_check: CrossingCheck,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            extrude: ExtrudeConfig::default(),
            profile: vec![[-1.0, 0.0], [1.0, 0.0]],
            waypoints: None,
            bezier: false,
            divide: false,
            smooth_intersections: true,
            crossing_check: CrossingCheck::default(),
        }
    }
}

impl TrackConfig {
    /// Reads a `.ron` or `.json` file.
    pub fn load<P: AsRef<FsPath>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            other => {
                return Err(TrackError::InvalidConfig(format!(
                    "unsupported config extension {other:?} for {}",
                    path.display()
                )))
            }
        };
        info!("Loaded track config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.generator.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.generator.validate()?;
        Ok(config)
    }

    pub fn profile(&self) -> Profile {
        let points: Vec<Vec2> = self.profile.iter().map(|p| Vec2::from_array(*p)).collect();
        Profile::new(&points)
    }

    pub fn waypoint_path(&self) -> Option<Path> {
        let controls: Vec<Vec3> = self.waypoints.as_ref()?.iter().map(|p| Vec3::from_array(*p)).collect();
        if !self.bezier {
            return Some(Path::from_points(controls));
        }
        // neighbouring pieces repeat their shared control point
        let sampled = Path::from_points(sample_quadratic_chain(&controls));
        Some(Path::from_points(sampled.distinct_points()))
    }
}
