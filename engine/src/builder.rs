use bevy::prelude::*;

use crate::api::Result;
use crate::config::{CrossingCheck, TrackConfig};
use crate::extrude::{extrude, TrackMesh};
use crate::island::IslandGenerator;
use crate::path::{Path, Profile};
use crate::smoothing::{divide, smooth_intersections, smooth_intersections_with_profile, SmoothReport};

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct BuiltTrack {
    pub path: Path,
    pub profile: Profile,
    pub mesh: TrackMesh,
    pub smoothing: Option<SmoothReport>,
}

/// Waypoints -> divide -> intersection smoothing -> extrusion.
pub struct TrackBuilder {
    config: TrackConfig,
}

impl TrackBuilder {
    pub fn new(config: TrackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// Configured waypoints, or a freshly synthesized island loop.
    pub fn waypoints(&self) -> Result<Path> {
        match self.config.waypoint_path() {
            Some(path) => Ok(path),
            None => IslandGenerator::from_config(self.config.generator.clone())?.generate(),
        }
    }

    pub fn build(&self) -> Result<BuiltTrack> {
        let path = self.waypoints()?;
        Ok(self.build_from(path))
    }

    pub fn build_from(&self, path: Path) -> BuiltTrack {
        let (path, profile, smoothing) = self.prepare(path);
        let mesh = extrude(&path, &profile, self.config.extrude.uv_mode());
        info!(
            "Built track: {} waypoints ({}), {} vertices, {} triangles",
            path.len(),
            if path.is_closed() { "closed" } else { "open" },
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        BuiltTrack { path, profile, mesh, smoothing }
    }

    /// Divide and intersection smoothing, without extrusion.
    pub fn prepare(&self, mut path: Path) -> (Path, Profile, Option<SmoothReport>) {
        let profile = self.config.profile();
        if self.config.divide {
            divide(&mut path);
        }
        let smoothing = self.config.smooth_intersections.then(|| match self.config.crossing_check {
            CrossingCheck::Centerline => smooth_intersections(&mut path),
            CrossingCheck::Span => smooth_intersections_with_profile(&mut path, &profile),
        });
        (path, profile, smoothing)
    }
}
