use std::collections::HashSet;

use bevy::prelude::*;

use crate::api::{NoiseSource, Result, TrackError};
use crate::config::GeneratorConfig;
use crate::geometry;
use crate::path::{Path, WaypointStore};
use crate::smoothing::smooth_uniform;

/// 4-connected neighbours: left, up, right, down.
const NEIGHBOURS_4: [IVec2; 4] = [
    IVec2::new(-1, 0),
    IVec2::new(0, -1),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
];

/// Walk priority: left, right, up, down, then the diagonals.
const WALK_DIRECTIONS: [IVec2; 8] = [
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(-1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, -1),
    IVec2::new(1, 1),
];

/// Noise-driven road layout: finds an island in a thresholded noise field
/// and turns its coastline into a closed, smoothed, centered waypoint loop.
pub struct IslandGenerator<N: NoiseSource> {
    noise: N,
    config: GeneratorConfig,
    seed_offset: f32,
}

impl IslandGenerator<Box<dyn NoiseSource>> {
    /// Builds the configured noise backend.
    pub fn from_config(config: GeneratorConfig) -> Result<Self> {
        let noise = config.noise.build(config.noise_seed);
        Self::new(noise, config)
    }
}

impl<N: NoiseSource> IslandGenerator<N> {
    pub fn new(noise: N, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let seed_offset = config.seed().sampling_offset();
        Ok(Self { noise, config, seed_offset })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn is_on_island(&self, cell: IVec2) -> bool {
        let size = self.config.size;
        let v = self.noise.sample(40.0 + cell.x as f32 / size, self.seed_offset, 40.0 + cell.y as f32 / size);
        v > self.config.threshold()
    }

    /// Terrain height at a grid position, from a second noise sample.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        let t = (1.0 - self.config.hill_size / 100.0).max(1e-3);
        self.noise.sample(x / t, z / t, 0.0) * self.config.hill_height
    }

    /// Walks the diagonal from the origin until it reaches land.
    pub fn find_seed(&self) -> Result<IVec2> {
        let mut cell = IVec2::ZERO;
        for _ in 0..self.config.max_seed_steps {
            if self.is_on_island(cell) {
                return Ok(cell);
            }
            cell += IVec2::ONE;
        }
        Err(TrackError::SeedNotFound { steps: self.config.max_seed_steps })
    }

    pub fn island(&self, start: IVec2) -> Result<HashSet<IVec2>> {
        flood_fill(start, |c| self.is_on_island(c), self.config.max_island_cells)
    }

    /// Full pipeline: seed, flood fill, expand, outline, walk, close, smooth,
    /// center.
    pub fn generate(&self) -> Result<Path> {
        let start = self.find_seed()?;
        let island = self.island(start)?;
        let expanded = expand(&island);
        let coast = outline(&expanded);
        let raw = walk_outline(&coast, |x, z| self.height(x, z))?;
        info!(
            "Island at {start}: {} cells, {} outline cells, {} waypoints walked",
            island.len(),
            coast.len(),
            raw.len()
        );

        let mut path = Path::from_points(raw);
        path.close();
        smooth_uniform(&mut path, self.config.smooth_count);
        center_on_bounds(&mut path);
        Ok(path)
    }
}

/// Collects every cell 4-connected to `start` for which `is_land` holds.
/// `start` itself is always included.
pub fn flood_fill(start: IVec2, is_land: impl Fn(IVec2) -> bool, max_cells: usize) -> Result<HashSet<IVec2>> {
    let mut island = HashSet::from([start]);
    let mut frontier = vec![start];

    while let Some(cell) = frontier.pop() {
        for dir in NEIGHBOURS_4 {
            let next = cell + dir;
            if !island.contains(&next) && is_land(next) {
                island.insert(next);
                frontier.push(next);
                if island.len() > max_cells {
                    return Err(TrackError::IslandTooLarge { cells: max_cells });
                }
            }
        }
    }
    Ok(island)
}

/// A cell missing at least one 4-connected neighbour from `set`.
pub fn is_edge(cell: IVec2, set: &HashSet<IVec2>) -> bool {
    NEIGHBOURS_4.iter().any(|d| !set.contains(&(cell + *d)))
}

/// Pads the island by the 8-neighbourhood of every edge cell.
pub fn expand(island: &HashSet<IVec2>) -> HashSet<IVec2> {
    let mut expanded = island.clone();
    for &cell in island {
        if is_edge(cell, island) {
            for d in WALK_DIRECTIONS {
                expanded.insert(cell + d);
            }
        }
    }
    expanded
}

/// Edge cells only.
pub fn outline(island: &HashSet<IVec2>) -> HashSet<IVec2> {
    island.iter().copied().filter(|c| is_edge(*c, island)).collect()
}

/// Orders an outline into a chain. Starts at the cell with the smallest
/// (y, x) and greedily steps to the first unvisited outline neighbour in
/// walk priority order; stops when none is left, so the chain is open.
pub fn walk_outline(outline: &HashSet<IVec2>, height: impl Fn(f32, f32) -> f32) -> Result<Vec<Vec3>> {
    let start = outline
        .iter()
        .copied()
        .min_by_key(|c| (c.y, c.x))
        .ok_or(TrackError::EmptyOutline)?;

    let to_point = |c: IVec2| {
        let (x, z) = (c.x as f32, c.y as f32);
        Vec3::new(x, height(x, z), z)
    };

    let mut visited = HashSet::from([start]);
    let mut chain = vec![to_point(start)];
    let mut current = start;
    while let Some(next) = WALK_DIRECTIONS
        .iter()
        .map(|d| current + *d)
        .find(|n| outline.contains(n) && !visited.contains(n))
    {
        visited.insert(next);
        chain.push(to_point(next));
        current = next;
    }
    Ok(chain)
}

/// Translates the waypoints so their bounding box is centered on the origin.
pub fn center_on_bounds<W: WaypointStore + ?Sized>(path: &mut W) {
    let points = path.snapshot();
    let Some((lo, hi)) = geometry::bounds(&points) else {
        return;
    };
    let offset = lo + (hi - lo) / 2.0;
    for (i, p) in points.into_iter().enumerate() {
        path.set(i, p - offset);
    }
}
