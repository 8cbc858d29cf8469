use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::path::{Path, Profile};

/// How the along-path texture coordinate is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UvMode {
    /// Travelled distance times a scale factor; tiles the texture.
    World { scale: f32 },
    /// Travelled distance over total path length, 0..1.
    PathFraction,
}

impl Default for UvMode {
    fn default() -> Self {
        UvMode::World { scale: 0.1 }
    }
}

impl UvMode {
    fn v(self, travelled: f32, total: f32) -> f32 {
        match self {
            UvMode::World { scale } => travelled * scale,
            UvMode::PathFraction if total > 0.0 => travelled / total,
            UvMode::PathFraction => 0.0,
        }
    }
}

/// Triangle mesh produced by extrusion. `uvs` and `normals` share the
/// ordering of `positions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl TrackMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn face_normal(&self, tri: [u32; 3]) -> Vec3 {
        let [a, b, c] = tri.map(|i| self.positions[i as usize]);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Per-vertex normals as the normalized sum of the adjacent face normals.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.triangles() {
            let [a, b, c] = tri.map(|i| self.positions[i as usize]);
            // area-weighted
            let n = (b - a).cross(c - a);
            for i in tri {
                normals[i as usize] += n;
            }
        }
        self.normals = normals.into_iter().map(|n| n.normalize_or_zero()).collect();
    }
}

/// Accumulates rings of vertices and stitches consecutive rings with quads.
#[derive(Default)]
pub struct RibbonMeshBuilder {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    ring_size: usize,
}

impl RibbonMeshBuilder {
    pub fn new(ring_size: usize) -> Self {
        Self { positions: Vec::new(), uvs: Vec::new(), indices: Vec::new(), ring_size }
    }

    pub fn with_capacity(ring_size: usize, rings: usize) -> Self {
        let verts = ring_size * rings;
        Self {
            positions: Vec::with_capacity(verts),
            uvs: Vec::with_capacity(verts),
            indices: Vec::with_capacity(rings.saturating_sub(1) * ring_size.saturating_sub(1) * 6),
            ring_size,
        }
    }

    pub fn ring_count(&self) -> usize {
        if self.ring_size == 0 { 0 } else { self.positions.len() / self.ring_size }
    }

    pub fn push_vertex(&mut self, position: Vec3, uv: Vec2) {
        self.positions.push(position);
        self.uvs.push(uv);
    }

    /// Connects the last two complete rings. Two triangles per adjacent
    /// profile pair, wound so the face points along the frame's up axis.
    pub fn stitch_last_rings(&mut self) {
        let m = self.ring_size;
        if self.ring_count() < 2 {
            return;
        }
        let curr = (self.positions.len() - m) as u32;
        let prev = curr - m as u32;
        for i in 0..m.saturating_sub(1) as u32 {
            let a = prev + i;
            let b = prev + i + 1;
            let c = curr + i;
            let d = curr + i + 1;
            self.indices.extend_from_slice(&[a, d, c, a, b, d]);
        }
    }

    pub fn build(self) -> TrackMesh {
        let mut mesh = TrackMesh {
            positions: self.positions,
            normals: Vec::new(),
            uvs: self.uvs,
            indices: self.indices,
        };
        mesh.recalculate_normals();
        mesh
    }
}

/// Sweeps `profile` along `path`.
///
/// One ring per path sample (the closing duplicate of a closed path is
/// skipped), each vertex at `P[k] + normal_xz * q.x + normal_xy * q.y`. A closed
/// path gets a final ring copying ring 0's positions under new indices so the
/// v coordinate keeps increasing across the seam.
pub fn extrude(path: &Path, profile: &Profile, uv_mode: UvMode) -> TrackMesh {
    let points = path.points();
    let closed = path.is_closed();
    let m = profile.len();
    let rings = points.len();

    let uv_x = profile.uv_x();
    let offsets: Vec<Vec2> = profile.points().collect();
    let total = path.length();
    let mut travelled = 0.0;
    let mut builder = RibbonMeshBuilder::with_capacity(m, rings);

    let real_rings = if closed { rings - 1 } else { rings };
    for k in 0..real_rings {
        if k > 0 {
            travelled += points[k].distance(points[k - 1]);
        }
        let (normal_xz, normal_xy) = geometry::frame(points, k, closed);
        let v = uv_mode.v(travelled, total);
        for (q, u) in offsets.iter().zip(&uv_x) {
            builder.push_vertex(points[k] + normal_xz * q.x + normal_xy * q.y, Vec2::new(*u, v));
        }
        builder.stitch_last_rings();
    }

    if closed && real_rings > 0 {
        if rings >= 2 {
            travelled += points[0].distance(points[rings - 2]);
        }
        let v = uv_mode.v(travelled, total);
        for i in 0..m {
            let p = builder.positions[i];
            builder.push_vertex(p, Vec2::new(uv_x[i], v));
        }
        builder.stitch_last_rings();
    }

    let mesh = builder.build();
    debug!(
        "extruded {} rings x {} profile points: {} vertices, {} triangles",
        mesh.vertex_count() / m.max(1),
        m,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}

/// Flat preview strip of a profile: the profile swept straight along z from
/// `-length/2` to `length/2`, v = 0 on the near edge and 1 on the far edge.
pub fn profile_preview(profile: &Profile, length: f32) -> TrackMesh {
    let uv_x = profile.uv_x();
    let mut builder = RibbonMeshBuilder::with_capacity(profile.len(), 2);
    for (side, v) in [(-1.0, 0.0), (1.0, 1.0)] {
        for (q, u) in profile.points().zip(&uv_x) {
            builder.push_vertex(Vec3::new(q.x, q.y, length / 2.0 * side), Vec2::new(*u, v));
        }
    }
    builder.stitch_last_rings();
    builder.build()
}
