use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry;

/// Resizable ordered waypoint storage. The smoothing operations only need
/// indexed access and append, so any backing store can implement this.
pub trait WaypointStore {
    fn count(&self) -> usize;
    fn get(&self, i: usize) -> Vec3;
    fn set(&mut self, i: usize, p: Vec3);
    fn append(&mut self, p: Vec3);
    fn remove_all(&mut self);

    fn snapshot(&self) -> Vec<Vec3> {
        (0..self.count()).map(|i| self.get(i)).collect()
    }

    fn is_closed(&self) -> bool {
        let n = self.count();
        n > 0 && self.get(0) == self.get(n - 1)
    }

    fn replace_all(&mut self, points: &[Vec3]) {
        self.remove_all();
        for p in points {
            self.append(*p);
        }
    }
}

/// Ordered waypoints. Closed iff the first and last positions compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<Vec3>,
}

impl Path {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Vec3] {
        &mut self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        geometry::is_closed(&self.points)
    }

    /// Appends an exact copy of the first point unless already closed.
    pub fn close(&mut self) {
        if let Some(first) = self.points.first().copied() {
            if !self.is_closed() {
                self.points.push(first);
            }
        }
    }

    pub fn length(&self) -> f32 {
        geometry::polyline_length(&self.points)
    }

    /// Points with consecutive exact duplicates collapsed.
    pub fn distinct_points(&self) -> Vec<Vec3> {
        let mut out: Vec<Vec3> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if out.last() != Some(p) {
                out.push(*p);
            }
        }
        out
    }

    pub fn into_points(self) -> Vec<Vec3> {
        self.points
    }
}

impl From<Vec<Vec3>> for Path {
    fn from(points: Vec<Vec3>) -> Self {
        Self::from_points(points)
    }
}

impl WaypointStore for Path {
    fn count(&self) -> usize { self.points.len() }
    fn get(&self, i: usize) -> Vec3 { self.points[i] }
    fn set(&mut self, i: usize, p: Vec3) { self.points[i] = p; }
    fn append(&mut self, p: Vec3) { self.points.push(p); }
    fn remove_all(&mut self) { self.points.clear(); }
    fn snapshot(&self) -> Vec<Vec3> { self.points.clone() }
}

/// Lateral extent of a profile: the points with the smallest and largest x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Span {
    fn default() -> Self {
        Self { min: Vec2::new(-1.0, 0.0), max: Vec2::new(1.0, 0.0) }
    }
}

/// Cross-section drawn in the extrusion frame: x is lateral, y is vertical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    path: Path,
}

impl Profile {
    pub fn new(points: &[Vec2]) -> Self {
        let points = points.iter().map(|p| Vec3::new(p.x, p.y, 0.0)).collect();
        Self { path: Path::from_points(points) }
    }

    /// Takes a 3D point list and flattens it onto the profile plane.
    pub fn from_path(path: &Path) -> Self {
        let flat: Vec<Vec2> = path.points().iter().map(|p| p.truncate()).collect();
        Self::new(&flat)
    }

    pub fn flat_road(half_width: f32) -> Self {
        Self::new(&[Vec2::new(-half_width, 0.0), Vec2::new(half_width, 0.0)])
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn point(&self, i: usize) -> Vec2 {
        self.path.points()[i].truncate()
    }

    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.path.points().iter().map(|p| p.truncate())
    }

    pub fn length(&self) -> f32 {
        self.path.length()
    }

    /// Cumulative arc length over total length per point. All zero when the
    /// profile has no length.
    pub fn uv_x(&self) -> Vec<f32> {
        let total = self.length();
        let mut acc = 0.0;
        let mut prev: Option<Vec2> = None;
        self.points()
            .map(|p| {
                if let Some(q) = prev {
                    acc += q.distance(p);
                }
                prev = Some(p);
                if total > 0.0 { acc / total } else { 0.0 }
            })
            .collect()
    }

    pub fn span(&self) -> Span {
        let mut it = self.points();
        let Some(first) = it.next() else {
            return Span::default();
        };
        it.fold(Span { min: first, max: first }, |mut s, p| {
            if p.x < s.min.x {
                s.min = p;
            }
            if p.x > s.max.x {
                s.max = p;
            }
            s
        })
    }

    /// Index of the profile segment under `fraction` (0..1) of the profile
    /// length, ignoring repeated points. Used for stripe texturing.
    pub fn segment_index_at(&self, fraction: f32) -> usize {
        let distinct = self.path.distinct_points();
        if distinct.len() < 2 {
            return 0;
        }
        let total = geometry::polyline_length(&distinct);
        let mut acc = 0.0;
        for i in 1..distinct.len() {
            acc += distinct[i - 1].distance(distinct[i]);
            if acc / total > fraction {
                return i - 1;
            }
        }
        distinct.len() - 1
    }
}
