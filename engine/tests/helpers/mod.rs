// Shared fixtures for the track_engine integration tests.

#![allow(dead_code)]

use bevy::math::{Vec2, Vec3};
use track_engine::{NoiseSource, Path};

/// Noise field that is +1 inside a disc of grid cells and -1 elsewhere.
/// Undoes the `40 + cell / size` mapping used for island sampling.
pub struct DiscField {
    pub center: Vec2,
    pub radius: f32,
    pub size: f32,
}

impl NoiseSource for DiscField {
    fn sample(&self, x: f32, _y: f32, z: f32) -> f32 {
        let cell = Vec2::new((x - 40.0) * self.size, (z - 40.0) * self.size);
        if cell.distance(self.center) < self.radius { 1.0 } else { -1.0 }
    }
}

pub fn xz(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, 0.0, z)
}

/// Regular polygon in the XZ plane, closed by repeating the first point.
pub fn closed_polygon(sides: usize, radius: f32) -> Path {
    let mut pts: Vec<Vec3> = (0..sides)
        .map(|i| {
            let a = i as f32 / sides as f32 * std::f32::consts::TAU;
            xz(a.cos() * radius, a.sin() * radius)
        })
        .collect();
    pts.push(pts[0]);
    Path::from_points(pts)
}

/// Distance from `p` to segment `a`-`b`, measured in the XZ plane.
pub fn point_segment_distance_xz(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let (p, a, b) = (Vec2::new(p.x, p.z), Vec2::new(a.x, a.z), Vec2::new(b.x, b.z));
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 > 0.0 { ((p - a).dot(ab) / len2).clamp(0.0, 1.0) } else { 0.0 };
    p.distance(a + ab * t)
}

pub fn assert_bounds_centered(points: &[Vec3]) {
    let lo = points.iter().fold(Vec3::splat(f32::MAX), |m, p| m.min(*p));
    let hi = points.iter().fold(Vec3::splat(f32::MIN), |m, p| m.max(*p));
    let sum = lo + hi;
    assert!(sum.abs().max_element() < 1e-3, "bounds not centered: {lo} .. {hi}");
}
