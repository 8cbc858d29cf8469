use bevy::prelude::*;

/// Samples a chain of quadratic bezier pieces. Control points are taken in
/// triples `(p[j], p[j+1], p[j+2])` for `j = 0, 2, 4, ...`, so consecutive
/// pieces share an end point. Each piece is sampled with a parameter step of
/// one over its control polygon length, and always ends exactly on its last
/// control point.
pub fn sample_quadratic_chain(controls: &[Vec3]) -> Vec<Vec3> {
    let mut out = Vec::new();
    let mut j = 0;
    while j + 3 <= controls.len() {
        let (p0, p1, p2) = (controls[j], controls[j + 1], controls[j + 2]);
        let reach = p0.distance(p1) + p1.distance(p2);
        let step = if reach > 0.0 { 1.0 / reach } else { 1.0 };

        let mut v: f32 = 0.0;
        while v < 1.0 {
            let a = p0.lerp(p1, v);
            let b = p1.lerp(p2, v);
            out.push(a.lerp(b, v));
            v += step;
        }
        out.push(p2);
        j += 2;
    }
    out
}
