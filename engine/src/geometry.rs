use bevy::prelude::*;

/// Segment test in the XZ plane, parametric form. Both parameters must land in
/// [0, 1], so touching endpoints count. Parallel segments divide by zero and
/// the NaN/infinite parameters fail the range check, including collinear overlap.
pub fn segments_intersect(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> bool {
    let ab_x = b.x - a.x;
    let ab_z = b.z - a.z;
    let dc_x = d.x - c.x;
    let dc_z = d.z - c.z;

    let denom = -dc_x * ab_z + ab_x * dc_z;
    let s = (-ab_z * (a.x - c.x) + ab_x * (a.z - c.z)) / denom;
    let t = (dc_x * (a.z - c.z) - dc_z * (a.x - c.x)) / denom;

    (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t)
}

/// Lateral direction of the segment `a -> b`, rotated 90° in the XZ plane.
#[inline]
pub fn lateral(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(-(b.z - a.z), 0.0, b.x - a.x).normalize_or_zero()
}

/// Exact comparison of the end points.
#[inline]
pub fn is_closed(points: &[Vec3]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => first == last,
        _ => false,
    }
}

/// Lateral frame axis at sample `i`.
///
/// Interior samples average the incoming and outgoing laterals (unnormalized,
/// so sharp corners pinch the road). Open paths use the single adjacent
/// segment at their ends; closed paths wrap past the duplicated closing point.
pub fn normal_xz(points: &[Vec3], i: usize) -> Vec3 {
    let n = points.len();
    if n <= 2 {
        return Vec3::ZERO;
    }
    let closed = is_closed(points);

    if !closed && i == 0 {
        lateral(points[0], points[1])
    } else if !closed && i == n - 1 {
        lateral(points[i - 1], points[i])
    } else {
        let a = points[if i == 0 { n - 2 } else { i - 1 }];
        let b = points[i];
        let c = points[if i == n - 1 { 1 } else { i + 1 }];
        (lateral(a, b) + lateral(b, c)) * 0.5
    }
}

/// Vertical frame axis at sample `i`: `(previous - current) x normal_xz`.
/// Open paths borrow the first segment at index 0.
pub fn normal_xy(points: &[Vec3], i: usize, normal_xz: Vec3, closed: bool) -> Vec3 {
    let n = points.len();
    if n <= 1 {
        return Vec3::ZERO;
    }
    let (a, b) = if closed {
        // index n - 1 duplicates index 0
        let prev = if i == 0 { n.saturating_sub(2) } else { i - 1 };
        (points[i], points[prev])
    } else if i == 0 {
        (points[1], points[0])
    } else {
        (points[i], points[i - 1])
    };
    (b - a).cross(normal_xz).normalize_or_zero()
}

/// Both frame axes at `i`.
pub fn frame(points: &[Vec3], i: usize, closed: bool) -> (Vec3, Vec3) {
    let xz = normal_xz(points, i);
    (xz, normal_xy(points, i, xz, closed))
}

/// Sum of the 3D segment lengths.
pub fn polyline_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Axis-aligned bounds, `None` for an empty slice.
pub fn bounds(points: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, z: f32) -> Vec3 { Vec3::new(x, 0.0, z) }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(0.5, -1.0), v(0.5, 1.0)));
    }

    #[test]
    fn touching_endpoints_intersect() {
        assert!(segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(1.0, 0.0), v(1.0, 1.0)));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(2.0, -1.0), v(2.0, 1.0)));
    }

    #[test]
    fn parallel_and_collinear_report_no_intersection() {
        assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0), v(1.0, 1.0)));
        // collinear, disjoint
        assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0), v(3.0, 0.0)));
        // collinear, overlapping: not detected
        assert!(!segments_intersect(v(0.0, 0.0), v(2.0, 0.0), v(1.0, 0.0), v(3.0, 0.0)));
    }

    #[test]
    fn height_is_ignored() {
        let a = Vec3::new(0.0, 5.0, 0.0);
        let b = Vec3::new(1.0, -3.0, 0.0);
        assert!(segments_intersect(a, b, Vec3::new(0.5, 100.0, -1.0), v(0.5, 1.0)));
    }

    #[test]
    fn normal_xz_collapses_for_short_paths() {
        assert_eq!(normal_xz(&[], 0), Vec3::ZERO);
        assert_eq!(normal_xz(&[v(0.0, 0.0), v(10.0, 0.0)], 1), Vec3::ZERO);
    }

    #[test]
    fn normal_xz_open_straight_path() {
        let pts = [v(0.0, 0.0), v(5.0, 0.0), v(10.0, 0.0)];
        for i in 0..3 {
            assert!((normal_xz(&pts, i) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn normal_xz_averages_at_corner() {
        let pts = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0)];
        let n = normal_xz(&pts, 1);
        // (0,0,1) and (-1,0,0) averaged, unnormalized
        assert!((n - Vec3::new(-0.5, 0.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn normal_xz_wraps_on_closed_path() {
        let pts = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0), v(0.0, 0.0)];
        let first = normal_xz(&pts, 0);
        let last = normal_xz(&pts, 4);
        assert!((first - last).length() < 1e-6);
        assert!((first - Vec3::new(0.5, 0.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn normal_xy_points_up_for_flat_paths() {
        let pts = [v(0.0, 0.0), v(5.0, 0.0), v(10.0, 0.0)];
        for i in 0..3 {
            let (_, up) = frame(&pts, i, false);
            assert!((up - Vec3::Y).length() < 1e-6, "{i}: {up}");
        }
        let ring = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0), v(0.0, 0.0)];
        for i in 0..5 {
            let (_, up) = frame(&ring, i, true);
            assert!((up - Vec3::Y).length() < 1e-5, "{i}: {up}");
        }
    }

    #[test]
    fn normal_xy_zero_for_single_point() {
        assert_eq!(normal_xy(&[Vec3::ONE], 0, Vec3::Z, false), Vec3::ZERO);
    }

    #[test]
    fn bounds_and_length() {
        assert!(bounds(&[]).is_none());
        let pts = [Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 5.0, 0.0)];
        assert_eq!(bounds(&pts), Some((Vec3::new(-1.0, 2.0, 0.0), Vec3::new(1.0, 5.0, 3.0))));
        assert_eq!(polyline_length(&[v(0.0, 0.0), v(3.0, 4.0), v(3.0, 0.0)]), 9.0);
    }
}
