use bevy::prelude::*;

use crate::geometry::{self, segments_intersect};
use crate::path::{Profile, Span, WaypointStore};

/// Pass cap for intersection-driven smoothing.
pub const MAX_SMOOTH_PASSES: usize = 1000;

/// A flagged waypoint closer than this to its new position did not move.
const SETTLE_DISTANCE: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothReport {
    /// Passes that moved at least one waypoint.
    pub passes: usize,
    /// False when the pass cap was hit while points were still moving.
    pub converged: bool,
}

/// Relaxes only the waypoints whose adjacent centerline segments cross a
/// non-adjacent segment, until a pass moves nothing or the cap is reached.
///
/// A figure eight never untangles: every point stays flagged and the loop
/// shrinks onto its centroid.
pub fn smooth_intersections<W: WaypointStore + ?Sized>(path: &mut W) -> SmoothReport {
    let report = relax(path, MAX_SMOOTH_PASSES, true, centerline_flags);
    log_report("centerline", report);
    report
}

/// Same as [`smooth_intersections`], but a waypoint is flagged when the road's
/// cross-section span at that sample crosses the span at any other sample.
///
/// Corners tighter than the road's half width always fold the inner edge, so
/// the spans next to them stay flagged. Flagged points on straight runs are
/// already at their neighbour average and the run settles without change.
pub fn smooth_intersections_with_profile<W: WaypointStore + ?Sized>(
    path: &mut W,
    profile: &Profile,
) -> SmoothReport {
    let span = profile.span();
    let report = relax(path, MAX_SMOOTH_PASSES, true, |pts: &[Vec3], closed| {
        span_flags(pts, closed, &span)
    });
    log_report("span", report);
    report
}

/// Relaxes every waypoint a fixed number of times.
pub fn smooth_uniform<W: WaypointStore + ?Sized>(path: &mut W, iterations: usize) {
    relax(path, iterations, false, |pts: &[Vec3], _| vec![true; pts.len()]);
}

/// Resamples every segment at unit spacing. A segment whose floored length
/// `L` exceeds 1 contributes the points `a, a + 1, .., a + (L - 1)` along it,
/// so the step into the next segment absorbs the fractional rest. Shorter
/// segments contribute their first end only. The last waypoint is appended
/// once.
pub fn divide<W: WaypointStore + ?Sized>(path: &mut W) {
    let points = path.snapshot();
    let Some(&last) = points.last() else {
        return;
    };

    let mut out = Vec::with_capacity(points.len());
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let distance = a.distance(b);
        let steps = distance.floor();
        if steps > 1.0 {
            let dir = (b - a).normalize_or_zero();
            for j in 0..steps as usize {
                out.push(a + dir * j as f32);
            }
        } else {
            out.push(a);
        }
    }
    out.push(last);

    debug!("divide: {} -> {} waypoints", points.len(), out.len());
    path.replace_all(&out);
}

fn log_report(kind: &str, report: SmoothReport) {
    if report.converged {
        debug!("{kind} intersection smoothing finished after {} passes", report.passes);
    } else {
        warn!("{kind} intersection smoothing hit the {MAX_SMOOTH_PASSES} pass cap");
    }
}

/// Shared relaxation loop. Closed paths drop their closing duplicate, wrap
/// neighbours, and get an exact copy of the first point re-appended. Each
/// pass reads a snapshot of the positions taken at its start.
fn relax<W, F>(path: &mut W, max_passes: usize, stop_when_clean: bool, mut flags: F) -> SmoothReport
where
    W: WaypointStore + ?Sized,
    F: FnMut(&[Vec3], bool) -> Vec<bool>,
{
    let closed = path.is_closed();
    let mut points = path.snapshot();
    if closed {
        points.pop();
    }
    if points.is_empty() {
        return SmoothReport { passes: 0, converged: true };
    }

    let mut passes = 0;
    let mut converged = !stop_when_clean;
    for _ in 0..max_passes {
        let snapshot = points.clone();
        let selected = flags(&snapshot, closed);
        let mut moved = false;
        for (i, flagged) in selected.into_iter().enumerate() {
            if flagged {
                let next = neighbour_average(&snapshot, closed, i);
                moved |= next.distance(snapshot[i]) > SETTLE_DISTANCE;
                points[i] = next;
            }
        }
        if !moved {
            points = snapshot;
            converged = true;
            break;
        }
        passes += 1;
    }

    if closed {
        points.push(points[0]);
    }
    path.replace_all(&points);
    SmoothReport { passes, converged }
}

fn neighbour_average(pts: &[Vec3], closed: bool, i: usize) -> Vec3 {
    let n = pts.len();
    if n < 2 {
        return pts[i];
    }
    if !closed && (i == 0 || i == n - 1) {
        let other = if i == 0 { 1 } else { n - 2 };
        return (pts[i] + pts[other]) / 2.0;
    }
    let prev = if i == 0 { n - 1 } else { i - 1 };
    let next = if i + 1 == n { 0 } else { i + 1 };
    (pts[i] + pts[prev] + pts[next]) / 3.0
}

fn centerline_flags(pts: &[Vec3], closed: bool) -> Vec<bool> {
    let n = pts.len();
    let count = if closed { n } else { n.saturating_sub(1) };
    let seg = |k: usize| (k, (k + 1) % n);

    let crosses = |k: usize| {
        let (a, b) = seg(k);
        (0..count).any(|j| {
            let (c, d) = seg(j);
            if a == c || a == d || b == c || b == d {
                return false;
            }
            segments_intersect(pts[a], pts[b], pts[c], pts[d])
        })
    };

    (0..n)
        .map(|i| {
            let before = if closed { Some((i + n - 1) % n) } else { i.checked_sub(1) };
            let after = (i < count).then_some(i);
            [before, after].into_iter().flatten().any(|k| crosses(k))
        })
        .collect()
}

fn span_flags(pts: &[Vec3], closed: bool, span: &Span) -> Vec<bool> {
    // frames need the closing duplicate to wrap
    let mut ring = pts.to_vec();
    if closed {
        ring.push(pts[0]);
    }
    let rungs: Vec<(Vec3, Vec3)> = (0..pts.len())
        .map(|i| {
            let (xz, xy) = geometry::frame(&ring, i, closed);
            (
                pts[i] + xz * span.min.x + xy * span.min.y,
                pts[i] + xz * span.max.x + xy * span.max.y,
            )
        })
        .collect();

    rungs
        .iter()
        .enumerate()
        .map(|(i, &(a, b))| {
            rungs
                .iter()
                .enumerate()
                .any(|(j, &(c, d))| i != j && segments_intersect(a, b, c, d))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;

    fn xz(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    fn square(size: f32) -> Path {
        Path::from_points(vec![
            xz(0.0, 0.0),
            xz(size, 0.0),
            xz(size, size),
            xz(0.0, size),
            xz(0.0, 0.0),
        ])
    }

    #[test]
    fn empty_path_is_a_no_op() {
        let mut p = Path::new();
        assert_eq!(smooth_intersections(&mut p), SmoothReport { passes: 0, converged: true });
        smooth_uniform(&mut p, 5);
        divide(&mut p);
        assert!(p.is_empty());
    }

    #[test]
    fn clean_closed_path_is_untouched() {
        let mut p = square(10.0);
        let before = p.clone();
        let report = smooth_intersections(&mut p);
        assert_eq!(report, SmoothReport { passes: 0, converged: true });
        assert_eq!(p, before);
    }

    #[test]
    fn clean_path_is_untouched_by_span_check() {
        let mut p = square(20.0);
        let before = p.clone();
        let report = smooth_intersections_with_profile(&mut p, &Profile::flat_road(1.0));
        assert_eq!(report.passes, 0);
        assert_eq!(p, before);
    }

    #[test]
    fn bow_tie_collapses_onto_its_centroid() {
        // closed figure eight: (0,0)->(10,10)->(10,0)->(0,10)->(0,0)
        let mut p = Path::from_points(vec![
            xz(0.0, 0.0),
            xz(10.0, 10.0),
            xz(10.0, 0.0),
            xz(0.0, 10.0),
            xz(0.0, 0.0),
        ]);
        let report = smooth_intersections(&mut p);
        assert!(report.converged);
        assert!(report.passes > 0 && report.passes < MAX_SMOOTH_PASSES);
        assert!(p.is_closed());
        assert_eq!(p.len(), 5);
        for q in p.points() {
            assert!((*q - xz(5.0, 5.0)).length() < 1e-4, "{q} did not collapse");
        }
    }

    #[test]
    fn local_crossing_leaves_distant_points_alone() {
        // straight run, a small kink whose segments 2 and 4 cross, straight run
        let original = vec![
            xz(0.0, 0.0),
            xz(10.0, 0.0),
            xz(20.0, 0.0),
            xz(24.0, 2.0),
            xz(24.0, -2.0),
            xz(20.0, 2.0),
            xz(20.0, 12.0),
            xz(20.0, 22.0),
            xz(20.0, 32.0),
        ];
        assert!(centerline_flags(&original, false).iter().any(|f| *f));

        let mut p = Path::from_points(original.clone());
        let report = smooth_intersections(&mut p);
        assert!(report.converged);
        assert_eq!(report.passes, 1);

        let pts = p.points();
        for i in [0, 1, 6, 7, 8] {
            assert_eq!(pts[i], original[i], "waypoint {i} moved");
        }
        for i in 2..=5 {
            assert_ne!(pts[i], original[i], "waypoint {i} was not relaxed");
        }
        assert!(centerline_flags(pts, false).iter().all(|f| !*f));
    }

    #[test]
    fn flagged_points_that_cannot_move_settle() {
        // interior points of an evenly spaced line are their own neighbour average
        let mut p = Path::from_points((0..6).map(|i| xz(i as f32, 0.0)).collect());
        let before = p.clone();
        let report = relax(&mut p, MAX_SMOOTH_PASSES, true, |pts: &[Vec3], _| {
            (0..pts.len()).map(|i| i > 0 && i + 1 < pts.len()).collect()
        });
        assert_eq!(report, SmoothReport { passes: 0, converged: true });
        assert_eq!(p, before);
    }

    #[test]
    fn uniform_open_path_averages_endpoints_with_one_neighbour() {
        let mut p = Path::from_points(vec![xz(0.0, 0.0), xz(3.0, 3.0), xz(6.0, 0.0)]);
        smooth_uniform(&mut p, 1);
        let pts = p.points();
        assert_eq!(pts[0], xz(1.5, 1.5));
        assert_eq!(pts[1], xz(3.0, 1.0));
        assert_eq!(pts[2], xz(4.5, 1.5));
    }

    #[test]
    fn uniform_closed_path_stays_closed() {
        let mut p = square(9.0);
        smooth_uniform(&mut p, 3);
        assert!(p.is_closed());
        assert_eq!(p.len(), 5);
        // symmetric shrink towards the centre
        let c = p.points()[..4].iter().copied().sum::<Vec3>() / 4.0;
        assert!((c - xz(4.5, 4.5)).length() < 1e-4);
    }

    #[test]
    fn divide_integer_segment() {
        let mut p = Path::from_points(vec![xz(0.0, 0.0), xz(5.0, 0.0)]);
        divide(&mut p);
        assert_eq!(p.len(), 6);
        for (i, q) in p.points().iter().enumerate() {
            assert!((q.x - i as f32).abs() < 1e-5);
        }
    }

    #[test]
    fn divide_short_segments_keep_one_point() {
        let mut p = Path::from_points(vec![xz(0.0, 0.0), xz(1.5, 0.0), xz(1.5, 0.5)]);
        divide(&mut p);
        assert_eq!(p.points(), &[xz(0.0, 0.0), xz(1.5, 0.0), xz(1.5, 0.5)]);
    }

    #[test]
    fn divide_fractional_segment_keeps_unit_steps() {
        let mut p = Path::from_points(vec![xz(0.0, 0.0), xz(2.5, 0.0)]);
        divide(&mut p);
        assert_eq!(p.points(), &[xz(0.0, 0.0), xz(1.0, 0.0), xz(2.5, 0.0)]);

        let mut p = Path::from_points(vec![xz(0.0, 0.0), xz(3.9, 0.0)]);
        divide(&mut p);
        assert_eq!(p.points(), &[xz(0.0, 0.0), xz(1.0, 0.0), xz(2.0, 0.0), xz(3.9, 0.0)]);
    }

    #[test]
    fn divide_keeps_closure() {
        let mut p = square(4.0);
        divide(&mut p);
        assert!(p.is_closed());
        assert_eq!(p.len(), 17);
    }
}
