//! Ramer-Douglas-Peucker polyline reduction.
//!
//! The farthest point of each span is picked with a planar line equation,
//! which is cheap but only approximate. Its true offset from the chord is then
//! measured on the sphere before deciding whether the span can collapse.

use crate::geo_utils::haversine;
use crate::models::Positioned;

/// Default tolerance in kilometers.
pub const DEFAULT_TOLERANCE_KM: f64 = 0.02;

/// Coefficients `(a, b, c)` of the planar line `a * lat + b * lon + c = 0`
/// through two points. Not spherical.
fn line_equation_coefficients(p1: (f64, f64), p2: (f64, f64)) -> (f64, f64, f64) {
    if p1.1 == p2.1 {
        // Vertical line
        (0.0, 1.0, -p1.1)
    } else {
        let a = (p1.0 - p2.0) / (p1.1 - p2.1);
        let b = p1.0 - p1.1 * a;
        (1.0, -a, -b)
    }
}

/// Distance in meters of `point` from the great-circle chord between
/// `line_start` and `line_end`, from the area of the spherical triangle.
pub fn distance_from_line(point: (f64, f64), line_start: (f64, f64), line_end: (f64, f64)) -> f64 {
    let a = haversine(line_start, line_end) * 1000.0;

    if a == 0.0 {
        return haversine(line_start, point) * 1000.0;
    }

    let b = haversine(line_start, point) * 1000.0;
    let c = haversine(line_end, point) * 1000.0;

    let s = (a + b + c) / 2.0;
    2.0 * (s * (s - a) * (s - b) * (s - c)).abs().sqrt() / a
}

/// Indices of the points kept by the reduction, in order.
///
/// The first and last index are always kept. Inputs shorter than three points
/// are returned whole. Spans are processed from an explicit work stack, so
/// very long tracks cannot exhaust the call stack.
pub fn simplify_indices<P: Positioned>(points: &[P], tolerance_km: f64) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }

    let tolerance_m = tolerance_km * 1000.0;
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut spans = vec![(0, n - 1)];

    while let Some((first, last)) = spans.pop() {
        if last - first < 2 {
            continue;
        }

        let begin = points[first].position();
        let end = points[last].position();
        let (a, b, c) = line_equation_coefficients(begin, end);

        let mut max_distance = 0.0;
        let mut candidate = first + 1;
        for (i, point) in points.iter().enumerate().take(last).skip(first + 1) {
            let (lat, lon) = point.position();
            let d = (a * lat + b * lon + c).abs();
            if d > max_distance {
                max_distance = d;
                candidate = i;
            }
        }

        let real_distance = distance_from_line(points[candidate].position(), begin, end);
        if real_distance < tolerance_m {
            continue;
        }

        keep[candidate] = true;
        spans.push((candidate, last));
        spans.push((first, candidate));
    }

    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect()
}

/// Reduce `points` with the given tolerance in kilometers.
pub fn simplify_polyline<P: Positioned + Clone>(points: &[P], tolerance_km: f64) -> Vec<P> {
    simplify_indices(points, tolerance_km)
        .into_iter()
        .map(|i| points[i].clone())
        .collect()
}
