//! Geodesy and unit helpers shared by the decoders and analyzers.
//!
//! Kilometers are the canonical distance unit throughout the crate.

/// Mean Earth radius in kilometers.
pub const AVG_EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers to statute miles.
pub const KM_TO_MILES: f64 = 0.621371;

/// Great-circle distance in kilometers between two `(lat, lon)` points in degrees.
pub fn haversine(p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let (lat1, lon1) = (p1.0.to_radians(), p1.1.to_radians());
    let (lat2, lon2) = (p2.0.to_radians(), p2.1.to_radians());

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);
    2.0 * AVG_EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Same as [`haversine`], in miles.
pub fn haversine_miles(p1: (f64, f64), p2: (f64, f64)) -> f64 {
    haversine(p1, p2) * KM_TO_MILES
}

/// Convert FIT semicircles to degrees.
/// FIT uses semicircles where 2^31 semicircles = 180 degrees.
pub fn semicircle_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}

/// Running haversine sum over a polyline, seeded at zero.
///
/// The result has one entry per input point.
pub fn cumulative_distance(lat: &[f64], lon: &[f64]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(lat.len());
    let mut total = 0.0;
    let mut prev: Option<(f64, f64)> = None;

    for point in lat.iter().copied().zip(lon.iter().copied()) {
        if let Some(prev) = prev {
            total += haversine(prev, point);
        }
        distances.push(total);
        prev = Some(point);
    }

    distances
}

/// Format whole seconds as `MM:SS`.
pub fn format_mins_seconds(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
