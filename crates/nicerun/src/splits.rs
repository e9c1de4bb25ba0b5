//! Fixed-distance split timing and fastest-window search over the
//! cumulative distance and clock series of a track.

/// Default split length in kilometers.
pub const DEFAULT_SPLIT_KM: f64 = 0.1;

/// Seconds taken for each full `split_km` of the track, in order.
///
/// A split closes at the first sample whose cumulative distance reaches the
/// next multiple of `split_km`. Its time is the clock elapsed since the
/// previous split, scaled by `target / distance_at_crossing` to correct for
/// the overshoot. This assumes even pacing and is not an interpolation
/// between the two samples that straddle the boundary.
pub fn splits(distance: &[f64], clock: &[i64], split_km: f64) -> Vec<f64> {
    let mut result = Vec::new();
    if split_km <= 0.0 {
        return result;
    }

    let mut count = 1u32;
    let mut next_split = split_km;
    let mut split_start = 0;

    for (&d, &t) in distance.iter().zip(clock) {
        if d >= next_split {
            result.push((t - split_start) as f64 * (next_split / d));
            split_start = t;
            count += 1;
            next_split = split_km * f64::from(count);
        }
    }

    result
}

/// Shortest elapsed seconds over which `target_km` was covered.
///
/// Returns `None` when the track is shorter than the target. A target of zero
/// is covered instantly.
pub fn fastest_interval(distance: &[f64], clock: &[i64], target_km: f64) -> Option<i64> {
    let total = distance.last().copied()?;
    if total < target_km {
        return None;
    }

    let n = distance.len().min(clock.len());
    let mut best: Option<i64> = None;
    let mut end = 0;

    for start in 0..n {
        // Distance is non-decreasing, so the first covering end index never
        // moves backwards as the start advances.
        end = end.max(start);
        while end < n && distance[end] - distance[start] < target_km {
            end += 1;
        }
        if end == n {
            break;
        }

        let elapsed = clock[end] - clock[start];
        best = Some(best.map_or(elapsed, |b| b.min(elapsed)));
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Evenly spaced samples: `step_km` apart, `step_s` seconds apart.
    fn even_track(samples: usize, step_km: f64, step_s: i64) -> (Vec<f64>, Vec<i64>) {
        let distance = (0..samples).map(|i| i as f64 * step_km).collect();
        let clock = (0..samples).map(|i| i as i64 * step_s).collect();
        (distance, clock)
    }

    #[test]
    fn test_splits_even_pace() {
        // 62.5m every 15s -> 125m takes 30s
        let (distance, clock) = even_track(21, 0.0625, 15);
        let result = splits(&distance, &clock, 0.125);

        assert_eq!(result.len(), 10);
        for s in result {
            assert!((s - 30.0).abs() < 1e-6, "got {s}");
        }
    }

    #[test]
    fn test_splits_overshoot_scaling() {
        // Crossing 0.1km at 0.125km after 50s: 50 * (0.1 / 0.125) = 40
        let distance = [0.0, 0.125];
        let clock = [0, 50];
        let result = splits(&distance, &clock, 0.1);
        assert_eq!(result.len(), 1);
        assert!((result[0] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_splits_uses_cumulative_distance() {
        // Second split: 40s elapsed, crossing 0.2 at 0.25 -> 40 * 0.8 = 32
        let distance = [0.0, 0.1, 0.25];
        let clock = [0, 30, 70];
        let result = splits(&distance, &clock, 0.1);
        assert_eq!(result.len(), 2);
        assert!((result[0] - 30.0).abs() < 1e-9);
        assert!((result[1] - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_splits_short_track() {
        let distance = [0.0, 0.05, 0.09];
        let clock = [0, 10, 20];
        assert!(splits(&distance, &clock, 0.1).is_empty());
        assert!(splits(&[], &[], 0.1).is_empty());
    }

    #[test]
    fn test_fastest_interval() {
        // Slow first kilometer, fast second one.
        let distance = [0.0, 0.5, 1.0, 1.5, 2.0];
        let clock = [0, 200, 400, 550, 700];

        assert_eq!(fastest_interval(&distance, &clock, 1.0), Some(300));
        assert_eq!(fastest_interval(&distance, &clock, 0.5), Some(150));
        assert_eq!(fastest_interval(&distance, &clock, 2.0), Some(700));
    }

    #[test]
    fn test_fastest_interval_edge_cases() {
        let (distance, clock) = even_track(11, 0.1, 30);

        assert_eq!(fastest_interval(&distance, &clock, 5.0), None);
        assert_eq!(fastest_interval(&distance, &clock, 0.0), Some(0));
        assert_eq!(fastest_interval(&[], &[], 0.0), None);
    }

    #[test]
    fn test_fastest_interval_window_overshoot() {
        // No window is exactly 0.3km; the shortest covering window is 0.4km.
        let distance = [0.0, 0.2, 0.4, 0.6];
        let clock = [0, 60, 100, 160];
        assert_eq!(fastest_interval(&distance, &clock, 0.3), Some(100));
    }
}
