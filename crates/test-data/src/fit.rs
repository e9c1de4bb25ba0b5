//! FIT message generation from track points.
//!
//! Builds the typed messages the FIT decoder consumes, so generated tracks can
//! go through the same decoding path as a device upload without encoding a
//! binary file.

use nicerun::file_parsers::{FitMessage, FitRecord};
use time::OffsetDateTime;

use crate::TrackPointData;

/// Semicircles per degree.
const SEMICIRCLES: f64 = 2_147_483_648.0 / 180.0;

/// A sport message, one lap start per entry of `laps`, then one record per
/// point. Altitude is written to `enhanced_altitude`.
pub fn fit_messages(
    points: &[TrackPointData],
    sport: &str,
    laps: &[OffsetDateTime],
) -> Vec<FitMessage> {
    let mut messages = Vec::with_capacity(points.len() + laps.len() + 1);
    messages.push(FitMessage::Sport {
        sport: sport.to_string(),
    });
    messages.extend(laps.iter().map(|&start_time| FitMessage::Lap { start_time }));
    messages.extend(points.iter().map(|p| {
        FitMessage::Record(FitRecord {
            timestamp: Some(p.timestamp),
            position_lat: Some(degrees_to_semicircles(p.lat)),
            position_long: Some(degrees_to_semicircles(p.lon)),
            enhanced_altitude: p.elevation,
            altitude: None,
            heart_rate: p.heart_rate,
        })
    }));
    messages
}

pub fn degrees_to_semicircles(degrees: f64) -> i32 {
    (degrees * SEMICIRCLES).round() as i32
}
