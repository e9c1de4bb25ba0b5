//! FIT (Flexible and Interoperable Data Transfer) decoding.
//!
//! Raw `fitparser` records are first narrowed to [`FitMessage`] values, which
//! carry only the fields the track model needs. Everything after that step is
//! independent of the binary container.

use fitparser::profile::field_types::MesgNum;
use time::OffsetDateTime;

use crate::errors::TrackError;
use crate::geo_utils::semicircle_to_degrees;
use crate::models::{DecodedTrack, TrackPointData};

/// A per-sample "record" message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitRecord {
    pub timestamp: Option<OffsetDateTime>,
    /// Semicircles
    pub position_lat: Option<i32>,
    /// Semicircles
    pub position_long: Option<i32>,
    pub enhanced_altitude: Option<f64>,
    pub altitude: Option<f64>,
    pub heart_rate: Option<i32>,
}

/// The subset of FIT messages used to build a track.
#[derive(Debug, Clone, PartialEq)]
pub enum FitMessage {
    Record(FitRecord),
    Sport { sport: String },
    Lap { start_time: OffsetDateTime },
}

impl FitMessage {
    fn from_data_record(record: &fitparser::FitDataRecord) -> Option<Self> {
        match record.kind() {
            MesgNum::Record => {
                let mut rec = FitRecord::default();
                for field in record.fields() {
                    match field.name() {
                        "timestamp" => rec.timestamp = extract_fit_timestamp(field.value()),
                        "position_lat" => rec.position_lat = extract_fit_i32(field.value()),
                        "position_long" => rec.position_long = extract_fit_i32(field.value()),
                        "enhanced_altitude" => {
                            rec.enhanced_altitude = extract_fit_f64(field.value())
                        }
                        "altitude" => rec.altitude = extract_fit_f64(field.value()),
                        "heart_rate" => rec.heart_rate = extract_fit_i32(field.value()),
                        _ => {}
                    }
                }
                Some(FitMessage::Record(rec))
            }
            MesgNum::Sport => record
                .fields()
                .iter()
                .find(|f| f.name() == "sport")
                .and_then(|f| match f.value() {
                    fitparser::Value::String(s) => Some(FitMessage::Sport { sport: s.clone() }),
                    _ => None,
                }),
            MesgNum::Lap => record
                .fields()
                .iter()
                .find(|f| f.name() == "start_time")
                .and_then(|f| extract_fit_timestamp(f.value()))
                .map(|start_time| FitMessage::Lap { start_time }),
            _ => None,
        }
    }
}

/// Parse a FIT file.
pub fn parse_fit(bytes: &[u8]) -> Result<DecodedTrack, TrackError> {
    let fit_data = fitparser::from_bytes(bytes).map_err(|e| TrackError::Fit(e.to_string()))?;
    tracing::debug!("Read {} FIT data records", fit_data.len());

    decode_fit_messages(fit_data.iter().filter_map(FitMessage::from_data_record))
}

/// Build a track from FIT messages in file order.
///
/// Records without a timestamp or without a position are dropped so that the
/// per-sample series stay aligned. Only the first sport message is used.
pub fn decode_fit_messages(
    messages: impl IntoIterator<Item = FitMessage>,
) -> Result<DecodedTrack, TrackError> {
    let mut records = 0usize;
    let mut points = Vec::new();
    let mut sport: Option<String> = None;
    let mut laps = Vec::new();

    for message in messages {
        match message {
            FitMessage::Record(rec) => {
                records += 1;
                let (Some(timestamp), Some(lat), Some(lon)) =
                    (rec.timestamp, rec.position_lat, rec.position_long)
                else {
                    continue;
                };

                points.push(TrackPointData {
                    lat: semicircle_to_degrees(lat),
                    lon: semicircle_to_degrees(lon),
                    elevation: rec.enhanced_altitude.or(rec.altitude),
                    timestamp,
                    heart_rate: rec.heart_rate.filter(|hr| *hr > 0),
                });
            }
            FitMessage::Sport { sport: s } => {
                sport.get_or_insert(s);
            }
            FitMessage::Lap { start_time } => laps.push(start_time),
        }
    }

    if records == 0 {
        return Err(TrackError::malformed("FIT file contains no record messages"));
    }
    let Some(first) = points.first() else {
        return Err(TrackError::malformed("FIT file contains no positioned records"));
    };
    if points.len() < records {
        tracing::debug!("Skipped {} FIT records without position", records - points.len());
    }

    let mut track = DecodedTrack::new(first.timestamp, points);
    if let Some(sport) = sport {
        track.activity_type = sport;
    }
    track.laps = laps;
    Ok(track)
}

/// FIT timestamps are UTC instants; `fitparser` hands them over in the
/// machine's local zone.
fn extract_fit_timestamp(value: &fitparser::Value) -> Option<OffsetDateTime> {
    match value {
        fitparser::Value::Timestamp(t) => {
            let utc = t.with_timezone(&chrono::Utc);
            OffsetDateTime::from_unix_timestamp(utc.timestamp())
                .ok()
                .and_then(|odt| odt.replace_nanosecond(utc.timestamp_subsec_nanos()).ok())
        }
        _ => None,
    }
}

/// Extract i32 from various FIT value types
fn extract_fit_i32(value: &fitparser::Value) -> Option<i32> {
    match value {
        fitparser::Value::SInt8(v) => Some(*v as i32),
        fitparser::Value::UInt8(v) => Some(*v as i32),
        fitparser::Value::SInt16(v) => Some(*v as i32),
        fitparser::Value::UInt16(v) => Some(*v as i32),
        fitparser::Value::SInt32(v) => Some(*v),
        fitparser::Value::UInt32(v) => Some(*v as i32),
        _ => None,
    }
}

/// Extract f64 from various FIT value types
fn extract_fit_f64(value: &fitparser::Value) -> Option<f64> {
    match value {
        fitparser::Value::Float32(v) => Some(*v as f64),
        fitparser::Value::Float64(v) => Some(*v),
        fitparser::Value::SInt16(v) => Some(*v as f64),
        fitparser::Value::UInt16(v) => Some(*v as f64),
        fitparser::Value::SInt32(v) => Some(*v as f64),
        fitparser::Value::UInt32(v) => Some(*v as f64),
        _ => None,
    }
}
