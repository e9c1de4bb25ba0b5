//! GPX decoding, with heart rate taken from Garmin `TrackPointExtension`
//! elements when every point carries one.

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use super::xml_tree::{self, XmlElement};
use crate::errors::TrackError;
use crate::models::{DEFAULT_ACTIVITY_TYPE, DecodedTrack, TrackPointData};

/// Used when the document does not name its track.
pub const DEFAULT_GPX_NAME: &str = "Unnamed Run";

/// One `<trkpt>`, with every field the track model reads.
#[derive(Debug, Clone, PartialEq)]
pub struct GpxPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: f64,
    pub time: OffsetDateTime,
    /// Whether the point has a `TrackPointExtension` block at all.
    pub has_extension: bool,
    pub heart_rate: Option<i32>,
}

impl GpxPoint {
    fn from_element(pt: &XmlElement, index: usize) -> Result<Self, TrackError> {
        let missing = |what: &str| TrackError::malformed(format!("track point {index} has no {what}"));

        let lat = pt
            .attr("lat")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .ok_or_else(|| missing("latitude"))?;
        let lon = pt
            .attr("lon")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .ok_or_else(|| missing("longitude"))?;
        let ele = leaf(pt, "ele")
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| missing("elevation"))?;
        let raw_time = leaf(pt, "time").ok_or_else(|| missing("time"))?;
        let time = parse_time(raw_time).ok_or_else(|| {
            TrackError::malformed(format!(
                "track point {index} has unparseable time '{raw_time}'"
            ))
        })?;

        let extension = pt
            .child("extensions")
            .and_then(|ext| ext.child("TrackPointExtension"));
        let heart_rate = extension
            .and_then(|ext| leaf(ext, "hr"))
            .and_then(|v| v.parse::<f64>().ok())
            .map(|hr| hr.round() as i32)
            .filter(|hr| *hr > 0);

        Ok(Self {
            lat,
            lon,
            ele,
            time,
            has_extension: extension.is_some(),
            heart_rate,
        })
    }
}

/// Parse a GPX document. All tracks and segments are flattened into one
/// point sequence in document order.
///
/// The name and type come from the first `<trk>` only; later tracks
/// contribute points but not metadata.
pub fn parse_gpx(bytes: &[u8]) -> Result<DecodedTrack, TrackError> {
    let root = xml_tree::parse(bytes)?;
    if root.tag != "gpx" {
        return Err(TrackError::malformed(format!(
            "root element is <{}>, expected <gpx>",
            root.tag
        )));
    }

    let tracks: Vec<&XmlElement> = root.children_named("trk").collect();

    let mut gpx_points = Vec::new();
    for trk in &tracks {
        for seg in trk.children_named("trkseg") {
            for pt in seg.children_named("trkpt") {
                gpx_points.push(GpxPoint::from_element(pt, gpx_points.len())?);
            }
        }
    }

    let Some(first) = gpx_points.first() else {
        return Err(TrackError::malformed("GPX file contains no track points"));
    };
    let start = first.time;

    // Heart rate is all or nothing: one point without the extension drops the
    // channel for the whole track.
    let with_hr = gpx_points.iter().all(|p| p.has_extension);
    if !with_hr {
        tracing::debug!("GPX track points lack TrackPointExtension, ignoring heart rate");
    }

    let points: Vec<TrackPointData> = gpx_points
        .into_iter()
        .map(|p| TrackPointData {
            lat: p.lat,
            lon: p.lon,
            elevation: Some(p.ele),
            timestamp: p.time,
            heart_rate: if with_hr { p.heart_rate } else { None },
        })
        .collect();

    let first_track = tracks.first();
    let mut track = DecodedTrack::new(start, points);
    track.name = first_track
        .and_then(|t| t.child("name"))
        .and_then(XmlElement::leaf_text)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_GPX_NAME)
        .to_string();
    track.activity_type = first_track
        .and_then(|t| t.child("type"))
        .and_then(XmlElement::leaf_text)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_ACTIVITY_TYPE.to_string());

    tracing::debug!(
        "Decoded GPX track '{}' with {} points",
        track.name,
        track.points.len()
    );
    Ok(track)
}

fn leaf<'a>(element: &'a XmlElement, tag: &str) -> Option<&'a str> {
    element.child(tag).and_then(XmlElement::leaf_text)
}

/// Timestamps without an offset are taken as UTC.
fn parse_time(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(s, &Iso8601::DEFAULT))
        .map(|t| t.to_offset(UtcOffset::UTC))
        .or_else(|_| {
            PrimitiveDateTime::parse(s, &Iso8601::DEFAULT).map(PrimitiveDateTime::assume_utc)
        })
        .ok()
}
