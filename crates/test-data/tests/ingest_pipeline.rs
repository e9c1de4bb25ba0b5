//! End-to-end ingestion of generated GPX documents and FIT messages.

use std::io::BufReader;

use bytes::Bytes;
use nicerun::{
    activity::Activity,
    config::IngestConfig,
    elevation::{CachedElevation, ElevationProvider},
    errors::{DataWarning, TrackError},
    file_parsers::{FileType, decode_fit_messages},
    geo_utils::haversine,
    ingest,
};
use test_data::fit::fit_messages;
use test_data::prelude::*;
use time::macros::datetime;

const T0: time::OffsetDateTime = datetime!(2020-06-07 22:54:50 UTC);

fn generated_run(distance_m: f64, seed: u64) -> Vec<TrackPointData> {
    ProceduralGenerator::new(42)
        .with_distance(distance_m)
        .with_start(-37.88, 145.32)
        .generate(&RunnerProfile::default(), &mut StdRng::seed_from_u64(seed))
}

fn raw_config() -> IngestConfig {
    IngestConfig {
        simplify: false,
        ..Default::default()
    }
}

fn point(lat: f64, lon: f64, secs: i64, heart_rate: Option<i32>) -> TrackPointData {
    TrackPointData {
        lat,
        lon,
        elevation: Some(100.0),
        timestamp: T0 + time::Duration::seconds(secs),
        heart_rate,
    }
}

fn assert_series_invariants(activity: &Activity) {
    let n = activity.len();
    assert_eq!(activity.latitude().len(), n);
    assert_eq!(activity.longitude().len(), n);
    assert_eq!(activity.elevation().len(), n);
    assert_eq!(activity.clock().len(), n);
    assert_eq!(activity.distance().len(), n);
    assert_eq!(activity.heart_rate().len(), n);

    if n > 0 {
        assert_eq!(activity.clock()[0], 0);
        assert_eq!(activity.distance()[0], 0.0);
    }
    assert!(activity.clock().windows(2).all(|w| w[0] <= w[1]));
    assert!(activity.distance().windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(activity.total_distance(), activity.distance().last().copied().unwrap_or(0.0));
    assert_eq!(activity.duration(), activity.clock().last().copied().unwrap_or(0));
    assert!(activity.uphill() >= 0.0 && activity.downhill() >= 0.0);
}

#[test]
fn test_generated_gpx_ingests() {
    let points = generated_run(3000.0, 1);
    let gpx = generate_gpx(&points, "Dandenongs Loop");

    let activity = ingest(FileType::Gpx, Bytes::from(gpx), None, &raw_config(), None).unwrap();

    assert_series_invariants(&activity);
    assert_eq!(activity.len(), points.len());
    assert_eq!(activity.name, "Dandenongs Loop");
    assert_eq!(activity.activity_type, "running");
    assert_eq!(activity.start(), T0);
    assert!(activity.warnings().is_empty());
    assert!(activity.total_distance() > 2.5, "got {}", activity.total_distance());

    let expected_hr: Vec<Option<i32>> = points.iter().map(|p| p.heart_rate).collect();
    assert_eq!(activity.heart_rate(), expected_hr.as_slice());
    assert!(activity.average_hr() > 0);
    assert!(activity.max_hr() >= activity.average_hr());
}

#[test]
fn test_generated_gpx_is_valid_for_other_readers() {
    let points = generated_run(500.0, 2);
    let (first, second) = points.split_at(points.len() / 2);
    let doc = generate_gpx_segments(&[first, second], "Split Run", Some("running"));

    let parsed = gpx::read(BufReader::new(doc.as_slice())).unwrap();
    assert_eq!(parsed.tracks.len(), 1);
    assert_eq!(parsed.tracks[0].segments.len(), 2);
    let total: usize = parsed.tracks[0].segments.iter().map(|s| s.points.len()).sum();
    assert_eq!(total, points.len());
}

#[test]
fn test_segments_flatten_into_one_series() {
    let first = vec![point(1.0, 1.0, 0, None), point(1.0, 1.001, 10, None)];
    let second = vec![point(1.0, 1.002, 20, None), point(1.0, 1.003, 30, None)];
    let doc = generate_gpx_segments(&[first.as_slice(), second.as_slice()], "Two Parts", None);

    let activity = ingest(FileType::Gpx, Bytes::from(doc), None, &raw_config(), None).unwrap();

    assert_series_invariants(&activity);
    assert_eq!(activity.len(), 4);
    assert_eq!(activity.longitude(), &[1.0, 1.001, 1.002, 1.003]);
    assert_eq!(activity.clock(), &[0, 10, 20, 30]);
    assert_eq!(activity.warnings(), &[DataWarning::MissingHeartRate]);
}

#[test]
fn test_partial_heart_rate_is_dropped_and_pace_scores() {
    // 0.5km splits at 4:00/km: 125m every 30s along the equator
    let step = 0.125 / haversine((0.0, 0.0), (0.0, 1.0));
    let points: Vec<TrackPointData> = (0..41)
        .map(|i| point(0.0, i as f64 * step, i * 30, (i < 20).then_some(150)))
        .collect();
    let doc = generate_gpx(&points, "Tempo");

    let activity = ingest(FileType::Gpx, Bytes::from(doc), None, &raw_config(), None).unwrap();

    assert!(activity.heart_rate().iter().all(Option::is_none));
    assert_eq!(activity.average_hr(), 0);
    assert_eq!(activity.warnings(), &[DataWarning::MissingHeartRate]);

    // Without a reference pace the heart-rate model scores nothing.
    assert_eq!(activity.effort(190, None), Some(0));
    // 4:00/km is faster than the max threshold of a 5:00/km runner
    // (4.6 min/km), so ~20 minutes of splits count double: ~80.
    let effort = activity.effort(190, Some(5.0)).unwrap();
    assert!((68..=84).contains(&effort), "got {effort}");
}

#[test]
fn test_pipeline_order_and_names() {
    let points = generated_run(2000.0, 3);
    let config = IngestConfig {
        generate_name: true,
        fastest_distances: vec![1.0, 0.4, 1.0, 50.0],
        ..Default::default()
    };

    let generated = ingest(
        FileType::Other,
        Bytes::from(generate_gpx(&points, "From File")),
        None,
        &config,
        None,
    )
    .unwrap();
    assert_series_invariants(&generated);
    assert!(generated.name.starts_with("🏃‍♂ "), "got {}", generated.name);
    assert!(generated.name.ends_with(" km Morning Run"));
    assert!(generated.len() < points.len());

    let record = generated.to_record();
    assert_eq!(record.fastest.len(), 3);
    assert!(record.fastest["0.4"].is_some());
    assert!(record.fastest["1"].is_some());
    assert_eq!(record.fastest["50"], None);
    assert!(record.fastest["0.4"] <= record.fastest["1"]);

    let named = ingest(
        FileType::Gpx,
        Bytes::from(generate_gpx(&points, "From File")),
        Some("Sunday Long Run"),
        &config,
        None,
    )
    .unwrap();
    assert_eq!(named.name, "Sunday Long Run");
}

#[test]
fn test_simplify_keeps_endpoints() {
    let points = generated_run(3000.0, 4);
    let doc = generate_gpx(&points, "Simplified");
    let config = IngestConfig::default();

    let activity = ingest(FileType::Gpx, Bytes::from(doc), None, &config, None).unwrap();

    assert_series_invariants(&activity);
    assert!(activity.len() >= 2);
    assert!(activity.len() < points.len());
    let last = points.last().unwrap();
    assert!((activity.latitude()[0] - points[0].lat).abs() < 1e-6);
    assert!((activity.latitude()[activity.len() - 1] - last.lat).abs() < 1e-6);
    assert_eq!(activity.duration(), (last.timestamp - T0).whole_seconds());
}

#[test]
fn test_fit_messages_decode() {
    let points = vec![
        point(0.0, 0.0, 0, Some(120)),
        point(0.0, 0.001, 10, Some(140)),
        point(0.0, 0.002, 20, Some(130)),
    ];
    let track = decode_fit_messages(fit_messages(&points, "running", &[T0])).unwrap();
    let activity = Activity::from_decoded(track);

    assert_series_invariants(&activity);
    assert_eq!(activity.duration(), 20);
    let expected = 2.0 * haversine((0.0, 0.0), (0.0, 0.001));
    assert!((activity.total_distance() - expected).abs() < 1e-4);
    assert_eq!(activity.average_hr(), 130);
    assert_eq!(activity.max_hr(), 140);
    assert_eq!(activity.laps(), &[T0]);
}

#[test]
fn test_fit_generated_run_matches_gpx() {
    let points = generated_run(1000.0, 5);
    let from_fit = Activity::from_decoded(
        decode_fit_messages(fit_messages(&points, "running", &[])).unwrap(),
    );
    let from_gpx = ingest(
        FileType::Gpx,
        Bytes::from(generate_gpx(&points, "Same Run")),
        None,
        &raw_config(),
        None,
    )
    .unwrap();

    assert_eq!(from_fit.len(), from_gpx.len());
    assert_eq!(from_fit.clock(), from_gpx.clock());
    assert_eq!(from_fit.heart_rate(), from_gpx.heart_rate());
    assert!((from_fit.total_distance() - from_gpx.total_distance()).abs() < 1e-3);
}

#[test]
fn test_elevation_fix_with_gaps() {
    let points = vec![
        point(-37.9, 145.30, 0, Some(120)),
        point(-37.9, 145.31, 60, Some(130)),
        point(-37.9, 145.50, 120, Some(140)),
    ];
    let terrain = ElevationGenerator::dandenongs(8).with_coverage(Region::DANDENONGS);
    let config = IngestConfig {
        simplify: false,
        fix_elevation: true,
        ..Default::default()
    };

    let activity = ingest(
        FileType::Gpx,
        Bytes::from(generate_gpx(&points, "Hills")),
        None,
        &config,
        Some(&terrain),
    )
    .unwrap();

    assert_eq!(
        activity.elevation()[0],
        terrain.elevation_at(-37.9, 145.30)
    );
    // Outside coverage: the recorded value is kept
    assert_eq!(activity.elevation()[2], Some(100.0));
    assert_eq!(
        activity.warnings(),
        &[DataWarning::ElevationUnavailable { samples: 1 }]
    );
}

#[test]
fn test_elevation_fix_requested_without_provider() {
    let points = vec![point(1.0, 1.0, 0, None), point(1.0, 1.001, 10, None)];
    let config = IngestConfig {
        fix_elevation: true,
        ..Default::default()
    };
    let activity = ingest(
        FileType::Gpx,
        Bytes::from(generate_gpx(&points, "No DEM")),
        None,
        &config,
        None,
    )
    .unwrap();
    assert_eq!(activity.elevation(), &[Some(100.0), Some(100.0)]);
}

#[test]
fn test_cached_terrain_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elevation.json");
    let points = generated_run(500.0, 6);
    let doc = Bytes::from(generate_gpx(&points, "Cached"));
    let config = IngestConfig {
        fix_elevation: true,
        ..Default::default()
    };

    let cached = CachedElevation::new(ElevationGenerator::dandenongs(3), &path);
    let first = ingest(FileType::Gpx, doc.clone(), None, &config, Some(&cached)).unwrap();
    cached.persist();

    let offline = CachedElevation::new(|_: f64, _: f64| -> Option<f64> { None }, &path);
    let second = ingest(FileType::Gpx, doc, None, &config, Some(&offline)).unwrap();

    assert_eq!(first.elevation(), second.elevation());
    assert!(second.warnings().is_empty());
}

#[test]
fn test_rejects_bad_input() {
    let err = ingest(
        FileType::Other,
        Bytes::from_static(b"name,lat,lon\n"),
        None,
        &IngestConfig::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, TrackError::UnsupportedFormat(_)));

    let err = ingest(
        FileType::Gpx,
        Bytes::from_static(b"<gpx><trk><trkseg/></trk></gpx>"),
        None,
        &IngestConfig::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, TrackError::MalformedTrack(_)));
}

#[test]
fn test_record_serializes() {
    let points = generated_run(800.0, 7);
    let activity = ingest(
        FileType::Gpx,
        Bytes::from(generate_gpx(&points, "JSON")),
        None,
        &IngestConfig::default(),
        None,
    )
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&activity.to_json().unwrap()).unwrap();
    assert_eq!(json["name"], "JSON");
    assert_eq!(json["start"], "2020-06-07T22:54:50Z");
    assert_eq!(json["start_local"], "2020-06-08 08:54:50");
    assert_eq!(json["latitude"].as_array().unwrap().len(), activity.len());
    assert_eq!(json["clock"][0], 0);
}
