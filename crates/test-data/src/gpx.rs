//! GPX file generation from track points.
//!
//! Writes GPX 1.1 with heart rate in Garmin `TrackPointExtension` blocks, the
//! layout produced by most watches and accepted by the GPX decoder.

use std::fmt::Write;

use time::format_description::well_known::Rfc3339;

use crate::TrackPointData;

/// Generates a single-segment GPX document.
pub fn generate_gpx(points: &[TrackPointData], activity_name: &str) -> Vec<u8> {
    generate_gpx_segments(&[points], activity_name, Some("running"))
}

/// Generates a GPX document with one `<trkseg>` per slice, in order.
///
/// Points with a heart rate get a `TrackPointExtension`; points without one
/// get no `<extensions>` element at all.
pub fn generate_gpx_segments(
    segments: &[&[TrackPointData]],
    activity_name: &str,
    activity_type: Option<&str>,
) -> Vec<u8> {
    let mut gpx = String::new();

    gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    gpx.push('\n');
    gpx.push_str(r#"<gpx version="1.1" creator="nicerun-test-data""#);
    gpx.push_str(r#" xmlns="http://www.topografix.com/GPX/1/1""#);
    gpx.push_str(r#" xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1""#);
    gpx.push_str(r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#);
    gpx.push_str(r#" xsi:schemaLocation="http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd">"#);
    gpx.push('\n');

    gpx.push_str("  <trk>\n");
    let _ = writeln!(gpx, "    <name>{}</name>", escape_xml(activity_name));
    if let Some(kind) = activity_type {
        let _ = writeln!(gpx, "    <type>{}</type>", escape_xml(kind));
    }

    for segment in segments {
        gpx.push_str("    <trkseg>\n");
        for point in *segment {
            write_point(&mut gpx, point);
        }
        gpx.push_str("    </trkseg>\n");
    }

    gpx.push_str("  </trk>\n");
    gpx.push_str("</gpx>\n");

    gpx.into_bytes()
}

fn write_point(gpx: &mut String, point: &TrackPointData) {
    let _ = writeln!(
        gpx,
        r#"      <trkpt lat="{:.7}" lon="{:.7}">"#,
        point.lat, point.lon
    );
    if let Some(ele) = point.elevation {
        let _ = writeln!(gpx, "        <ele>{ele:.2}</ele>");
    }
    let _ = writeln!(
        gpx,
        "        <time>{}</time>",
        point.timestamp.format(&Rfc3339).unwrap_or_default()
    );
    if let Some(hr) = point.heart_rate {
        gpx.push_str("        <extensions>\n");
        let _ = writeln!(
            gpx,
            "          <gpxtpx:TrackPointExtension><gpxtpx:hr>{hr}</gpxtpx:hr></gpxtpx:TrackPointExtension>"
        );
        gpx.push_str("        </extensions>\n");
    }
    gpx.push_str("      </trkpt>\n");
}

/// Escapes XML special characters in a string.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
