//! Activity file parsers for FIT and GPX formats.
//!
//! Both decoders produce a [`DecodedTrack`]; distance and clock series are
//! derived later, when the track is turned into an
//! [`Activity`](crate::activity::Activity).

mod fit;
mod gpx;
pub mod xml_tree;

use std::path::Path;

use bytes::Bytes;

use crate::errors::TrackError;
use crate::models::DecodedTrack;

pub use fit::{FitMessage, FitRecord, decode_fit_messages, parse_fit};
pub use gpx::{DEFAULT_GPX_NAME, GpxPoint, parse_gpx};

/// FIT files carry this signature at byte offset 8.
const FIT_SIGNATURE: &[u8] = b".FIT";

/// How far into a document to look for the `<gpx` root.
const SNIFF_LEN: usize = 1024;

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Fit,
    Gpx,
    Other,
}

impl FileType {
    /// Pick the decoder from a file extension, ignoring case.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("fit") => FileType::Fit,
            Some("gpx") => FileType::Gpx,
            _ => FileType::Other,
        }
    }

    /// Guess the format from file content.
    pub fn detect_from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() >= 12 && &bytes[8..12] == FIT_SIGNATURE {
            return FileType::Fit;
        }

        let head = &bytes[..bytes.len().min(SNIFF_LEN)];
        let head = String::from_utf8_lossy(head);
        if head.trim_start().starts_with('<') && head.contains("<gpx") {
            return FileType::Gpx;
        }

        FileType::Other
    }
}

/// Parse an activity file based on its detected type.
/// For FileType::Other, attempts to detect the format from the bytes.
pub fn parse_activity_file(file_type: FileType, bytes: Bytes) -> Result<DecodedTrack, TrackError> {
    let actual_type = if file_type == FileType::Other {
        FileType::detect_from_bytes(&bytes)
    } else {
        file_type
    };

    match actual_type {
        FileType::Fit => parse_fit(&bytes),
        FileType::Gpx => parse_gpx(&bytes),
        FileType::Other => Err(TrackError::UnsupportedFormat(
            "expected a .fit or .gpx file".to_string(),
        )),
    }
}
