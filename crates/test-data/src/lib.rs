//! Test data generation for nicerun.
//!
//! Produces realistic synthetic activities: random-walk GPS tracks over
//! Perlin-noise terrain, timed by an athlete profile that also drives heart
//! rate. Tracks can be written as GPX documents or as FIT messages and fed
//! back through the decoders.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let points = ProceduralGenerator::new(42)
//!     .with_distance(5000.0)
//!     .generate(&RunnerProfile::default(), &mut rng);
//! let gpx = generate_gpx(&points, "Morning Run");
//! ```

pub mod config;
pub mod fit;
pub mod gpx;
pub mod profiles;
pub mod sources;
pub mod terrain;

// Re-export core types from nicerun crate
pub use nicerun::models::{DecodedTrack, TrackPointData};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{BoundingBox, Region};
    pub use crate::fit::fit_messages;
    pub use crate::gpx::{generate_gpx, generate_gpx_segments};
    pub use crate::profiles::{AthleteProfile, RunnerProfile, sample_variance, speed_at_grade};
    pub use crate::sources::{ProceduralGenerator, TrackConfig};
    pub use crate::terrain::ElevationGenerator;
    pub use crate::{DecodedTrack, TrackPointData};
    pub use rand::{SeedableRng, rngs::StdRng};
}
