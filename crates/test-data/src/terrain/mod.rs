//! Terrain generation utilities.
//!
//! Elevation profiles from Perlin noise. [`ElevationGenerator`] also serves
//! as an elevation provider when testing elevation correction.

mod elevation;

pub use elevation::{ElevationGenerator, add_elevation_jitter};
