//! Track geometry sources.

mod procedural;

pub use procedural::{ProceduralGenerator, TrackConfig};
