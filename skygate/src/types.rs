//! Wire types shared between the upload client and the analysis server.

use serde::{Deserialize, Serialize};

/// A single star as produced by the upstream analysis generator.
///
/// The generator is an external collaborator; this crate only reads these
/// values and never validates them beyond what rendering requires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Right ascension in degrees (0-360)
    pub ra: f64,
    /// Declination in degrees (-90 to 90)
    pub dec: f64,
    /// Relative brightness (0-10)
    pub brightness: f64,
}

impl Star {
    pub fn new(ra: f64, dec: f64, brightness: f64) -> Self {
        Self {
            ra,
            dec,
            brightness,
        }
    }
}

/// A named sequence of star indices forming a constellation.
///
/// Indices reference positions in the accompanying star list. The producer
/// gives no referential-integrity guarantee, so consumers must tolerate
/// out-of-range indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    /// Display name (e.g. "Orion")
    pub name: String,
    /// Ordered member star indices; consecutive pairs form edges
    pub stars: Vec<usize>,
}

impl Constellation {
    pub fn new(name: impl Into<String>, stars: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            stars,
        }
    }
}
