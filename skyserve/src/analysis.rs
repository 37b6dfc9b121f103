//! Pseudo-deterministic analysis generator.
//!
//! Stands in for the external analysis collaborator: derives a seed from
//! the submitted payload size and expands it into a star field and summary
//! figures. The same upload size always produces the same analysis, which
//! keeps the downstream layout pipeline reproducible end to end. The
//! layout core treats everything here as opaque input data.

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use skygate::{Constellation, Star};

/// Analysis payload returned to the client after a gated submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub star_count: usize,
    pub cluster_count: usize,
    pub anomaly_count: usize,
    pub discovery_score: u64,
    pub summary: String,
    pub timestamp: String,
    pub stars: Vec<Star>,
    pub constellations: Vec<Constellation>,
}

/// Generate an analysis for an upload of `payload_size` bytes.
///
/// Seed is `payload_size % 1000`; counts and the star field follow
/// deterministically from it. Star coordinates cover the full celestial
/// domain and brightness the full 0-10 scale.
pub fn generate(payload_size: usize) -> AnalysisResult {
    let seed = (payload_size % 1000) as u64;
    let star_count = 120 + (seed as usize % 50);
    let cluster_count = 3 + (seed as usize % 5);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let stars = (0..star_count)
        .map(|_| {
            Star::new(
                rng.random_range(0.0..360.0),
                rng.random_range(-90.0..90.0),
                rng.random_range(0.0..10.0),
            )
        })
        .collect();

    AnalysisResult {
        star_count,
        cluster_count,
        anomaly_count: seed as usize % 3,
        discovery_score: 65 + (seed % 30),
        summary: format!(
            "Stellar analysis extracted {star_count} distinct stellar objects from the \
             provided night-sky image. The field exhibits moderate stellar density with \
             {cluster_count} distinct clustering formations. Image contrast is sufficient \
             for reliable feature extraction."
        ),
        timestamp: Utc::now().to_rfc3339(),
        stars,
        constellations: vec![
            Constellation::new("Orion", vec![0, 1, 2, 3, 4]),
            Constellation::new("Ursa Major", vec![10, 11, 12, 13, 14, 15]),
        ],
    }
}
