//! Constellation polylines and label anchors.
//!
//! Consecutive star indices form edges; an index outside the star list
//! drops only the edges touching it, never the whole constellation. The
//! label anchor is the centroid of the resolvable members, jittered by the
//! same band as marker labels so names drift off the marker glyphs.

use rand::Rng;
use skygate::{Constellation, Star};

use crate::placement::label_jitter;
use crate::projection::{ProjectedPoint, Projector};

/// One line segment between two member stars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstellationEdge {
    pub from: ProjectedPoint,
    pub to: ProjectedPoint,
}

/// Jittered label anchor for one constellation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationLabel {
    pub name: String,
    pub anchor: ProjectedPoint,
}

/// Edges and labels for every constellation in one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstellationLayout {
    pub edges: Vec<ConstellationEdge>,
    pub labels: Vec<ConstellationLabel>,
}

/// Lay out all constellations against the current star list.
///
/// Constellations with no resolvable members produce neither edges nor a
/// label; dangling indices are skipped locally.
pub fn layout_constellations<R: Rng>(
    constellations: &[Constellation],
    stars: &[Star],
    projector: &Projector,
    rng: &mut R,
) -> ConstellationLayout {
    let mut layout = ConstellationLayout::default();

    for constellation in constellations {
        for pair in constellation.stars.windows(2) {
            let (Some(a), Some(b)) = (stars.get(pair[0]), stars.get(pair[1])) else {
                continue;
            };
            layout.edges.push(ConstellationEdge {
                from: projector.project_star(a),
                to: projector.project_star(b),
            });
        }

        let members: Vec<ProjectedPoint> = constellation
            .stars
            .iter()
            .filter_map(|&index| stars.get(index))
            .map(|star| projector.project_star(star))
            .collect();

        if members.is_empty() {
            continue;
        }

        let n = members.len() as f64;
        let centroid_x = members.iter().map(|p| p.x).sum::<f64>() / n;
        let centroid_y = members.iter().map(|p| p.y).sum::<f64>() / n;
        let jitter = label_jitter(rng);

        layout.labels.push(ConstellationLabel {
            name: constellation.name.clone(),
            anchor: ProjectedPoint::new(centroid_x + jitter.dx, centroid_y + jitter.dy),
        });
    }

    layout
}
