//! Fixed-radius marker clustering in screen space.
//!
//! Purely visual: nearby markers collapse into a count badge, the
//! underlying entities are untouched. Applied to the VC and startup
//! layers independently.

use bevy::prelude::*;
use smallvec::SmallVec;

/// Screen-space grouping radius in pixels.
pub const CLUSTER_RADIUS: f32 = 42.0;

/// A group of markers rendered as one symbol. Anchored at the first
/// member's position so output is deterministic for a given input order.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub anchor: egui::Pos2,
    pub members: SmallVec<[Entity; 4]>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// Greedy grouping: each marker joins the first cluster whose anchor lies
/// within the radius, otherwise it seeds a new one. Markers are visited
/// in the order given (source order).
pub fn cluster_markers(markers: &[(Entity, egui::Pos2)], radius: f32) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for &(entity, pos) in markers {
        match clusters
            .iter_mut()
            .find(|cluster| cluster.anchor.distance(pos) <= radius)
        {
            Some(cluster) => cluster.members.push(entity),
            None => clusters.push(Cluster {
                anchor: pos,
                members: SmallVec::from_slice(&[entity]),
            }),
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers_at(positions: &[(f32, f32)]) -> Vec<(Entity, egui::Pos2)> {
        let mut world = World::new();
        positions
            .iter()
            .map(|&(x, y)| (world.spawn_empty().id(), egui::pos2(x, y)))
            .collect()
    }

    #[test]
    fn nearby_markers_share_a_cluster() {
        let markers = markers_at(&[(100.0, 100.0), (110.0, 105.0)]);
        let clusters = cluster_markers(&markers, CLUSTER_RADIUS);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[0].anchor, egui::pos2(100.0, 100.0));
    }

    #[test]
    fn distant_markers_stay_apart() {
        let markers = markers_at(&[(0.0, 0.0), (500.0, 0.0)]);
        let clusters = cluster_markers(&markers, CLUSTER_RADIUS);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(Cluster::is_singleton));
    }

    #[test]
    fn membership_uses_the_anchor_not_the_latest_member() {
        // Three markers in a chain; the third is near the second but not
        // the anchor, so it opens its own cluster.
        let markers = markers_at(&[(0.0, 0.0), (40.0, 0.0), (80.0, 0.0)]);
        let clusters = cluster_markers(&markers, CLUSTER_RADIUS);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[1].len(), 1);
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        assert!(cluster_markers(&[], CLUSTER_RADIUS).is_empty());
    }
}
