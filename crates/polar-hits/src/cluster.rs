//! Assembly of polar clusters from pre-grouped hits.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::calibration::Calibration;
use crate::error::ClusterError;
use crate::plane::{PlaneGeometry, WireReadout};
use crate::point::{build_points, Hit, PolarPoint};
use crate::vertex::{VertexAnchors, VertexLoadError, VertexProjector};

/// One input cluster re-expressed in polar coordinates.
///
/// Point order follows the hit order the cluster was built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    points: Vec<PolarPoint>,
}

impl ClusterRecord {
    pub fn new(points: Vec<PolarPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PolarPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Builds [`ClusterRecord`]s for one processing unit at a time.
///
/// Load the event vertex with [`load_vertex`](Self::load_vertex), then build
/// clusters; or call [`make_clusters`](Self::make_clusters) to do both.
#[derive(Clone, Debug)]
pub struct ClusterMaker<G = WireReadout> {
    projector: VertexProjector<G>,
}

impl<G: PlaneGeometry> ClusterMaker<G> {
    pub fn new(calibration: Calibration, geometry: G) -> Self {
        Self {
            projector: VertexProjector::new(calibration, geometry),
        }
    }

    pub fn calibration(&self) -> &Calibration {
        self.projector.calibration()
    }

    pub fn projector(&self) -> &VertexProjector<G> {
        &self.projector
    }

    /// See [`VertexProjector::load_vertex`].
    pub fn load_vertex(
        &mut self,
        candidates: &[Point3<f64>],
        trigger_offset_ticks: f64,
    ) -> Result<&VertexAnchors, VertexLoadError> {
        self.projector.load_vertex(candidates, trigger_offset_ticks)
    }

    fn anchors(&self) -> Result<&VertexAnchors, ClusterError> {
        self.projector
            .anchors()
            .ok_or(ClusterError::UninitializedAnchor)
    }

    /// Convert hits against the currently loaded anchors.
    pub fn build_points(&self, hits: &[Hit]) -> Result<Vec<PolarPoint>, ClusterError> {
        build_points(self.calibration(), self.anchors()?, hits)
    }

    pub fn build_cluster(&self, hits: &[Hit]) -> Result<ClusterRecord, ClusterError> {
        self.build_points(hits).map(ClusterRecord::new)
    }

    /// Build one cluster per hit group, in group order.
    ///
    /// A hit with an unknown plane id in any group fails the whole call: no
    /// clusters are returned, including those of otherwise valid groups.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, groups), fields(num_groups = groups.len()))
    )]
    pub fn build_clusters<H: AsRef<[Hit]>>(
        &self,
        groups: &[H],
    ) -> Result<Vec<ClusterRecord>, ClusterError> {
        let anchors = self.anchors()?;
        let calibration = self.calibration();
        let clusters = groups
            .iter()
            .map(|hits| build_points(calibration, anchors, hits.as_ref()).map(ClusterRecord::new))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("built {} clusters", clusters.len());
        Ok(clusters)
    }

    /// Load the vertex and build all clusters of one processing unit.
    ///
    /// Without exactly one vertex candidate, the unit is skipped: a warning
    /// is logged and no clusters are returned.
    ///
    /// A single hit with an unknown plane id fails the whole unit with
    /// [`ClusterError::InvalidPlaneId`]; valid groups of the same unit are
    /// discarded too.
    pub fn make_clusters<H: AsRef<[Hit]>>(
        &mut self,
        candidates: &[Point3<f64>],
        trigger_offset_ticks: f64,
        groups: &[H],
    ) -> Result<Vec<ClusterRecord>, ClusterError> {
        if let Err(err) = self.load_vertex(candidates, trigger_offset_ticks) {
            log::warn!("no vertex ({err}), skipping {} clusters", groups.len());
            return Ok(Vec::new());
        }
        self.build_clusters(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::Plane;

    fn maker() -> ClusterMaker {
        ClusterMaker::new(
            Calibration::new(0.3, 0.05).expect("valid"),
            WireReadout::microboone(),
        )
    }

    fn hits(plane: u8, wires: &[u32]) -> Vec<Hit> {
        wires
            .iter()
            .enumerate()
            .map(|(key, &wire)| Hit {
                plane,
                wire,
                peak_time: 1000.0 + key as f64,
                integral: 1.0,
                key,
            })
            .collect()
    }

    #[test]
    fn building_before_vertex_load_is_rejected() {
        let m = maker();
        assert_eq!(
            m.build_cluster(&hits(0, &[1, 2])),
            Err(ClusterError::UninitializedAnchor)
        );
        assert_eq!(
            m.build_clusters(&[hits(0, &[1])]),
            Err(ClusterError::UninitializedAnchor)
        );
    }

    #[test]
    fn clusters_follow_group_order() {
        let mut m = maker();
        let groups = vec![hits(0, &[10, 11, 12]), hits(2, &[400]), Vec::new()];
        let clusters = m
            .make_clusters(&[Point3::new(30.0, 0.0, 100.0)], 0.0, &groups)
            .expect("valid");

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[1].points()[0].plane, Plane::Y);
        assert!(clusters[2].is_empty());
    }

    #[test]
    fn missing_or_ambiguous_vertex_yields_no_clusters() {
        let mut m = maker();
        let groups = [hits(0, &[10, 11])];
        let none = m.make_clusters(&[], 0.0, &groups).expect("skipped");
        assert!(none.is_empty());

        let two = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
        let ambiguous = m.make_clusters(&two, 0.0, &groups).expect("skipped");
        assert!(ambiguous.is_empty());
    }

    #[test]
    fn stale_anchors_are_not_reused() {
        let mut m = maker();
        let groups = [hits(1, &[5])];
        m.make_clusters(&[Point3::new(0.0, 0.0, 50.0)], 0.0, &groups)
            .expect("first unit");
        assert!(m.make_clusters(&[], 0.0, &groups).expect("skipped").is_empty());
        assert_eq!(
            m.build_clusters(&groups),
            Err(ClusterError::UninitializedAnchor)
        );
    }

    #[test]
    fn single_cluster_matches_batch() {
        let mut m = maker();
        m.load_vertex(&[Point3::new(12.0, 3.0, 45.0)], 3200.0)
            .expect("load");
        let group = hits(2, &[140, 150, 160]);
        let single = m.build_cluster(&group).expect("valid");
        let batch = m.build_clusters(std::slice::from_ref(&group)).expect("valid");
        assert_eq!(batch, vec![single]);
    }

    #[test]
    fn invalid_plane_fails_the_unit() {
        let mut m = maker();
        let groups = [hits(0, &[1]), hits(7, &[2])];
        let err = m
            .make_clusters(&[Point3::new(0.0, 0.0, 0.0)], 0.0, &groups)
            .unwrap_err();
        assert_eq!(err, ClusterError::InvalidPlaneId { plane: 7, hit_key: 0 });

        // the valid group alone builds fine; it is lost only together with the bad one
        assert_eq!(m.build_clusters(&groups[..1]).expect("valid").len(), 1);
        assert_eq!(
            m.build_clusters(&groups),
            Err(ClusterError::InvalidPlaneId { plane: 7, hit_key: 0 })
        );
    }
}
