//! Projection of the interaction vertex onto each wire plane.
//!
//! The per-plane projection ("anchor") is the origin of the polar
//! coordinates built in [`crate::point`].

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::plane::{Plane, PlaneGeometry, WireReadout, NUM_PLANES};

/// Calibration constant: shift of the anchor along the wire axis, so that hits
/// sitting on a wire boundary do not coincide with the anchor.
pub const WIRE_ANCHOR_OFFSET_CM: f64 = 0.15;

/// Calibration constant: per-plane drift-time skew, multiplied by the plane index.
pub const PLANE_TIME_SKEW_CM: f64 = 0.3;

/// Vertex projection on a single plane, in cm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexAnchor {
    pub wire_cm: f64,
    pub time_cm: f64,
}

/// One anchor per plane, indexed by [`Plane`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexAnchors {
    pub anchors: [VertexAnchor; NUM_PLANES],
}

impl VertexAnchors {
    #[inline]
    pub fn get(&self, plane: Plane) -> &VertexAnchor {
        &self.anchors[plane.index()]
    }
}

/// Why a vertex could not be loaded.
///
/// Both cases are handled the same way by callers; they are kept apart only
/// so logs can tell them apart.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLoadError {
    #[error("no vertex candidates")]
    NoCandidates,
    #[error("ambiguous vertex: {count} candidates")]
    Ambiguous { count: usize },
}

/// Computes and caches per-plane vertex anchors.
///
/// One projector belongs to one processing unit at a time. The calibration is
/// `Copy` and can be shared freely between projectors.
#[derive(Clone, Debug)]
pub struct VertexProjector<G = WireReadout> {
    calibration: Calibration,
    geometry: G,
    anchors: Option<VertexAnchors>,
    valid: bool,
}

impl<G: PlaneGeometry> VertexProjector<G> {
    pub fn new(calibration: Calibration, geometry: G) -> Self {
        Self {
            calibration,
            geometry,
            anchors: None,
            valid: false,
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Anchors from the last successful load, or `None` if the most recent
    /// load failed or none has happened yet.
    pub fn anchors(&self) -> Option<&VertexAnchors> {
        self.anchors.as_ref().filter(|_| self.valid)
    }

    /// Project the single vertex candidate onto every plane.
    ///
    /// Exactly one candidate is required. On failure the previously computed
    /// anchors are kept in memory but [`anchors`](Self::anchors) stops
    /// returning them.
    pub fn load_vertex(
        &mut self,
        candidates: &[Point3<f64>],
        trigger_offset_ticks: f64,
    ) -> Result<&VertexAnchors, VertexLoadError> {
        let vtx = match candidates {
            [vtx] => vtx,
            [] => return self.fail(VertexLoadError::NoCandidates),
            _ => {
                return self.fail(VertexLoadError::Ambiguous {
                    count: candidates.len(),
                })
            }
        };

        let trigger_offset_cm = self.calibration.time_cm(trigger_offset_ticks);
        log::debug!("trigger offset [cm]: {trigger_offset_cm:.4}");

        let anchors = Plane::ALL.map(|plane| {
            let wire = self.geometry.wire_coordinate(plane, vtx);
            let anchor = VertexAnchor {
                wire_cm: self.calibration.wire_cm(wire) + WIRE_ANCHOR_OFFSET_CM,
                time_cm: vtx.x + trigger_offset_cm + plane.index() as f64 * PLANE_TIME_SKEW_CM,
            };
            log::debug!(
                "vertex @ {:?} [{:.3}, {:.3}]",
                plane,
                anchor.wire_cm,
                anchor.time_cm
            );
            anchor
        });

        self.valid = true;
        Ok(&*self.anchors.insert(VertexAnchors { anchors }))
    }

    fn fail(&mut self, err: VertexLoadError) -> Result<&VertexAnchors, VertexLoadError> {
        log::warn!("vertex load failed: {err}");
        self.valid = false;
        Err(err)
    }
}
