//! Polar re-expression of wire-plane hits around the vertex anchor.

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::calibration::Calibration;
use crate::error::ClusterError;
use crate::plane::Plane;
use crate::vertex::VertexAnchors;

/// Calibration constant: shift applied to `atan2` output so angles land in [0, 360).
///
/// The seam of the angular domain sits at 0/360 deg, i.e. for hits directly
/// "behind" the anchor along -wire.
pub const ANGLE_OFFSET_DEG: f64 = 180.0;

/// Angle assigned to a hit that coincides with its anchor.
pub const DEGENERATE_ANGLE_DEG: f64 = 0.0;

/// A reconstructed hit on one wire plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Raw plane id; validated against [`Plane`] when the hit is converted.
    pub plane: u8,
    pub wire: u32,
    /// Peak time in TPC ticks.
    pub peak_time: f64,
    /// Integrated charge.
    pub integral: f64,
    /// Caller-side index of the hit, carried through untouched.
    pub key: usize,
}

/// A hit in polar coordinates around its plane's vertex anchor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// Distance to the anchor, cm.
    pub radius: f64,
    /// Direction from the anchor, degrees in [0, 360).
    pub angle_deg: f64,
    pub wire_cm: f64,
    pub time_cm: f64,
    pub charge: f64,
    pub plane: Plane,
    pub hit_key: usize,
}

/// Polar angle of `(d_wire, d_time)` with the [`ANGLE_OFFSET_DEG`] shift.
///
/// Returns [`DEGENERATE_ANGLE_DEG`] for the zero vector.
pub fn polar_angle_deg(d_wire: f64, d_time: f64) -> f64 {
    if d_wire == 0.0 && d_time == 0.0 {
        return DEGENERATE_ANGLE_DEG;
    }
    // atan2 yields [-180, 180]; both ends map onto 0.
    (d_time.atan2(d_wire).to_degrees() + ANGLE_OFFSET_DEG).rem_euclid(360.0)
}

impl PolarPoint {
    /// Convert one hit. Fails if the hit's plane id is unknown.
    pub fn from_hit(
        hit: &Hit,
        calibration: &Calibration,
        anchors: &VertexAnchors,
    ) -> Result<Self, ClusterError> {
        let plane = Plane::from_id(hit.plane).ok_or(ClusterError::InvalidPlaneId {
            plane: hit.plane,
            hit_key: hit.key,
        })?;
        let anchor = anchors.get(plane);

        let wire_cm = calibration.wire_cm(hit.wire as f64);
        let time_cm = calibration.time_cm(hit.peak_time);
        let dw = wire_cm - anchor.wire_cm;
        let dt = time_cm - anchor.time_cm;

        Ok(Self {
            radius: dw.hypot(dt),
            angle_deg: polar_angle_deg(dw, dt),
            wire_cm,
            time_cm,
            charge: hit.integral,
            plane,
            hit_key: hit.key,
        })
    }
}

/// Convert `hits` into polar points, preserving order.
///
/// The first hit with an unknown plane id aborts the whole call.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(calibration, anchors, hits), fields(num_hits = hits.len()))
)]
pub fn build_points(
    calibration: &Calibration,
    anchors: &VertexAnchors,
    hits: &[Hit],
) -> Result<Vec<PolarPoint>, ClusterError> {
    hits.iter()
        .map(|hit| PolarPoint::from_hit(hit, calibration, anchors))
        .collect()
}
