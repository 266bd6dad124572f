//! Wire-plane identities and the 3D -> wire-coordinate projection.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Number of readout planes. Hardware constant.
pub const NUM_PLANES: usize = 3;

/// One of the three wire-plane views of the TPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plane {
    U,
    V,
    Y,
}

impl Plane {
    pub const ALL: [Plane; NUM_PLANES] = [Plane::U, Plane::V, Plane::Y];

    /// Map a raw plane id (as stored on a hit) to a plane, if it is known.
    #[inline]
    pub fn from_id(id: u8) -> Option<Plane> {
        Self::ALL.get(id as usize).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Projects a 3D point onto a plane's wire axis.
///
/// The result is in (fractional) wire-index units.
pub trait PlaneGeometry {
    fn wire_coordinate(&self, plane: Plane, point: &Point3<f64>) -> f64;
}

/// Orientation of a single wire plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WirePlane {
    /// Angle of the wire-normal direction in the (z, y) plane, measured from +z.
    pub wire_angle_deg: f64,
    /// Spacing between adjacent wires.
    pub pitch_cm: f64,
    /// Position of wire 0 along the wire-normal direction.
    pub offset_cm: f64,
}

impl WirePlane {
    /// Fractional wire index closest to `point`. The drift (x) coordinate is ignored.
    pub fn wire_coordinate(&self, point: &Point3<f64>) -> f64 {
        let (sin_a, cos_a) = self.wire_angle_deg.to_radians().sin_cos();
        (point.z * cos_a - point.y * sin_a - self.offset_cm) / self.pitch_cm
    }
}

/// Planar wire readout: one [`WirePlane`] per view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireReadout {
    pub planes: [WirePlane; NUM_PLANES],
}

impl WireReadout {
    /// Three-plane readout with ±60° induction planes and a vertical collection plane.
    pub fn microboone() -> Self {
        Self {
            planes: [
                WirePlane {
                    wire_angle_deg: 60.0,
                    pitch_cm: 0.3,
                    offset_cm: -100.5,
                },
                WirePlane {
                    wire_angle_deg: -60.0,
                    pitch_cm: 0.3,
                    offset_cm: -100.5,
                },
                WirePlane {
                    wire_angle_deg: 0.0,
                    pitch_cm: 0.3,
                    offset_cm: 0.0,
                },
            ],
        }
    }

    pub fn plane(&self, plane: Plane) -> &WirePlane {
        &self.planes[plane.index()]
    }
}

impl Default for WireReadout {
    fn default() -> Self {
        Self::microboone()
    }
}

impl PlaneGeometry for WireReadout {
    fn wire_coordinate(&self, plane: Plane, point: &Point3<f64>) -> f64 {
        self.plane(plane).wire_coordinate(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn plane_ids_round_trip_and_reject_unknown() {
        for (i, plane) in Plane::ALL.iter().enumerate() {
            assert_eq!(Plane::from_id(i as u8), Some(*plane));
            assert_eq!(plane.index(), i);
        }
        assert_eq!(Plane::from_id(3), None);
        assert_eq!(Plane::from_id(u8::MAX), None);
    }

    #[test]
    fn collection_plane_counts_wires_along_z() {
        let readout = WireReadout::microboone();
        let p = Point3::new(128.0, -40.0, 300.0);
        assert_abs_diff_eq!(readout.wire_coordinate(Plane::Y, &p), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn induction_planes_are_mirror_images_in_y() {
        let readout = WireReadout::microboone();
        let p = Point3::new(10.0, 25.0, 500.0);
        let mirrored = Point3::new(10.0, -25.0, 500.0);
        assert_abs_diff_eq!(
            readout.wire_coordinate(Plane::U, &p),
            readout.wire_coordinate(Plane::V, &mirrored),
            epsilon = 1e-9
        );
    }

    #[test]
    fn drift_coordinate_does_not_change_wire() {
        let readout = WireReadout::microboone();
        let a = Point3::new(0.0, 12.0, 80.0);
        let b = Point3::new(200.0, 12.0, 80.0);
        for plane in Plane::ALL {
            assert_eq!(
                readout.wire_coordinate(plane, &a),
                readout.wire_coordinate(plane, &b)
            );
        }
    }
}
