//! Polar-coordinate view of wire-plane hits around a reconstructed vertex.
//!
//! Each hit (wire, peak time, charge) is converted to centimetres with a
//! [`Calibration`] and expressed as a radius/angle pair relative to the
//! vertex projection on its plane. Clustering and merging happen downstream;
//! this crate only prepares their input.
//!
//! ```
//! use nalgebra::Point3;
//! use polar_hits::{Calibration, ClusterMaker, Hit, WireReadout};
//!
//! let calib = Calibration::new(0.3, 0.05).unwrap();
//! let mut maker = ClusterMaker::new(calib, WireReadout::microboone());
//! let hits = vec![Hit { plane: 2, wire: 340, peak_time: 200.0, integral: 12.0, key: 0 }];
//! let clusters = maker
//!     .make_clusters(&[Point3::new(10.0, 0.0, 100.0)], 0.0, &[hits])
//!     .unwrap();
//! assert_eq!(clusters[0].len(), 1);
//! ```

mod calibration;
mod cluster;
mod error;
mod io;
mod logger;
mod plane;
mod point;
mod vertex;

pub use calibration::{Calibration, DetectorModel};
pub use cluster::{ClusterMaker, ClusterRecord};
pub use error::{CalibrationError, ClusterError, LoggerError};
pub use io::{ClusterReport, EventInput, IoError, RunError};
pub use plane::{Plane, PlaneGeometry, WirePlane, WireReadout, NUM_PLANES};
pub use point::{
    build_points, polar_angle_deg, Hit, PolarPoint, ANGLE_OFFSET_DEG, DEGENERATE_ANGLE_DEG,
};
pub use vertex::{
    VertexAnchor, VertexAnchors, VertexLoadError, VertexProjector, PLANE_TIME_SKEW_CM,
    WIRE_ANCHOR_OFFSET_CM,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init, LogFilter};
