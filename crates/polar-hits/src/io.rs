//! JSON event input and cluster report helpers.

use std::{fs, path::Path};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::calibration::{Calibration, DetectorModel};
use crate::cluster::{ClusterMaker, ClusterRecord};
use crate::error::{CalibrationError, ClusterError};
use crate::plane::WireReadout;
use crate::point::Hit;
use crate::vertex::VertexAnchors;

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Everything needed to build the clusters of one processing unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub detector: DetectorModel,
    /// Vertex candidates as `[x, y, z]` in cm.
    #[serde(default)]
    pub vertices: Vec<[f64; 3]>,
    #[serde(default)]
    pub trigger_offset_ticks: f64,
    /// One hit list per input cluster.
    pub clusters: Vec<Vec<Hit>>,
}

/// Output of one processing unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub calibration: Calibration,
    /// `None` when the vertex could not be loaded.
    pub anchors: Option<VertexAnchors>,
    pub clusters: Vec<ClusterRecord>,
}

/// Failure of [`EventInput::run`].
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

impl EventInput {
    /// Load an event from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn vertex_candidates(&self) -> Vec<Point3<f64>> {
        self.vertices
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect()
    }

    /// Calibrate from the embedded detector model and build all clusters.
    pub fn run(&self) -> Result<ClusterReport, RunError> {
        let calibration = Calibration::from_detector(&self.detector)?;
        let mut maker: ClusterMaker<WireReadout> =
            ClusterMaker::new(calibration, self.detector.readout);
        let clusters = maker.make_clusters(
            &self.vertex_candidates(),
            self.trigger_offset_ticks,
            &self.clusters,
        )?;
        Ok(ClusterReport {
            calibration,
            anchors: maker.projector().anchors().copied(),
            clusters,
        })
    }
}

impl ClusterReport {
    /// Load a report previously written with [`write_json`](Self::write_json).
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
