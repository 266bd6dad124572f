//! Detector-derived unit conversions (wire index / time tick -> cm).

use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;
use crate::plane::WireReadout;

/// Detector model the calibration is derived from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorModel {
    /// Wire pitch of plane 0, used as the representative pitch for all planes.
    pub wire_pitch_cm: f64,
    /// TPC digitization period.
    pub sampling_rate_ns: f64,
    /// Electron drift velocity at the operating field and temperature.
    pub drift_velocity_cm_per_us: f64,
    #[serde(default)]
    pub readout: WireReadout,
}

impl DetectorModel {
    /// 0.3 cm pitch, 2 MHz digitization, 273 V/cm at 87 K.
    pub fn microboone() -> Self {
        Self {
            wire_pitch_cm: 0.3,
            sampling_rate_ns: 500.0,
            drift_velocity_cm_per_us: 0.1098,
            readout: WireReadout::microboone(),
        }
    }
}

impl Default for DetectorModel {
    fn default() -> Self {
        Self::microboone()
    }
}

/// Conversion factors from raw hit units into centimetres.
///
/// Built once per session and immutable afterwards; both factors are
/// guaranteed to be strictly positive, also when deserialized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CalibrationFactors")]
pub struct Calibration {
    wire_to_cm: f64,
    time_to_cm: f64,
}

#[derive(Deserialize)]
struct CalibrationFactors {
    wire_to_cm: f64,
    time_to_cm: f64,
}

impl TryFrom<CalibrationFactors> for Calibration {
    type Error = CalibrationError;

    fn try_from(raw: CalibrationFactors) -> Result<Self, Self::Error> {
        Calibration::new(raw.wire_to_cm, raw.time_to_cm)
    }
}

impl Calibration {
    pub fn new(wire_to_cm: f64, time_to_cm: f64) -> Result<Self, CalibrationError> {
        if wire_to_cm.is_nan() || wire_to_cm <= 0.0 {
            return Err(CalibrationError::NonPositiveWirePitch(wire_to_cm));
        }
        if time_to_cm.is_nan() || time_to_cm <= 0.0 {
            return Err(CalibrationError::NonPositiveTickDistance(time_to_cm));
        }
        Ok(Self {
            wire_to_cm,
            time_to_cm,
        })
    }

    /// Derive the factors from a detector model.
    ///
    /// cm per tick = tick period [us] * drift velocity [cm/us].
    pub fn from_detector(model: &DetectorModel) -> Result<Self, CalibrationError> {
        let time_to_cm = model.sampling_rate_ns / 1000.0 * model.drift_velocity_cm_per_us;
        let calib = Self::new(model.wire_pitch_cm, time_to_cm)?;
        log::debug!(
            "calibration: {:.4} cm/wire, {:.5} cm/tick",
            calib.wire_to_cm,
            calib.time_to_cm
        );
        Ok(calib)
    }

    #[inline]
    pub fn wire_to_cm(&self) -> f64 {
        self.wire_to_cm
    }

    #[inline]
    pub fn time_to_cm(&self) -> f64 {
        self.time_to_cm
    }

    #[inline]
    pub fn wire_cm(&self, wire: f64) -> f64 {
        wire * self.wire_to_cm
    }

    #[inline]
    pub fn time_cm(&self, ticks: f64) -> f64 {
        ticks * self.time_to_cm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derives_tick_distance_from_drift() {
        let calib = Calibration::from_detector(&DetectorModel::microboone()).expect("valid");
        assert_relative_eq!(calib.wire_to_cm(), 0.3);
        assert_relative_eq!(calib.time_to_cm(), 0.0549, max_relative = 1e-12);
    }

    #[test]
    fn rejects_non_positive_factors() {
        assert_eq!(
            Calibration::new(0.0, 0.05),
            Err(CalibrationError::NonPositiveWirePitch(0.0))
        );
        assert_eq!(
            Calibration::new(0.3, -0.05),
            Err(CalibrationError::NonPositiveTickDistance(-0.05))
        );
        assert!(Calibration::new(f64::NAN, 0.05).is_err());
    }

    #[test]
    fn rejects_model_without_drift() {
        let model = DetectorModel {
            drift_velocity_cm_per_us: 0.0,
            ..DetectorModel::microboone()
        };
        assert!(matches!(
            Calibration::from_detector(&model),
            Err(CalibrationError::NonPositiveTickDistance(_))
        ));
    }

    #[test]
    fn deserialization_validates_factors() {
        let calib: Calibration =
            serde_json::from_str(r#"{"wire_to_cm": 0.3, "time_to_cm": 0.05}"#).expect("valid");
        assert_eq!(calib, Calibration::new(0.3, 0.05).expect("valid"));

        let err = serde_json::from_str::<Calibration>(r#"{"wire_to_cm": 0.3, "time_to_cm": 0.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("distance per tick"));
    }

    #[test]
    fn conversions_are_reproducible() {
        let calib = Calibration::new(0.3, 0.05).expect("valid");
        let first = calib.wire_cm(40.0);
        for _ in 0..10 {
            assert_eq!(calib.wire_cm(40.0), first);
        }
        assert_eq!(first, 40.0 * 0.3);
    }
}
