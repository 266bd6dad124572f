/// Invalid calibration constants. Fatal for the session that requested them.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    #[error("wire pitch must be > 0 (got {0} cm)")]
    NonPositiveWirePitch(f64),
    #[error("distance per tick must be > 0 (got {0} cm)")]
    NonPositiveTickDistance(f64),
}

/// Errors raised while turning hits into polar points.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterError {
    #[error("vertex anchors are not loaded")]
    UninitializedAnchor,
    #[error("hit {hit_key} references unknown plane {plane}")]
    InvalidPlaneId { plane: u8, hit_key: usize },
}

/// Logger setup failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoggerError {
    #[error("invalid log filter `{0}`")]
    InvalidDirective(String),
    #[error("a global logger is already installed")]
    AlreadyInstalled,
}
