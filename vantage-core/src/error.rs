/// Error types for camera construction and matrix computation

/// Result type for camera operations
pub type Result<T> = std::result::Result<T, CameraError>;

/// Everything that can go wrong while building or evaluating a camera.
///
/// Configuration errors are raised at construction or by a setter, domain
/// errors at the point of matrix computation, and index errors immediately on
/// assignment of the frame index.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("Shape mismatch for `{field}`: expected {expected} frames, got {actual}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Frame sequence `{field}` must contain at least one entry")]
    EmptySequence { field: &'static str },

    #[error("Field of view must lie in (0, 180) degrees, got {0}")]
    InvalidFov(f32),

    #[error("Invalid clip planes: near={near}, far={far}")]
    InvalidClipPlanes { near: f32, far: f32 },

    #[error("Scale must be strictly positive, got ({sx}, {sy}) at frame {frame}")]
    InvalidScale { sx: f32, sy: f32, frame: usize },

    #[error("Magnification must be strictly positive, got x_mag={x_mag}, y_mag={y_mag}")]
    InvalidMagnification { x_mag: f32, y_mag: f32 },

    #[error("`{field}` has a non-finite value at frame {frame}")]
    NonFinite { field: &'static str, frame: usize },

    #[error("The {matrix} matrix has non-finite entries")]
    NonFiniteMatrix { matrix: &'static str },

    #[error("Forward direction is degenerate (zero length or parallel to the up vector)")]
    DegenerateForward,

    #[error("Viewport dimensions must be non-zero, got {width}x{height}")]
    ZeroViewport { width: u32, height: u32 },

    #[error("Sensor dimensions must be non-zero, got {cols}x{rows}")]
    ZeroSensor { cols: u32, rows: u32 },

    #[error("Frame index {index} is out of range for {n_frames} frames")]
    FrameOutOfRange { index: i64, n_frames: usize },

    #[error("Conversion is only defined for {expected} cameras, this is a {actual} camera")]
    UnsupportedConversion {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Parameter `{0}` does not apply to this kind of camera")]
    NotApplicable(&'static str),
}

impl CameraError {
    /// Whether this error stems from malformed camera parameters
    /// rather than from the state it is evaluated in.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CameraError::ShapeMismatch { .. }
                | CameraError::EmptySequence { .. }
                | CameraError::InvalidFov(_)
                | CameraError::InvalidClipPlanes { .. }
                | CameraError::InvalidScale { .. }
                | CameraError::InvalidMagnification { .. }
                | CameraError::NonFinite { .. }
                | CameraError::NotApplicable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CameraError::FrameOutOfRange { index: -1, n_frames: 3 };
        assert_eq!(err.to_string(), "Frame index -1 is out of range for 3 frames");

        let err = CameraError::ShapeMismatch {
            field: "targets",
            expected: 4,
            actual: 2,
        };
        assert!(err.to_string().contains("targets"));
    }

    #[test]
    fn test_error_classification() {
        assert!(CameraError::InvalidFov(0.0).is_configuration());
        assert!(CameraError::NonFinite { field: "targets", frame: 0 }.is_configuration());
        assert!(!CameraError::DegenerateForward.is_configuration());
        assert!(!CameraError::NonFiniteMatrix { matrix: "projection" }.is_configuration());
        assert!(!CameraError::ZeroViewport { width: 0, height: 10 }.is_configuration());
    }
}
