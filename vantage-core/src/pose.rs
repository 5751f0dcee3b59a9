/// Camera pose: position plus an orthonormal forward/up/right basis
use nalgebra::{Point3, Unit, Vector3};

use crate::error::{CameraError, Result};

/// Fixed world up direction used to resolve the camera basis.
pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Vectors shorter than this are treated as zero when normalizing.
pub(crate) const DEGENERATE_EPSILON: f32 = 1e-6;

/// A resolved camera pose for a single frame.
///
/// The basis is orthonormal with `right = forward × up_ref` and
/// `up = right × forward`, so that `(right, up, -forward)` forms a right-handed
/// frame. Poses are derived on demand and never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub forward: Unit<Vector3<f32>>,
    pub up: Unit<Vector3<f32>>,
    pub right: Unit<Vector3<f32>>,
}

impl Pose {
    /// Pose of a camera at `position` looking at `target`.
    pub fn look_at(position: Point3<f32>, target: Point3<f32>) -> Result<Self> {
        let forward = normalize(target - position)?;
        let (right, up) = orthonormal_basis(&forward, &WORLD_UP)?;
        log::trace!(
            "resolved pose at {:?}: forward={:?} up={:?}",
            position,
            forward.as_ref(),
            up.as_ref()
        );
        Ok(Self {
            position,
            forward,
            up,
            right,
        })
    }

    /// The fixed pose shared by orthographic and weak-perspective cameras:
    /// looking down -Z from (0, 0, 1).
    pub fn axis_aligned() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1.0),
            forward: Unit::new_unchecked(Vector3::new(0.0, 0.0, -1.0)),
            up: Unit::new_unchecked(Vector3::new(0.0, 1.0, 0.0)),
            right: Unit::new_unchecked(Vector3::new(1.0, 0.0, 0.0)),
        }
    }
}

/// Normalize `v`, refusing vectors too short to carry a direction.
pub(crate) fn normalize(v: Vector3<f32>) -> Result<Unit<Vector3<f32>>> {
    let unit = Unit::try_new(v, DEGENERATE_EPSILON).ok_or(CameraError::DegenerateForward)?;
    // An overflowing norm leaves a zero or NaN vector behind
    if (unit.norm() - 1.0).abs() <= 1e-3 {
        Ok(unit)
    } else {
        Err(CameraError::DegenerateForward)
    }
}

/// Derive `(right, up)` from a forward direction and an up hint.
///
/// The hint only has to be non-parallel to `forward`; the returned up is
/// re-orthogonalized against it.
pub(crate) fn orthonormal_basis(
    forward: &Unit<Vector3<f32>>,
    up_hint: &Vector3<f32>,
) -> Result<(Unit<Vector3<f32>>, Unit<Vector3<f32>>)> {
    let right = normalize(forward.cross(up_hint))?;
    let up = Unit::new_normalize(right.cross(forward.as_ref()));
    Ok((right, up))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_look_at_down_negative_z() {
        let pose = Pose::look_at(Point3::new(0.0, 0.0, 5.0), Point3::origin()).unwrap();
        assert_relative_eq!(pose.forward.into_inner(), Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(pose.up.into_inner(), Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(pose.right.into_inner(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_look_at_orthonormal() {
        let pose = Pose::look_at(Point3::new(3.0, 2.0, -4.0), Point3::new(-1.0, 0.5, 2.0)).unwrap();
        assert_relative_eq!(pose.forward.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(pose.up.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(pose.right.norm(), 1.0, epsilon = 1e-5);
        assert!(pose.forward.dot(pose.up.as_ref()).abs() < 1e-5);
        assert!(pose.forward.dot(pose.right.as_ref()).abs() < 1e-5);
        assert!(pose.up.dot(pose.right.as_ref()).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_same_point_is_degenerate() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Pose::look_at(p, p).unwrap_err(), CameraError::DegenerateForward);
    }

    #[test]
    fn test_look_at_straight_up_is_degenerate() {
        let result = Pose::look_at(Point3::origin(), Point3::new(0.0, 10.0, 0.0));
        assert_eq!(result.unwrap_err(), CameraError::DegenerateForward);
    }

    #[test]
    fn test_look_at_overflowing_direction_is_degenerate() {
        let far_away = Point3::new(1e20, 1e20, 0.0);
        assert_eq!(
            Pose::look_at(Point3::origin(), far_away).unwrap_err(),
            CameraError::DegenerateForward
        );
        let across = Pose::look_at(Point3::new(-3e38, 0.0, 0.0), Point3::new(3e38, 1.0, 0.0));
        assert_eq!(across.unwrap_err(), CameraError::DegenerateForward);
    }

    #[test]
    fn test_axis_aligned() {
        let pose = Pose::axis_aligned();
        let resolved = Pose::look_at(pose.position, Point3::origin()).unwrap();
        assert_relative_eq!(resolved.right.into_inner(), pose.right.into_inner());

        assert_eq!(pose.position, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(pose.forward.into_inner(), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(pose.up.into_inner(), Vector3::y());
        assert_eq!(pose.right.into_inner(), Vector3::x());
    }
}
