/// World-to-camera view matrices
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::Result;
use crate::pose::{normalize, orthonormal_basis, Pose};
use crate::projection::check_finite_matrix;

/// Build a look-at view matrix from an eye position, a forward direction and
/// an up hint.
///
/// `forward` is a direction, not a target point. Neither `forward` nor `up`
/// has to be normalized, and `up` does not have to be orthogonal to
/// `forward`: the basis is re-derived so the rotation block is orthonormal.
pub fn look_at(eye: &Point3<f32>, forward: &Vector3<f32>, up: &Vector3<f32>) -> Result<Matrix4<f32>> {
    let forward = normalize(*forward)?;
    let (right, up) = orthonormal_basis(&forward, up)?;
    let eye = eye.coords;

    #[rustfmt::skip]
    let view = Matrix4::new(
        right.x,    right.y,    right.z,    -right.dot(&eye),
        up.x,       up.y,       up.z,       -up.dot(&eye),
        -forward.x, -forward.y, -forward.z, forward.dot(&eye),
        0.0,        0.0,        0.0,        1.0,
    );
    check_finite_matrix("view", view)
}

/// View matrix of a resolved pose.
pub fn build_view(pose: &Pose) -> Result<Matrix4<f32>> {
    look_at(&pose.position, pose.forward.as_ref(), pose.up.as_ref())
}

/// Combined view-projection matrix (`projection * view`).
pub fn view_projection(projection: &Matrix4<f32>, view: &Matrix4<f32>) -> Matrix4<f32> {
    projection * view
}
