/// Projection matrices for perspective, orthographic and weak-perspective cameras
///
/// All matrices map right-handed camera space (looking down -Z) to OpenGL
/// clip space with depth in [-1, 1]. They are `nalgebra` matrices: stored
/// column-major, indexed as `m[(row, col)]`, and applied to column vectors,
/// so a world point reaches clip space as `projection * view * p`.
use nalgebra::{Matrix4, Vector2};

use crate::error::{CameraError, Result};

/// Size of the render target in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CameraError::ZeroViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Pixel dimensions of the camera sensor (image columns and rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensor {
    cols: u32,
    rows: u32,
}

impl Sensor {
    pub fn new(cols: u32, rows: u32) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(CameraError::ZeroSensor { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn aspect(&self) -> f32 {
        self.cols as f32 / self.rows as f32
    }
}

/// Optics of a single frame, tagged by camera kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Symmetric frustum with a vertical field of view in radians.
    Perspective { fov_y: f32, near: f32, far: f32 },
    /// Orthographic box with half-extents `x_mag` and `y_mag`.
    Orthographic {
        x_mag: f32,
        y_mag: f32,
        near: f32,
        far: f32,
    },
    /// Scaled orthographic projection with a per-frame scale and translation.
    WeakPerspective {
        scale: Vector2<f32>,
        translation: Vector2<f32>,
        sensor: Sensor,
        near: f32,
        far: f32,
    },
}

impl Projection {
    pub fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { near, .. }
            | Projection::Orthographic { near, .. }
            | Projection::WeakPerspective { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { far, .. }
            | Projection::Orthographic { far, .. }
            | Projection::WeakPerspective { far, .. } => far,
        }
    }
}

/// Build the projection matrix of `projection` for the given viewport.
///
/// Large but finite parameters can still overflow a matrix entry; that is
/// reported as [`CameraError::NonFiniteMatrix`].
pub fn build_projection(projection: &Projection, viewport: Viewport) -> Result<Matrix4<f32>> {
    let m = match *projection {
        Projection::Perspective { fov_y, near, far } => {
            check_fov(fov_y.to_degrees())?;
            check_perspective_planes(near, far)?;
            perspective(fov_y, viewport.aspect(), near, far)
        }
        Projection::Orthographic {
            x_mag,
            y_mag,
            near,
            far,
        } => {
            check_magnification(x_mag, y_mag)?;
            check_parallel_planes(near, far)?;
            orthographic(x_mag, y_mag, near, far)
        }
        Projection::WeakPerspective {
            scale,
            translation,
            sensor,
            near,
            far,
        } => {
            check_scale(scale, 0)?;
            check_parallel_planes(near, far)?;
            let ar = sensor.aspect() / viewport.aspect();
            weak_perspective(scale, translation, ar, near, far)
        }
    };
    check_finite_matrix("projection", m)
}

/// Perspective projection from a vertical field of view in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let f = 1.0 / (fov_y / 2.0).tan();
    let depth = near - far;

    #[rustfmt::skip]
    let m = Matrix4::new(
        f / aspect, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, (far + near) / depth, 2.0 * far * near / depth,
        0.0, 0.0, -1.0, 0.0,
    );
    m
}

/// Orthographic projection of the box `[-x_mag, x_mag] x [-y_mag, y_mag] x [-far, -near]`.
pub fn orthographic(x_mag: f32, y_mag: f32, near: f32, far: f32) -> Matrix4<f32> {
    let mut m = parallel_depth(near, far);
    m[(0, 0)] = 1.0 / x_mag;
    m[(1, 1)] = 1.0 / y_mag;
    m
}

/// Weak-perspective projection with aspect correction `ar`.
///
/// `ar` is the sensor aspect divided by the window aspect. It is applied to
/// the horizontal axis only.
pub fn weak_perspective(
    scale: Vector2<f32>,
    translation: Vector2<f32>,
    ar: f32,
    near: f32,
    far: f32,
) -> Matrix4<f32> {
    let (sx, sy) = (scale.x, scale.y);
    let (tx, ty) = (translation.x, translation.y);

    let mut m = parallel_depth(near, far);
    m[(0, 0)] = sx * ar;
    m[(0, 3)] = tx * sx * ar;
    m[(1, 1)] = sy;
    m[(1, 3)] = -ty * sy;
    m
}

/// Identity with the depth rows of a parallel projection filled in.
fn parallel_depth(near: f32, far: f32) -> Matrix4<f32> {
    let depth = near - far;
    let mut m = Matrix4::identity();
    m[(2, 2)] = 2.0 / depth;
    m[(2, 3)] = (far + near) / depth;
    m
}

pub(crate) fn check_finite_matrix(matrix: &'static str, m: Matrix4<f32>) -> Result<Matrix4<f32>> {
    if m.iter().all(|v| v.is_finite()) {
        Ok(m)
    } else {
        Err(CameraError::NonFiniteMatrix { matrix })
    }
}

pub(crate) fn check_fov(fov_deg: f32) -> Result<()> {
    if fov_deg.is_finite() && fov_deg > 0.0 && fov_deg < 180.0 {
        Ok(())
    } else {
        Err(CameraError::InvalidFov(fov_deg))
    }
}

pub(crate) fn check_perspective_planes(near: f32, far: f32) -> Result<()> {
    if near.is_finite() && far.is_finite() && near > 0.0 && near < far {
        Ok(())
    } else {
        Err(CameraError::InvalidClipPlanes { near, far })
    }
}

pub(crate) fn check_parallel_planes(near: f32, far: f32) -> Result<()> {
    if near.is_finite() && far.is_finite() && near >= 0.0 && near < far {
        Ok(())
    } else {
        Err(CameraError::InvalidClipPlanes { near, far })
    }
}

pub(crate) fn check_magnification(x_mag: f32, y_mag: f32) -> Result<()> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if valid(x_mag) && valid(y_mag) {
        Ok(())
    } else {
        Err(CameraError::InvalidMagnification { x_mag, y_mag })
    }
}

pub(crate) fn check_scale(scale: Vector2<f32>, frame: usize) -> Result<()> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if valid(scale.x) && valid(scale.y) {
        Ok(())
    } else {
        Err(CameraError::InvalidScale {
            sx: scale.x,
            sy: scale.y,
            frame,
        })
    }
}
