/// Camera state: kind-specific parameters, frame index and cached matrices
use nalgebra::{Matrix4, Point3, Vector2, Vector4};

use crate::error::{CameraError, Result};
use crate::pose::Pose;
use crate::projection::{
    build_projection, check_finite_matrix, check_fov, check_magnification,
    check_parallel_planes, check_perspective_planes, check_scale, Projection, Sensor, Viewport,
};
use crate::sequence::{frame_count, FrameSequence};
use crate::view::{build_view, view_projection};

/// Pinhole camera looking from `positions` at `targets`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveParams {
    pub positions: FrameSequence<Point3<f32>>,
    pub targets: FrameSequence<Point3<f32>>,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    pub sensor: Sensor,
    pub near: f32,
    pub far: f32,
}

/// Static orthographic camera with half-extents `x_mag` and `y_mag`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicParams {
    pub x_mag: f32,
    pub y_mag: f32,
    pub near: f32,
    pub far: f32,
}

/// Scaled orthographic camera with per-frame scale and translation, as
/// produced by fitting a pose to a sequence of 2D detections.
#[derive(Debug, Clone, PartialEq)]
pub struct WeakPerspectiveParams {
    pub scales: FrameSequence<Vector2<f32>>,
    pub translations: FrameSequence<Vector2<f32>>,
    pub sensor: Sensor,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraKind {
    Perspective(PerspectiveParams),
    Orthographic(OrthographicParams),
    WeakPerspective(WeakPerspectiveParams),
}

impl CameraKind {
    pub fn name(&self) -> &'static str {
        match self {
            CameraKind::Perspective(_) => "perspective",
            CameraKind::Orthographic(_) => "orthographic",
            CameraKind::WeakPerspective(_) => "weak-perspective",
        }
    }

    /// Pixel dimensions of the sensor, for kinds that model one.
    pub fn sensor(&self) -> Option<Sensor> {
        match self {
            CameraKind::Perspective(p) => Some(p.sensor),
            CameraKind::Orthographic(_) => None,
            CameraKind::WeakPerspective(p) => Some(p.sensor),
        }
    }

    /// Check all parameters and return the number of frames they describe.
    pub fn validate(&self) -> Result<usize> {
        match self {
            CameraKind::Perspective(p) => {
                check_fov(p.fov_deg)?;
                check_perspective_planes(p.near, p.far)?;
                p.positions
                    .validate(|frame, pos| check_finite("positions", frame, pos.coords.iter()))?;
                p.targets
                    .validate(|frame, target| check_finite("targets", frame, target.coords.iter()))?;
                frame_count(&[
                    ("positions", p.positions.len()),
                    ("targets", p.targets.len()),
                ])
            }
            CameraKind::Orthographic(p) => {
                check_magnification(p.x_mag, p.y_mag)?;
                check_parallel_planes(p.near, p.far)?;
                Ok(1)
            }
            CameraKind::WeakPerspective(p) => {
                check_parallel_planes(p.near, p.far)?;
                p.scales.validate(|frame, scale| check_scale(*scale, frame))?;
                p.translations
                    .validate(|frame, t| check_finite("translations", frame, t.iter()))?;
                frame_count(&[
                    ("scales", p.scales.len()),
                    ("translations", p.translations.len()),
                ])
            }
        }
    }

    /// Pose for `frame`, resolved from scratch.
    pub fn pose(&self, frame: usize) -> Result<Pose> {
        match self {
            CameraKind::Perspective(p) => Pose::look_at(*p.positions.at(frame)?, *p.targets.at(frame)?),
            CameraKind::Orthographic(_) | CameraKind::WeakPerspective(_) => Ok(Pose::axis_aligned()),
        }
    }

    /// Projection parameters for `frame`.
    pub fn projection(&self, frame: usize) -> Result<Projection> {
        let projection = match self {
            CameraKind::Perspective(p) => Projection::Perspective {
                fov_y: p.fov_deg.to_radians(),
                near: p.near,
                far: p.far,
            },
            CameraKind::Orthographic(p) => Projection::Orthographic {
                x_mag: p.x_mag,
                y_mag: p.y_mag,
                near: p.near,
                far: p.far,
            },
            CameraKind::WeakPerspective(p) => Projection::WeakPerspective {
                scale: *p.scales.at(frame)?,
                translation: *p.translations.at(frame)?,
                sensor: p.sensor,
                near: p.near,
                far: p.far,
            },
        };
        Ok(projection)
    }
}

/// A camera producing view and projection matrices for the current frame.
///
/// Matrices are recomputed from scratch by [`Camera::update_matrices`] and
/// whenever the frame index or a parameter changes after a viewport is known.
/// Every mutation is all-or-nothing: if the new state fails validation or
/// yields a degenerate pose, the camera keeps its previous state.
///
/// A `Camera` does no internal locking. Callers sharing one across threads
/// must synchronize frame changes with matrix reads themselves.
#[derive(Debug, Clone)]
pub struct Camera {
    kind: CameraKind,
    n_frames: usize,
    current_frame: usize,
    viewport: Option<Viewport>,
    projection_matrix: Matrix4<f32>,
    view_matrix: Matrix4<f32>,
}

impl Camera {
    /// Create a camera of the given kind. Matrices stay at identity until the
    /// first call to [`Camera::update_matrices`].
    pub fn new(kind: CameraKind) -> Result<Self> {
        let n_frames = kind.validate()?;
        log::debug!("created {} camera with {} frame(s)", kind.name(), n_frames);
        Ok(Self {
            kind,
            n_frames,
            current_frame: 0,
            viewport: None,
            projection_matrix: Matrix4::identity(),
            view_matrix: Matrix4::identity(),
        })
    }

    /// Perspective camera. Single-entry `positions` or `targets` are shared
    /// by all frames.
    pub fn perspective(
        positions: Vec<Point3<f32>>,
        targets: Vec<Point3<f32>>,
        fov_deg: f32,
        cols: u32,
        rows: u32,
        near: f32,
        far: f32,
    ) -> Result<Self> {
        Self::new(CameraKind::Perspective(PerspectiveParams {
            positions: FrameSequence::new("positions", positions)?,
            targets: FrameSequence::new("targets", targets)?,
            fov_deg,
            sensor: Sensor::new(cols, rows)?,
            near,
            far,
        }))
    }

    pub fn orthographic(x_mag: f32, y_mag: f32, near: f32, far: f32) -> Result<Self> {
        Self::new(CameraKind::Orthographic(OrthographicParams {
            x_mag,
            y_mag,
            near,
            far,
        }))
    }

    /// Weak-perspective camera. Single-entry `scales` or `translations` are
    /// shared by all frames.
    pub fn weak_perspective(
        scales: Vec<Vector2<f32>>,
        translations: Vec<Vector2<f32>>,
        cols: u32,
        rows: u32,
        near: f32,
        far: f32,
    ) -> Result<Self> {
        Self::new(CameraKind::WeakPerspective(WeakPerspectiveParams {
            scales: FrameSequence::new("scales", scales)?,
            translations: FrameSequence::new("translations", translations)?,
            sensor: Sensor::new(cols, rows)?,
            near,
            far,
        }))
    }

    // ===== MATRICES =====

    /// Recompute projection and view matrices for a `width` x `height` viewport.
    pub fn update_matrices(&mut self, width: u32, height: u32) -> Result<()> {
        let viewport = Viewport::new(width, height)?;
        let (projection, view) = self.matrices_at(self.current_frame, viewport)?;
        self.viewport = Some(viewport);
        self.projection_matrix = projection;
        self.view_matrix = view;
        log::debug!(
            "updated {} camera matrices for frame {} at {}x{}",
            self.kind.name(),
            self.current_frame,
            width,
            height
        );
        Ok(())
    }

    /// Projection and view matrices of `frame` for `viewport`, without
    /// touching the camera state.
    pub fn matrices_at(&self, frame: usize, viewport: Viewport) -> Result<(Matrix4<f32>, Matrix4<f32>)> {
        self.check_frame(frame as i64)?;
        let projection = build_projection(&self.kind.projection(frame)?, viewport)?;
        let view = self.view_matrix_at(frame)?;
        check_finite_matrix("view-projection", view_projection(&projection, &view))?;
        Ok((projection, view))
    }

    /// View matrix of `frame`. Views do not depend on the viewport.
    pub fn view_matrix_at(&self, frame: usize) -> Result<Matrix4<f32>> {
        self.check_frame(frame as i64)?;
        build_view(&self.kind.pose(frame)?)
    }

    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection_matrix
    }

    pub fn view_matrix(&self) -> &Matrix4<f32> {
        &self.view_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        view_projection(&self.projection_matrix, &self.view_matrix)
    }

    /// Viewport of the last successful [`Camera::update_matrices`].
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    // ===== FRAMES =====

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Select the active frame. Out-of-range indices are rejected, never clamped.
    pub fn set_current_frame(&mut self, index: usize) -> Result<()> {
        self.check_frame(index as i64)?;
        if let Some(viewport) = self.viewport {
            let (projection, view) = self.matrices_at(index, viewport)?;
            self.projection_matrix = projection;
            self.view_matrix = view;
        }
        log::debug!("camera frame {} -> {}", self.current_frame, index);
        self.current_frame = index;
        Ok(())
    }

    /// Like [`Camera::set_current_frame`] for signed input such as command
    /// line arguments; negative indices are out of range.
    pub fn set_current_frame_signed(&mut self, index: i64) -> Result<()> {
        self.check_frame(index)?;
        self.set_current_frame(index as usize)
    }

    fn check_frame(&self, index: i64) -> Result<()> {
        if index < 0 || index as u64 >= self.n_frames as u64 {
            return Err(CameraError::FrameOutOfRange {
                index,
                n_frames: self.n_frames,
            });
        }
        Ok(())
    }

    // ===== PER-FRAME GETTERS =====

    pub fn kind(&self) -> &CameraKind {
        &self.kind
    }

    /// Pose of the current frame.
    pub fn pose(&self) -> Result<Pose> {
        self.kind.pose(self.current_frame)
    }

    pub fn current_position(&self) -> Option<Point3<f32>> {
        match &self.kind {
            CameraKind::Perspective(p) => p.positions.get(self.current_frame).copied(),
            _ => Some(Pose::axis_aligned().position),
        }
    }

    /// Look-at target of the current frame, for perspective cameras.
    pub fn current_target(&self) -> Option<Point3<f32>> {
        match &self.kind {
            CameraKind::Perspective(p) => p.targets.get(self.current_frame).copied(),
            _ => None,
        }
    }

    /// Scale of the current frame, for weak-perspective cameras.
    pub fn current_scale(&self) -> Option<Vector2<f32>> {
        match &self.kind {
            CameraKind::WeakPerspective(p) => p.scales.get(self.current_frame).copied(),
            _ => None,
        }
    }

    /// Translation of the current frame, for weak-perspective cameras.
    pub fn current_translation(&self) -> Option<Vector2<f32>> {
        match &self.kind {
            CameraKind::WeakPerspective(p) => p.translations.get(self.current_frame).copied(),
            _ => None,
        }
    }

    // ===== SETTERS =====

    pub fn set_positions(&mut self, positions: Vec<Point3<f32>>) -> Result<()> {
        let positions = FrameSequence::new("positions", positions)?;
        self.modify(|kind| match kind {
            CameraKind::Perspective(p) => {
                p.positions = positions;
                Ok(())
            }
            _ => Err(CameraError::NotApplicable("positions")),
        })
    }

    pub fn set_targets(&mut self, targets: Vec<Point3<f32>>) -> Result<()> {
        let targets = FrameSequence::new("targets", targets)?;
        self.modify(|kind| match kind {
            CameraKind::Perspective(p) => {
                p.targets = targets;
                Ok(())
            }
            _ => Err(CameraError::NotApplicable("targets")),
        })
    }

    /// Set the vertical field of view in degrees.
    pub fn set_fov(&mut self, fov_deg: f32) -> Result<()> {
        self.modify(|kind| match kind {
            CameraKind::Perspective(p) => {
                p.fov_deg = fov_deg;
                Ok(())
            }
            _ => Err(CameraError::NotApplicable("fov")),
        })
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<()> {
        self.modify(|kind| {
            let (n, f) = match kind {
                CameraKind::Perspective(p) => (&mut p.near, &mut p.far),
                CameraKind::Orthographic(p) => (&mut p.near, &mut p.far),
                CameraKind::WeakPerspective(p) => (&mut p.near, &mut p.far),
            };
            *n = near;
            *f = far;
            Ok(())
        })
    }

    pub fn set_magnification(&mut self, x_mag: f32, y_mag: f32) -> Result<()> {
        self.modify(|kind| match kind {
            CameraKind::Orthographic(p) => {
                p.x_mag = x_mag;
                p.y_mag = y_mag;
                Ok(())
            }
            _ => Err(CameraError::NotApplicable("magnification")),
        })
    }

    pub fn set_scales(&mut self, scales: Vec<Vector2<f32>>) -> Result<()> {
        let scales = FrameSequence::new("scales", scales)?;
        self.modify(|kind| match kind {
            CameraKind::WeakPerspective(p) => {
                p.scales = scales;
                Ok(())
            }
            _ => Err(CameraError::NotApplicable("scales")),
        })
    }

    pub fn set_translations(&mut self, translations: Vec<Vector2<f32>>) -> Result<()> {
        let translations = FrameSequence::new("translations", translations)?;
        self.modify(|kind| match kind {
            CameraKind::WeakPerspective(p) => {
                p.translations = translations;
                Ok(())
            }
            _ => Err(CameraError::NotApplicable("translations")),
        })
    }

    /// Apply `edit` to a copy of the parameters and commit it only if the
    /// result validates and, when a viewport is known, yields valid matrices.
    fn modify<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut CameraKind) -> Result<()>,
    {
        let mut kind = self.kind.clone();
        edit(&mut kind)?;
        let n_frames = kind.validate()?;
        if self.current_frame >= n_frames {
            return Err(CameraError::FrameOutOfRange {
                index: self.current_frame as i64,
                n_frames,
            });
        }

        let candidate = Camera {
            kind,
            n_frames,
            current_frame: self.current_frame,
            viewport: self.viewport,
            projection_matrix: self.projection_matrix,
            view_matrix: self.view_matrix,
        };
        let matrices = match self.viewport {
            Some(viewport) => Some(candidate.matrices_at(self.current_frame, viewport)?),
            None => None,
        };

        *self = candidate;
        if let Some((projection, view)) = matrices {
            self.projection_matrix = projection;
            self.view_matrix = view;
        }
        Ok(())
    }

    // ===== SCREEN PROJECTION =====

    /// Project a world-space point to pixel coordinates of the last viewport.
    ///
    /// Returns `(x, y, depth)` with `y` growing downwards and `depth` the NDC
    /// depth in [-1, 1], or `None` if no viewport is known or the point falls
    /// outside the clip volume.
    pub fn project_to_screen(&self, point: &Point3<f32>) -> Option<(f32, f32, f32)> {
        let viewport = self.viewport?;
        let clip = self.view_projection_matrix() * Vector4::new(point.x, point.y, point.z, 1.0);

        // Points at or behind the eye have no screen position
        if clip.w <= f32::EPSILON {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * viewport.width() as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * viewport.height() as f32;
        Some((screen_x, screen_y, ndc.z))
    }
}

fn check_finite<'a>(
    field: &'static str,
    frame: usize,
    values: impl IntoIterator<Item = &'a f32>,
) -> Result<()> {
    if values.into_iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CameraError::NonFinite { field, frame })
    }
}
