/// Conversion of perspective cameras to OpenCV-style calibrations
///
/// OpenCV cameras look down +Z with +Y pointing down the image, while the
/// cameras in this crate look down -Z with +Y up. Converting an extrinsic
/// matrix therefore negates its Y and Z rows.
use nalgebra::{Matrix3, Matrix3x4, Matrix4};

use crate::camera::{Camera, CameraKind};
use crate::error::{CameraError, Result};

/// Intrinsics plus one extrinsic `[R|t]` per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenCvCamera {
    /// Intrinsic matrix `[[f, 0, cx], [0, f, cy], [0, 0, 1]]` in pixels.
    pub k: Matrix3<f32>,
    /// World-to-camera transform of each frame, in OpenCV axis convention.
    pub extrinsics: Vec<Matrix3x4<f32>>,
    pub cols: u32,
    pub rows: u32,
}

impl OpenCvCamera {
    pub fn n_frames(&self) -> usize {
        self.extrinsics.len()
    }

    /// Undo the axis flip of `frame` and return the view matrix in this
    /// crate's convention.
    pub fn view_matrix(&self, frame: usize) -> Result<Matrix4<f32>> {
        let rt = self.extrinsics.get(frame).ok_or(CameraError::FrameOutOfRange {
            index: frame as i64,
            n_frames: self.extrinsics.len(),
        })?;
        let mut view = Matrix4::identity();
        view.fixed_view_mut::<3, 4>(0, 0).copy_from(&flip_yz(rt));
        Ok(view)
    }
}

impl Camera {
    /// Export the calibration of every frame of a perspective camera.
    ///
    /// The current frame index is left untouched.
    pub fn to_opencv_camera(&self) -> Result<OpenCvCamera> {
        let params = match self.kind() {
            CameraKind::Perspective(p) => p,
            other => {
                return Err(CameraError::UnsupportedConversion {
                    expected: "perspective",
                    actual: other.name(),
                })
            }
        };

        let extrinsics = (0..self.n_frames())
            .map(|frame| {
                let view = self.view_matrix_at(frame)?;
                Ok(flip_yz(&view.fixed_view::<3, 4>(0, 0).clone_owned()))
            })
            .collect::<Result<Vec<_>>>()?;

        let (cols, rows) = (params.sensor.cols(), params.sensor.rows());
        let f = 0.5 * rows as f32 / (0.5 * params.fov_deg.to_radians()).tan();
        let cx = cols as f32 / 2.0;
        let cy = rows as f32 / 2.0;

        #[rustfmt::skip]
        let k = Matrix3::new(
            f,   0.0, cx,
            0.0, f,   cy,
            0.0, 0.0, 1.0,
        );

        log::debug!("exported {} frame(s) with focal length {:.3}px", extrinsics.len(), f);
        Ok(OpenCvCamera {
            k,
            extrinsics,
            cols,
            rows,
        })
    }
}

/// Negate rows 1 and 2 of an `[R|t]` matrix. The flip is its own inverse.
fn flip_yz(rt: &Matrix3x4<f32>) -> Matrix3x4<f32> {
    let mut flipped = *rt;
    flipped.row_mut(1).neg_mut();
    flipped.row_mut(2).neg_mut();
    flipped
}
