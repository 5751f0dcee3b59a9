/// Vantage Core Library - Camera projection and view math
///
/// Given a camera's pose and optics, this library produces the view matrix
/// (world to camera space) and projection matrix (camera to clip space) for
/// perspective, orthographic and weak-perspective cameras, optionally
/// animated over a sequence of frames.

pub mod camera;
pub mod config;
pub mod error;
pub mod export;
pub mod pose;
pub mod projection;
pub mod sequence;
pub mod track;
pub mod view;

// Re-export commonly used types
pub use camera::{Camera, CameraKind, OrthographicParams, PerspectiveParams, WeakPerspectiveParams};
pub use config::{CameraConfig, ConfigError};
pub use error::{CameraError, Result};
pub use export::OpenCvCamera;
pub use pose::{Pose, WORLD_UP};
pub use projection::{build_projection, Projection, Sensor, Viewport};
pub use sequence::FrameSequence;
pub use view::{build_view, look_at, view_projection};
