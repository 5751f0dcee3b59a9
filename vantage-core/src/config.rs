/// TOML camera descriptions
///
/// ```toml
/// kind = "perspective"
/// fov = 45.0
/// cols = 1920
/// rows = 1080
/// positions = [[0.0, 1.0, 5.0]]
/// targets_file = "targets.txt"
/// ```
///
/// Per-frame parameters are given either inline or as a track file (see
/// [`crate::track`]) resolved relative to the config file's directory.
use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector2};
use serde::Deserialize;

use crate::camera::Camera;
use crate::error::CameraError;
use crate::track::{parse_rows, TrackError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid camera config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid track file {}: {source}", path.display())]
    Track { path: PathBuf, source: TrackError },

    #[error("`{0}` is given both inline and as a file")]
    AmbiguousSource(&'static str),

    #[error(transparent)]
    Camera(#[from] CameraError),
}

fn default_fov() -> f32 {
    45.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraConfig {
    Perspective(PerspectiveConfig),
    Orthographic(OrthographicConfig),
    WeakPerspective(WeakPerspectiveConfig),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerspectiveConfig {
    #[serde(default)]
    pub positions: Vec<[f32; 3]>,
    pub positions_file: Option<PathBuf>,
    #[serde(default)]
    pub targets: Vec<[f32; 3]>,
    pub targets_file: Option<PathBuf>,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    pub cols: u32,
    pub rows: u32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default)]
    pub frame: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrthographicConfig {
    pub x_mag: f32,
    pub y_mag: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeakPerspectiveConfig {
    #[serde(default)]
    pub scales: Vec<[f32; 2]>,
    pub scales_file: Option<PathBuf>,
    #[serde(default)]
    pub translations: Vec<[f32; 2]>,
    pub translations_file: Option<PathBuf>,
    pub cols: u32,
    pub rows: u32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default)]
    pub frame: usize,
}

impl CameraConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read a config file and build its camera, resolving track files next to it.
    pub fn load(path: impl AsRef<Path>) -> Result<Camera, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        log::info!("loading camera config {}", path.display());
        config.build(base_dir)
    }

    /// Build the camera. Relative track paths are resolved against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<Camera, ConfigError> {
        match self {
            CameraConfig::Perspective(c) => {
                let positions = rows_from("positions", &c.positions, c.positions_file.as_deref(), base_dir)?;
                let targets = rows_from("targets", &c.targets, c.targets_file.as_deref(), base_dir)?;
                let mut camera = Camera::perspective(
                    positions.into_iter().map(Point3::from).collect(),
                    targets.into_iter().map(Point3::from).collect(),
                    c.fov,
                    c.cols,
                    c.rows,
                    c.near,
                    c.far,
                )?;
                camera.set_current_frame(c.frame)?;
                Ok(camera)
            }
            CameraConfig::Orthographic(c) => Ok(Camera::orthographic(c.x_mag, c.y_mag, c.near, c.far)?),
            CameraConfig::WeakPerspective(c) => {
                let scales = rows_from("scales", &c.scales, c.scales_file.as_deref(), base_dir)?;
                let mut translations = rows_from(
                    "translations",
                    &c.translations,
                    c.translations_file.as_deref(),
                    base_dir,
                )?;
                if translations.is_empty() {
                    translations.push([0.0, 0.0]);
                }
                let mut camera = Camera::weak_perspective(
                    scales.into_iter().map(Vector2::from).collect(),
                    translations.into_iter().map(Vector2::from).collect(),
                    c.cols,
                    c.rows,
                    c.near,
                    c.far,
                )?;
                camera.set_current_frame(c.frame)?;
                Ok(camera)
            }
        }
    }
}

/// Take rows from the inline list or the track file, whichever is given.
fn rows_from<const N: usize>(
    field: &'static str,
    inline: &[[f32; N]],
    file: Option<&Path>,
    base_dir: &Path,
) -> Result<Vec<[f32; N]>, ConfigError> {
    let Some(file) = file else {
        return Ok(inline.to_vec());
    };
    if !inline.is_empty() {
        return Err(ConfigError::AmbiguousSource(field));
    }

    let path = base_dir.join(file);
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let rows = parse_rows::<N>(&text).map_err(|source| ConfigError::Track { path, source })?;
    log::debug!("read {} rows of `{}` from {}", rows.len(), field, file.display());
    Ok(rows)
}
