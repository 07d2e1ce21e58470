//! Application settings.
//!
//! Loaded from `config/settings.json`. Every field has a default, so the file
//! may be partial or missing entirely.

use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context};
use log::info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/settings.json";

/// Which drawable the renderer sets up at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Cube,
    Icosahedron,
    /// Bicubic Bezier patches, tessellated on the GPU
    Patches,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    pub tessellation: TessellationConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial inner width in physical pixels
    pub width: u32,
    /// Initial inner height in physical pixels
    pub height: u32,
    pub title_prefix: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 800,
            height: 600,
            title_prefix: String::from("tess example"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// How far the eye sits back from the origin along +Z
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            fov_degrees: 60.0,
            near: 1.0,
            far: 100.0,
            distance: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub shape: Shape,
    pub degrees_per_second: f32,
    /// How often the window title is refreshed with the frame rate
    pub title_interval_ms: u64,
}

impl SceneConfig {
    pub fn title_interval(&self) -> Duration {
        Duration::from_millis(self.title_interval_ms)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            shape: Shape::Cube,
            degrees_per_second: 45.0,
            title_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    pub inner: f32,
    pub outer: f32,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        TessellationConfig {
            inner: 2.0,
            outer: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Enables the Khronos validation layer when it is installed
    pub validation: bool,
}

impl AppConfig {
    /// Reads the settings file, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;

        let config = AppConfig::from_json(&contents)
            .with_context(|| format!("parsing settings from {}", path.display()))?;

        info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.window.width > 0 && self.window.height > 0,
            "window size must be non-zero, got {}x{}",
            self.window.width,
            self.window.height
        );
        ensure!(
            self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0,
            "field of view must be within (0, 180) degrees, got {}",
            self.camera.fov_degrees
        );
        ensure!(
            self.camera.near > 0.0 && self.camera.near < self.camera.far,
            "clip planes must satisfy 0 < near < far, got near {} far {}",
            self.camera.near,
            self.camera.far
        );
        ensure!(
            self.camera.distance.is_finite(),
            "camera distance must be finite, got {}",
            self.camera.distance
        );
        ensure!(
            self.scene.degrees_per_second.is_finite() && self.scene.degrees_per_second >= 0.0,
            "rotation rate must be finite and non-negative, got {}",
            self.scene.degrees_per_second
        );
        ensure!(
            self.scene.title_interval_ms > 0,
            "title interval must be non-zero"
        );
        ensure!(
            self.tessellation.inner >= 1.0 && self.tessellation.outer >= 1.0,
            "tessellation levels must be at least 1, got inner {} outer {}",
            self.tessellation.inner,
            self.tessellation.outer
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_constants() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title_prefix, "tess example");
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.near, 1.0);
        assert_eq!(config.camera.far, 100.0);
        assert_eq!(config.scene.shape, Shape::Cube);
        assert_eq!(config.scene.degrees_per_second, 45.0);
        assert_eq!(config.scene.title_interval(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = AppConfig::from_json(r#"{ "scene": { "shape": "patches" } }"#).unwrap();
        assert_eq!(config.scene.shape, Shape::Patches);
        assert_eq!(config.scene.degrees_per_second, 45.0);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.tessellation.inner, 2.0);
    }

    #[test]
    fn empty_object_is_valid() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.scene.shape, Shape::Cube);
    }

    #[test]
    fn unknown_shape_is_rejected() {
        assert!(AppConfig::from_json(r#"{ "scene": { "shape": "teapot" } }"#).is_err());
    }

    #[test]
    fn inverted_clip_planes_are_rejected() {
        let err = AppConfig::from_json(r#"{ "camera": { "near": 10.0, "far": 1.0 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("near"));
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut config = AppConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tessellation_levels_below_one_are_rejected() {
        let mut config = AppConfig::default();
        config.tessellation.outer = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_rotation_rate_is_rejected() {
        let err = AppConfig::from_json(r#"{ "scene": { "degrees_per_second": -45.0 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("rotation rate"));
    }

    #[test]
    fn non_finite_rotation_rate_and_distance_are_rejected() {
        let mut config = AppConfig::default();
        config.scene.degrees_per_second = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.scene.degrees_per_second = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.camera.distance = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_rotation_rate_is_allowed() {
        let mut config = AppConfig::default();
        config.scene.degrees_per_second = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("does/not/exist/settings.json").unwrap();
        assert_eq!(config.window.title_prefix, "tess example");
    }
}
