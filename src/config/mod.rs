mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::renderer::{Camera, ShadingConfig};
use crate::scene::{Light, Scene, Sphere};

pub use loader::load_config;

/// Scene file locations tried when no path is given
pub const DEFAULT_SCENE_PATHS: [&str; 2] = ["scene.yaml", "scene.yml"];

/// Main application configuration: render settings plus the scene itself
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub shading: ShadingConfig,
    #[serde(default)]
    pub spheres: Vec<Sphere>,
    #[serde(default)]
    pub lights: Vec<Light>,
}

impl Default for AppConfig {
    /// Reference scene with the default camera and shading
    fn default() -> Self {
        let scene = Scene::reference();
        Self {
            render: RenderConfig::default(),
            shading: ShadingConfig::default(),
            spheres: scene.spheres,
            lights: scene.lights,
        }
    }
}

/// Image size, field of view and threading
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    /// Vertical field of view in radians
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// Render rows on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_width() -> usize {
    800
}

fn default_height() -> usize {
    600
}

fn default_fov() -> f32 {
    std::f32::consts::FRAC_PI_2
}

fn default_parallel() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fov: default_fov(),
            parallel: default_parallel(),
        }
    }
}

impl RenderConfig {
    pub fn camera(&self) -> Camera {
        Camera::new(self.width, self.height, self.fov)
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load from `config_path`, else the first default scene file that
    /// exists, else the built-in reference scene
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                for p in DEFAULT_SCENE_PATHS {
                    let path = Path::new(p);
                    if path.exists() {
                        return Self::from_file(path);
                    }
                }
                tracing::info!("No scene file found, using the reference scene");
                Ok(Self::default())
            }
        }
    }

    pub fn scene(&self) -> Scene {
        Scene::new(self.spheres.clone(), self.lights.clone())
    }

    /// Reject values the renderer cannot give a meaningful image for
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.render;
        if r.width == 0 || r.height == 0 {
            return Err(ConfigError::Validation(format!(
                "image size must be non-zero, got {}x{}",
                r.width, r.height
            )));
        }
        match r.width.checked_mul(r.height) {
            Some(pixels) if pixels <= crate::MAX_PIXELS => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "image size {}x{} exceeds {} pixels",
                    r.width,
                    r.height,
                    crate::MAX_PIXELS
                )));
            }
        }
        if !(r.fov.is_finite() && r.fov > 0.0 && r.fov < std::f32::consts::PI) {
            return Err(ConfigError::Validation(format!(
                "fov must be in (0, pi) radians, got {}",
                r.fov
            )));
        }

        let s = &self.shading;
        if !s.background.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::Validation(
                "background color must be finite".to_string(),
            ));
        }
        if !(s.bias.is_finite() && s.bias >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "bias must be non-negative, got {}",
                s.bias
            )));
        }
        if s.max_depth > crate::MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "max_depth must be at most {}, got {}",
                crate::MAX_DEPTH_LIMIT,
                s.max_depth
            )));
        }
        if !s.specular_weight.is_finite() {
            return Err(ConfigError::Validation(
                "specular_weight must be finite".to_string(),
            ));
        }

        for (i, sphere) in self.spheres.iter().enumerate() {
            validate_sphere(sphere).map_err(|msg| {
                ConfigError::Validation(format!("sphere {}: {}", i, msg))
            })?;
        }

        for (i, light) in self.lights.iter().enumerate() {
            if !light.position.coords.iter().all(|c| c.is_finite()) {
                return Err(ConfigError::Validation(format!(
                    "light {}: position must be finite",
                    i
                )));
            }
            if !(light.intensity.is_finite() && light.intensity > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "light {}: intensity must be positive, got {}",
                    i, light.intensity
                )));
            }
        }

        Ok(())
    }
}

fn validate_sphere(sphere: &Sphere) -> Result<(), String> {
    if !sphere.center.coords.iter().all(|c| c.is_finite()) {
        return Err("center must be finite".to_string());
    }
    if !(sphere.radius.is_finite() && sphere.radius > 0.0) {
        return Err(format!("radius must be positive, got {}", sphere.radius));
    }

    let m = &sphere.material;
    if !m.color.iter().all(|c| (0.0..=1.0).contains(c)) {
        return Err(format!(
            "color channels must be in [0, 1], got [{}, {}, {}]",
            m.color.x, m.color.y, m.color.z
        ));
    }
    if !(m.specular_exponent.is_finite() && m.specular_exponent > 0.0) {
        return Err(format!(
            "specular_exponent must be positive, got {}",
            m.specular_exponent
        ));
    }
    if !(0.0..=1.0).contains(&m.reflectivity) {
        return Err(format!(
            "reflectivity must be in [0, 1], got {}",
            m.reflectivity
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
