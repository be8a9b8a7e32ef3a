//! sphere_rt: recursive ray tracer for spheres and point lights
//!
//! Renders a fixed scene through a pinhole camera with diffuse and specular
//! shading, hard shadows and mirror reflections, then hands the framebuffer
//! to a PPM/PNG sink or an ASCII preview.

pub mod config;
pub mod output;
pub mod renderer;
pub mod scene;
pub mod vector;

pub use config::AppConfig;
pub use renderer::{Camera, Framebuffer, RenderError, Renderer, ShadingConfig};
pub use scene::Scene;

/// Deepest reflection level that still intersects the scene
pub const DEFAULT_MAX_DEPTH: u32 = 4;

/// Largest accepted `max_depth`; each level is one stack frame of `cast_ray`
pub const MAX_DEPTH_LIMIT: u32 = 64;

/// Largest accepted image, in pixels
pub const MAX_PIXELS: usize = 1 << 26;

/// Normal offset for secondary ray origins
pub const DEFAULT_BIAS: f32 = 1e-3;

/// Weight of the white specular highlight in the final color
pub const DEFAULT_SPECULAR_WEIGHT: f32 = 0.6;

/// UTF-8 character gradient from dark to light
pub const ASCII_GRADIENT: &str = " ·∙:;░▒▓█";
