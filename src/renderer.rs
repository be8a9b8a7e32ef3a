//! CPU ray tracer
//!
//! Casts one primary ray per pixel from a fixed pinhole camera, shades hits
//! with diffuse + specular lighting and hard shadows, and follows mirror
//! reflections down to a bounded depth.

use std::time::Instant;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::scene::{Hittable, Light, Material, Scene};
use crate::vector::{self, Vec3};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Cannot normalize degenerate vector ({x}, {y}, {z})")]
    DegenerateVector { x: f32, y: f32, z: f32 },
}

/// A ray in 3D space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Nearest surface hit along a ray
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    pub point: Point3<f32>,
    pub normal: Vec3,
    pub material: Material,
    pub distance: f32,
}

/// Fixed shading-model constants
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ShadingConfig {
    /// Returned for misses and once the depth limit is exceeded
    #[serde(default = "default_background")]
    pub background: Vec3,
    /// Offset along the normal for shadow and reflection ray origins
    #[serde(default = "default_bias")]
    pub bias: f32,
    /// Deepest recursion level that still intersects the scene
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Weight of the white specular highlight
    #[serde(default = "default_specular_weight")]
    pub specular_weight: f32,
}

fn default_background() -> Vec3 {
    Vector3::new(0.2, 0.7, 0.8)
}

fn default_bias() -> f32 {
    crate::DEFAULT_BIAS
}

fn default_max_depth() -> u32 {
    crate::DEFAULT_MAX_DEPTH
}

fn default_specular_weight() -> f32 {
    crate::DEFAULT_SPECULAR_WEIGHT
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            bias: default_bias(),
            max_depth: default_max_depth(),
            specular_weight: default_specular_weight(),
        }
    }
}

/// Find the nearest hit across `objects`.
///
/// Strict `<` comparison: when two objects report the exact same distance the
/// one earlier in the slice wins.
pub fn scene_intersect<H: Hittable>(
    ray: &Ray,
    objects: &[H],
) -> Result<Option<HitRecord>, RenderError> {
    let mut best: Option<(f32, &H)> = None;
    let mut dist = f32::MAX;

    for object in objects {
        if let Some(t) = object.ray_intersect(ray) {
            if t < dist {
                dist = t;
                best = Some((t, object));
            }
        }
    }

    match best {
        Some((t, object)) => {
            let point = ray.at(t);
            let normal = object.normal_at(&point)?;
            Ok(Some(HitRecord {
                point,
                normal,
                material: *object.material(),
                distance: t,
            }))
        }
        None => Ok(None),
    }
}

/// True if anything at all lies along `ray`. There is no far bound, so an
/// object beyond the light still counts as an occluder.
fn occluded<H: Hittable>(ray: &Ray, objects: &[H]) -> bool {
    objects
        .iter()
        .any(|o| o.ray_intersect(ray).is_some_and(|t| t < f32::MAX))
}

/// Radiance arriving along `ray`.
///
/// `depth` counts bounces from the camera; beyond `shading.max_depth` the
/// background is returned without touching the scene.
pub fn cast_ray<H: Hittable>(
    ray: &Ray,
    objects: &[H],
    lights: &[Light],
    shading: &ShadingConfig,
    depth: u32,
) -> Result<Vec3, RenderError> {
    if depth > shading.max_depth {
        return Ok(shading.background);
    }

    let hit = match scene_intersect(ray, objects)? {
        Some(hit) => hit,
        None => return Ok(shading.background),
    };

    let n = hit.normal;
    let offset_origin = hit.point + n * shading.bias;
    let material = hit.material;

    let mut diffuse = 0.0f32;
    let mut specular = 0.0f32;

    for light in lights {
        let light_dir = vector::normalize(&(light.position - hit.point))?;

        if occluded(&Ray::new(offset_origin, light_dir), objects) {
            continue;
        }

        diffuse += light.intensity * light_dir.dot(&n).max(0.0);
        let reflect_dir = vector::reflect(&-light_dir, &n);
        specular += reflect_dir
            .dot(&ray.direction)
            .max(0.0)
            .powf(material.specular_exponent)
            * light.intensity;
    }

    // Zero weight in the final sum, so skip the whole reflection subtree
    let reflect_color = if material.reflectivity == 0.0 {
        Vec3::zeros()
    } else {
        let reflect_dir = vector::normalize(&vector::reflect(&ray.direction, &n))?;
        cast_ray(
            &Ray::new(offset_origin, reflect_dir),
            objects,
            lights,
            shading,
            depth + 1,
        )?
    };

    let refl = material.reflectivity;
    Ok(material.color * diffuse * (1.0 - refl)
        + Vector3::new(1.0, 1.0, 1.0) * specular * shading.specular_weight
        + reflect_color * refl)
}

/// Pinhole camera at the origin looking down -z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub width: usize,
    pub height: usize,
    /// Vertical field of view in radians
    pub fov: f32,
}

impl Camera {
    pub fn new(width: usize, height: usize, fov: f32) -> Self {
        Self { width, height, fov }
    }

    /// Unit direction through the center of pixel `(i, j)`; row 0 is the top
    pub fn direction(&self, i: usize, j: usize) -> Result<Vec3, RenderError> {
        let width = self.width as f64;
        let height = self.height as f64;
        let half = (f64::from(self.fov) / 2.0).tan();

        let x = ((2.0 * (i as f64 + 0.5) / width - 1.0) * half * width / height) as f32;
        let y = (-(2.0 * (j as f64 + 0.5) / height - 1.0) * half) as f32;
        vector::normalize(&Vector3::new(x, y, -1.0))
    }

    pub fn primary_ray(&self, i: usize, j: usize) -> Result<Ray, RenderError> {
        Ok(Ray::new(Point3::origin(), self.direction(i, j)?))
    }
}

/// Row-major color buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Vec3>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::zeros(); width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Vec3>) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Vec3> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Packed 8-bit RGB triplets. Channels are clamped to [0, 1] and
    /// truncated, not rounded.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for c in &self.pixels {
            bytes.push(channel_to_byte(c.x));
            bytes.push(channel_to_byte(c.y));
            bytes.push(channel_to_byte(c.z));
        }
        bytes
    }

    /// Grayscale preview at most `columns` characters wide.
    ///
    /// Terminal cells are about twice as tall as wide, so every output row
    /// covers two pixel rows' worth of height.
    pub fn to_ascii(&self, columns: usize) -> String {
        if self.width == 0 || self.height == 0 || columns == 0 {
            return String::new();
        }

        let gradient_chars: Vec<char> = crate::ASCII_GRADIENT.chars().collect();
        let columns = columns.min(self.width);
        let step = self.width as f32 / columns as f32;
        let rows = ((self.height as f32 / (step * 2.0)) as usize).max(1);

        let mut result = String::with_capacity((columns + 1) * rows * 3);
        for row in 0..rows {
            let y = ((row as f32 * step * 2.0) as usize).min(self.height - 1);
            for col in 0..columns {
                let x = ((col as f32 * step) as usize).min(self.width - 1);
                let color = self.pixels[y * self.width + x];

                let luminance = 0.299 * color.x + 0.587 * color.y + 0.114 * color.z;
                let luminance = luminance.clamp(0.0, 1.0);

                let index = ((luminance * (gradient_chars.len() - 1) as f32).round() as usize)
                    .min(gradient_chars.len() - 1);
                result.push(gradient_chars[index]);
            }
            result.push('\n');
        }

        result
    }
}

fn channel_to_byte(c: f32) -> u8 {
    (255.0 * c.clamp(0.0, 1.0)) as u8
}

/// Renders a scene through the fixed camera
#[derive(Debug, Clone)]
pub struct Renderer {
    camera: Camera,
    shading: ShadingConfig,
    parallel: bool,
}

impl Renderer {
    pub fn new(camera: Camera, shading: ShadingConfig) -> Self {
        Self {
            camera,
            shading,
            parallel: true,
        }
    }

    /// Render rows on the rayon pool (default) or on the calling thread.
    /// Output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn render(&self, scene: &Scene) -> Result<Framebuffer, RenderError> {
        let start = Instant::now();
        let (width, height) = (self.camera.width, self.camera.height);

        tracing::info!(
            width,
            height,
            fov = self.camera.fov,
            spheres = scene.spheres.len(),
            lights = scene.lights.len(),
            parallel = self.parallel,
            "Rendering"
        );

        let rows: Vec<Vec<Vec3>> = if self.parallel {
            (0..height)
                .into_par_iter()
                .map(|j| self.render_row(scene, j))
                .collect::<Result<_, _>>()?
        } else {
            (0..height)
                .map(|j| self.render_row(scene, j))
                .collect::<Result<_, _>>()?
        };

        let pixels: Vec<Vec3> = rows.into_iter().flatten().collect();

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            pixels = pixels.len(),
            "Render finished"
        );

        Ok(Framebuffer {
            width,
            height,
            pixels,
        })
    }

    fn render_row(&self, scene: &Scene, j: usize) -> Result<Vec<Vec3>, RenderError> {
        tracing::trace!(row = j, "Rendering row");
        (0..self.camera.width)
            .map(|i| {
                let ray = self.camera.primary_ray(i, j)?;
                cast_ray(&ray, &scene.spheres, &scene.lights, &self.shading, 0)
            })
            .collect()
    }
}
