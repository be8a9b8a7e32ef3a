//! Scene definitions: spheres, point lights and the reference scene

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::renderer::{Ray, RenderError};
use crate::vector::{self, Vec3};

/// Surface parameters shared by every point of a sphere
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Material {
    /// Diffuse RGB color, each channel in [0, 1]
    pub color: Vec3,
    /// Phong exponent for the specular highlight
    pub specular_exponent: f32,
    /// Fraction of outgoing color taken from the mirror ray, in [0, 1]
    pub reflectivity: f32,
}

impl Material {
    pub fn new(color: Vec3, specular_exponent: f32, reflectivity: f32) -> Self {
        Self {
            color,
            specular_exponent,
            reflectivity,
        }
    }
}

/// Point light source
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Light {
    pub position: Point3<f32>,
    pub intensity: f32,
}

impl Light {
    pub fn new(position: Point3<f32>, intensity: f32) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// Anything a ray can be tested against
pub trait Hittable {
    /// Nearest non-negative distance along `ray` at which it meets the surface
    fn ray_intersect(&self, ray: &Ray) -> Option<f32>;

    /// Outward unit normal at a point on the surface
    fn normal_at(&self, point: &Point3<f32>) -> Result<Vec3, RenderError>;

    fn material(&self) -> &Material;
}

/// Sphere primitive
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

impl Hittable for Sphere {
    fn ray_intersect(&self, ray: &Ray) -> Option<f32> {
        let l = self.center - ray.origin;
        let tca = l.dot(&ray.direction);
        let d2 = l.dot(&l) - tca * tca;
        let r2 = self.radius * self.radius;
        if d2 > r2 {
            return None;
        }

        let thc = (r2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;

        // Origin inside the sphere (or past the near root): take the far root
        let t = if t0 < 0.0 { t1 } else { t0 };
        if t < 0.0 {
            return None;
        }
        Some(t)
    }

    fn normal_at(&self, point: &Point3<f32>) -> Result<Vec3, RenderError> {
        vector::normalize(&(point - self.center))
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

/// The complete scene: ordered spheres and lights, read-only while rendering
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Scene {
    #[serde(default)]
    pub spheres: Vec<Sphere>,
    #[serde(default)]
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>, lights: Vec<Light>) -> Self {
        Self { spheres, lights }
    }

    /// Four spheres lit by three lights, seen from the origin looking down -z
    pub fn reference() -> Self {
        let spheres = vec![
            Sphere::new(
                Point3::new(-3.0, 0.0, -16.0),
                2.0,
                Material::new(Vector3::new(0.4, 0.4, 0.3), 50.0, 0.2),
            ),
            Sphere::new(
                Point3::new(-1.0, -1.5, -12.0),
                2.0,
                Material::new(Vector3::new(0.3, 0.1, 0.1), 10.0, 0.4),
            ),
            Sphere::new(
                Point3::new(1.5, -0.5, -18.0),
                3.0,
                Material::new(Vector3::new(0.3, 0.4, 0.3), 100.0, 0.3),
            ),
            Sphere::new(
                Point3::new(7.0, 5.0, -18.0),
                4.0,
                Material::new(Vector3::new(0.1, 0.2, 0.4), 300.0, 0.1),
            ),
        ];

        let lights = vec![
            Light::new(Point3::new(-20.0, 20.0, 20.0), 1.5),
            Light::new(Point3::new(30.0, 50.0, -25.0), 1.8),
            Light::new(Point3::new(30.0, 20.0, 30.0), 1.7),
        ];

        Self { spheres, lights }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere_at(z: f32) -> Sphere {
        Sphere::new(
            Point3::new(0.0, 0.0, z),
            1.0,
            Material::new(Vector3::new(1.0, 1.0, 1.0), 10.0, 0.0),
        )
    }

    #[test]
    fn test_reference_scene() {
        let scene = Scene::reference();
        assert_eq!(scene.spheres.len(), 4);
        assert_eq!(scene.lights.len(), 3);
    }

    #[test]
    fn test_sphere_intersection_distance() {
        let sphere = unit_sphere_at(-5.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let t = sphere.ray_intersect(&ray).unwrap();
        assert!((t - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(-5.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        assert!(sphere.ray_intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_behind_origin() {
        let sphere = unit_sphere_at(5.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        assert!(sphere.ray_intersect(&ray).is_none());
    }

    #[test]
    fn test_ray_from_inside_uses_far_root() {
        let sphere = unit_sphere_at(-5.0);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, -1.0));
        let t = sphere.ray_intersect(&ray).unwrap();
        assert!(t >= 0.0);
        assert!((t - 1.0).abs() < 1e-6);

        // Off-center origin, oblique direction
        let ray = Ray::new(
            Point3::new(0.3, -0.2, -5.1),
            vector::normalize(&Vector3::new(1.0, 2.0, 0.5)).unwrap(),
        );
        assert!(sphere.ray_intersect(&ray).unwrap() >= 0.0);
    }

    #[test]
    fn test_tangent_ray_hits() {
        // Passes exactly one radius above the center: d2 == r2, thc == 0
        let sphere = unit_sphere_at(-5.0);
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        let t = sphere.ray_intersect(&ray).unwrap();
        assert_eq!(t, 5.0);
    }

    #[test]
    fn test_normal_points_outward() {
        let sphere = unit_sphere_at(-5.0);
        let n = sphere.normal_at(&Point3::new(0.0, 0.0, -4.0)).unwrap();
        assert!((n - Vector3::new(0.0, 0.0, 1.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_normal_at_center_is_degenerate() {
        let sphere = unit_sphere_at(-5.0);
        assert!(sphere.normal_at(&Point3::new(0.0, 0.0, -5.0)).is_err());
    }

    #[test]
    fn test_scene_yaml_round_trip_shape() {
        let yaml = r#"
spheres:
  - center: [0.0, 0.0, -5.0]
    radius: 1.0
    material:
      color: [0.5, 0.5, 0.5]
      specular_exponent: 20.0
      reflectivity: 0.1
lights:
  - position: [10.0, 10.0, 10.0]
    intensity: 1.0
"#;
        let scene: Scene = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scene.spheres.len(), 1);
        assert_eq!(scene.spheres[0].center, Point3::new(0.0, 0.0, -5.0));
        assert_eq!(scene.lights[0].intensity, 1.0);
    }
}
