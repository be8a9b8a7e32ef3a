//! Vector helpers on top of nalgebra
//!
//! Arithmetic is nalgebra's; this module adds the checked normalization the
//! renderer relies on so a zero-length vector never turns into NaN pixels.

use nalgebra::Vector3;

use crate::renderer::RenderError;

/// Three-component float vector used for directions, normals and colors
pub type Vec3 = Vector3<f32>;

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    a + b
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    a - b
}

pub fn scale(a: &Vec3, k: f32) -> Vec3 {
    a * k
}

pub fn dot(a: &Vec3, b: &Vec3) -> f32 {
    a.dot(b)
}

/// Scale `v` to unit length.
///
/// Fails with [`RenderError::DegenerateVector`] only for the zero vector or a
/// vector with a non-finite component. Multiplies by the reciprocal magnitude
/// rather than dividing each component; rendered bytes depend on that
/// rounding.
pub fn normalize(v: &Vec3) -> Result<Vec3, RenderError> {
    let mag = v.dot(v).sqrt();
    if mag > 0.0 && mag.is_finite() {
        return Ok(v * (1.0 / mag));
    }

    let largest = v.amax();
    if largest == 0.0 || !v.iter().all(|c| c.is_finite()) {
        return Err(RenderError::DegenerateVector {
            x: v.x,
            y: v.y,
            z: v.z,
        });
    }

    // Squared magnitude over- or underflowed: bring the largest component to 1
    let scaled = v * (1.0 / largest);
    let mag = scaled.dot(&scaled).sqrt();
    Ok(scaled * (1.0 / mag))
}

/// Reflect `i` about the normal `n`
pub fn reflect(i: &Vec3, n: &Vec3) -> Vec3 {
    i - n * 2.0 * i.dot(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(add(&a, &b), Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(sub(&b, &a), Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(scale(&a, 2.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(dot(&a, &b), 32.0);
    }

    #[test]
    fn test_normalize_unit_length() {
        let n = normalize(&Vec3::new(3.0, 0.0, 4.0)).unwrap();
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.z - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let result = normalize(&Vec3::zeros());
        assert!(matches!(result, Err(RenderError::DegenerateVector { .. })));
    }

    #[test]
    fn test_normalize_huge_components() {
        // 3e19 squared overflows f32
        let n = normalize(&Vec3::new(0.0, 0.0, 3.0e19)).unwrap();
        assert!((n - Vec3::new(0.0, 0.0, 1.0)).magnitude() < 1e-6);

        let n = normalize(&Vec3::new(-3.0e30, 4.0e30, 0.0)).unwrap();
        assert!((n - Vec3::new(-0.6, 0.8, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_normalize_tiny_components() {
        // 1e-30 squared underflows to zero
        let n = normalize(&Vec3::new(1.0e-30, 0.0, 0.0)).unwrap();
        assert!((n - Vec3::new(1.0, 0.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_normalize_non_finite() {
        let result = normalize(&Vec3::new(f32::NAN, 1.0, 0.0));
        assert!(result.is_err());

        let result = normalize(&Vec3::new(f32::INFINITY, 0.0, 0.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let n = Vec3::new(0.0, 1.0, 0.0);
        let r = reflect(&v, &n);
        assert!((r.x - 1.0).abs() < 0.001);
        assert!((r.y - 1.0).abs() < 0.001);
    }
}
