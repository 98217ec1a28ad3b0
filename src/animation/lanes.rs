use glam::Vec3;

/// Arithmetic backend the animation math is written against.
///
/// The same generic function instantiated with [`CpuLanes`] computes values
/// directly; instantiated with the WGSL backend it records shader statements.
pub trait Lanes {
    type Scalar: Clone;
    type Vector: Clone;

    fn scalar(&self, value: f32) -> Self::Scalar;
    fn vector(&self, value: Vec3) -> Self::Vector;

    fn add(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;
    fn sub(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;
    fn mul(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;
    fn div(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;
    fn clamp(&self, x: &Self::Scalar, lo: &Self::Scalar, hi: &Self::Scalar) -> Self::Scalar;
    fn sin(&self, x: &Self::Scalar) -> Self::Scalar;
    fn cos(&self, x: &Self::Scalar) -> Self::Scalar;
    fn sign(&self, x: &Self::Scalar) -> Self::Scalar;

    fn y(&self, v: &Self::Vector) -> Self::Scalar;
    fn vadd(&self, a: &Self::Vector, b: &Self::Vector) -> Self::Vector;
    fn vsub(&self, a: &Self::Vector, b: &Self::Vector) -> Self::Vector;
    fn vscale(&self, v: &Self::Vector, s: &Self::Scalar) -> Self::Vector;
    fn cross(&self, a: &Self::Vector, b: &Self::Vector) -> Self::Vector;
    /// Unit vector, or zero when `v` has (near) zero length
    fn normalize_or_zero(&self, v: &Self::Vector) -> Self::Vector;
}

/// Squared length below which a vector normalizes to zero
pub const NORMALIZE_EPSILON: f32 = 1e-30;

/// Direct evaluation on `f32` / `glam::Vec3`
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuLanes;

impl Lanes for CpuLanes {
    type Scalar = f32;
    type Vector = Vec3;

    #[inline]
    fn scalar(&self, value: f32) -> f32 {
        value
    }

    #[inline]
    fn vector(&self, value: Vec3) -> Vec3 {
        value
    }

    #[inline]
    fn add(&self, a: &f32, b: &f32) -> f32 {
        a + b
    }

    #[inline]
    fn sub(&self, a: &f32, b: &f32) -> f32 {
        a - b
    }

    #[inline]
    fn mul(&self, a: &f32, b: &f32) -> f32 {
        a * b
    }

    #[inline]
    fn div(&self, a: &f32, b: &f32) -> f32 {
        a / b
    }

    #[inline]
    fn clamp(&self, x: &f32, lo: &f32, hi: &f32) -> f32 {
        // f32::clamp panics on NaN bounds
        x.max(*lo).min(*hi)
    }

    #[inline]
    fn sin(&self, x: &f32) -> f32 {
        x.sin()
    }

    #[inline]
    fn cos(&self, x: &f32) -> f32 {
        x.cos()
    }

    #[inline]
    fn sign(&self, x: &f32) -> f32 {
        // WGSL sign(0.0) is 0.0, f32::signum(0.0) is 1.0
        if *x > 0.0 {
            1.0
        } else if *x < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn y(&self, v: &Vec3) -> f32 {
        v.y
    }

    #[inline]
    fn vadd(&self, a: &Vec3, b: &Vec3) -> Vec3 {
        *a + *b
    }

    #[inline]
    fn vsub(&self, a: &Vec3, b: &Vec3) -> Vec3 {
        *a - *b
    }

    #[inline]
    fn vscale(&self, v: &Vec3, s: &f32) -> Vec3 {
        *v * *s
    }

    #[inline]
    fn cross(&self, a: &Vec3, b: &Vec3) -> Vec3 {
        a.cross(*b)
    }

    #[inline]
    fn normalize_or_zero(&self, v: &Vec3) -> Vec3 {
        *v * v.length_squared().max(NORMALIZE_EPSILON).sqrt().recip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(CpuLanes.sign(&0.0), 0.0);
        assert_eq!(CpuLanes.sign(&2.5), 1.0);
        assert_eq!(CpuLanes.sign(&-0.1), -1.0);
    }

    #[test]
    fn normalize_zero_vector_stays_zero() {
        assert_eq!(CpuLanes.normalize_or_zero(&Vec3::ZERO), Vec3::ZERO);
        let n = CpuLanes.normalize_or_zero(&Vec3::new(3.0, 0.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}
