//! Cartesian position vectors.
//!
//! Positions are compared with exact component-wise equality. The protocol's
//! position cache relies on this: any movement at all, however small, is a
//! cache miss.

use std::ops::{Add, Mul, Neg, Sub};

/// A position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    /// Origin of the coordinate system.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Create a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Dot product.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean distance between two positions.
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }
}

impl Add for Vector {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    #[inline]
    fn mul(self, k: f64) -> Self {
        Self {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
        }
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(4.0, 6.0, 3.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn equality_is_exact() {
        let a = Vector::new(1.0, 0.0, 0.0);
        let b = Vector::new(1.0 + f64::EPSILON, 0.0, 0.0);
        assert_ne!(a, b);
        assert_eq!(a, Vector::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn arithmetic() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(4.0, -1.0, 2.0);

        assert_eq!(a + b, Vector::new(5.0, 1.0, 5.0));
        assert_eq!(a - b, Vector::new(-3.0, 3.0, 1.0));
        assert_eq!(a + (-b), a - b);
        assert_eq!(a * 2.0, Vector::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn norm_of_zero() {
        assert_eq!(Vector::ZERO.norm(), 0.0);
    }
}
