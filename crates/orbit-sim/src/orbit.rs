//! Circular orbit propagation.

use orbit_links::Vector;

/// A circular orbit around the origin.
///
/// The orbital plane is the equatorial plane tilted by `inclination` about the
/// x axis, then rotated by `raan` about the z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularOrbit {
    pub radius: f64,
    /// Radians
    pub inclination: f64,
    /// Right ascension of the ascending node, radians
    pub raan: f64,
    /// Current angle along the orbit, radians
    pub phase: f64,
}

impl CircularOrbit {
    /// Angles are in radians.
    pub fn new(radius: f64, inclination: f64, raan: f64, phase: f64) -> Self {
        Self {
            radius,
            inclination,
            raan,
            phase,
        }
    }

    /// Advance along the orbit by `delta` radians.
    pub fn advance(&mut self, delta: f64) {
        self.phase = (self.phase + delta).rem_euclid(std::f64::consts::TAU);
    }

    /// Current position.
    pub fn position(&self) -> Vector {
        let (sin_u, cos_u) = self.phase.sin_cos();
        let (sin_i, cos_i) = self.inclination.sin_cos();
        let (sin_o, cos_o) = self.raan.sin_cos();

        // In-plane position, tilted about x
        let x = self.radius * cos_u;
        let y = self.radius * sin_u * cos_i;
        let z = self.radius * sin_u * sin_i;

        // Rotate about z
        Vector::new(x * cos_o - y * sin_o, x * sin_o + y * cos_o, z)
    }
}
