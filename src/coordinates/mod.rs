//! Equatorial directions and spherical/Cartesian conversions
//!
//! Directions are carried through the astrometric pipeline as nalgebra
//! `Vector3<f64>` unit vectors and only turned back into angles at the edges.

pub mod spherical;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::constants::TAU;

pub use spherical::{pv_to_spherical, spherical_to_pv, SphericalMotion};

/// Normalize an angle into the range [0, 2π)
pub fn normalize_angle(angle: f64) -> f64 {
    let w = angle % TAU;
    if w < 0.0 {
        w + TAU
    } else {
        w
    }
}

/// Normalize an angle into the range (-π, π]
pub fn normalize_angle_signed(angle: f64) -> f64 {
    let mut w = angle % TAU;
    if w.abs() >= PI {
        w -= TAU.copysign(angle);
    }
    w
}

// Equatorial coordinates (RA/Dec)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    pub ra: f64,  // Right ascension in radians
    pub dec: f64, // Declination in radians
}

impl Equatorial {
    pub fn new(ra: f64, dec: f64) -> Self {
        Equatorial {
            ra: normalize_angle(ra),
            dec,
        }
    }

    /// Create a new Equatorial coordinate with values in degrees
    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(ra_deg.to_radians(), dec_deg.to_radians())
    }

    /// Get right ascension in degrees
    pub fn ra_degrees(&self) -> f64 {
        self.ra.to_degrees()
    }

    /// Get declination in degrees
    pub fn dec_degrees(&self) -> f64 {
        self.dec.to_degrees()
    }

    /// Unit vector pointing toward this direction
    pub fn to_unit_vector(&self) -> Vector3<f64> {
        let (sin_ra, cos_ra) = self.ra.sin_cos();
        let (sin_dec, cos_dec) = self.dec.sin_cos();
        Vector3::new(cos_ra * cos_dec, sin_ra * cos_dec, sin_dec)
    }

    /// Direction of an arbitrary (not necessarily unit) vector
    ///
    /// The null vector and vectors along the pole map to RA = 0.
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        let d2 = v.x * v.x + v.y * v.y;
        let ra = if d2 == 0.0 { 0.0 } else { v.y.atan2(v.x) };
        let dec = if v.z == 0.0 { 0.0 } else { v.z.atan2(d2.sqrt()) };
        Self::new(ra, dec)
    }

    /// Calculate angular distance to another Equatorial coordinate in radians
    pub fn angular_distance(&self, other: &Equatorial) -> f64 {
        let a = self.to_unit_vector();
        let b = other.to_unit_vector();
        // atan2 of |a x b| and a.b stays accurate for tiny and near-π separations
        a.cross(&b).norm().atan2(a.dot(&b))
    }
}
