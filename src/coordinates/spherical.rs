//! Spherical position-and-rate conversions
//!
//! Converts between a spherical description of a moving point (longitude,
//! latitude, distance and their time derivatives) and a Cartesian
//! position-velocity pair. The units of the rates carry straight through:
//! radians per day in gives AU per day out when the distance is in AU.

use nalgebra::Vector3;

/// Spherical coordinates of a point together with their rates of change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalMotion {
    /// Longitude angle (radians), e.g. right ascension
    pub longitude: f64,
    /// Latitude angle (radians), e.g. declination
    pub latitude: f64,
    /// Radial distance
    pub distance: f64,
    /// Rate of change of longitude (radians per unit time)
    pub longitude_rate: f64,
    /// Rate of change of latitude (radians per unit time)
    pub latitude_rate: f64,
    /// Rate of change of distance
    pub distance_rate: f64,
}

/// Convert spherical position and rates to a Cartesian position-velocity pair
pub fn spherical_to_pv(motion: &SphericalMotion) -> (Vector3<f64>, Vector3<f64>) {
    let (sl, cl) = motion.longitude.sin_cos();
    let (sb, cb) = motion.latitude.sin_cos();
    let r = motion.distance;

    let rcb = r * cb;
    let x = rcb * cl;
    let y = rcb * sl;
    let rpd = r * motion.latitude_rate;
    let w = rpd * sb - cb * motion.distance_rate;

    let position = Vector3::new(x, y, r * sb);
    let velocity = Vector3::new(
        -y * motion.longitude_rate - w * cl,
        x * motion.longitude_rate - w * sl,
        rpd * cb + sb * motion.distance_rate,
    );
    (position, velocity)
}

/// Convert a Cartesian position-velocity pair to spherical position and rates
///
/// Longitude is returned in (-π, π]. At the pole the longitude and both
/// angular rates are zero. A null position is handled by taking the direction
/// of motion as the direction of the point, with the distance left at zero.
pub fn pv_to_spherical(position: &Vector3<f64>, velocity: &Vector3<f64>) -> SphericalMotion {
    let (xd, yd, zd) = (velocity.x, velocity.y, velocity.z);
    let mut x = position.x;
    let mut y = position.y;
    let mut z = position.z;

    let mut rxy2 = x * x + y * y;
    let mut r2 = rxy2 + z * z;
    let rtrue = r2.sqrt();

    let mut rw = rtrue;
    if rtrue == 0.0 {
        x = xd;
        y = yd;
        z = zd;
        rxy2 = x * x + y * y;
        r2 = rxy2 + z * z;
        rw = r2.sqrt();
    }

    let rxy = rxy2.sqrt();
    let xyp = x * xd + y * yd;

    let (longitude, latitude, longitude_rate, latitude_rate) = if rxy2 != 0.0 {
        (
            y.atan2(x),
            z.atan2(rxy),
            (x * yd - y * xd) / rxy2,
            (zd * rxy2 - z * xyp) / (r2 * rxy),
        )
    } else {
        let latitude = if z != 0.0 { z.atan2(rxy) } else { 0.0 };
        (0.0, latitude, 0.0, 0.0)
    };

    SphericalMotion {
        longitude,
        latitude,
        distance: rtrue,
        longitude_rate,
        latitude_rate,
        distance_rate: if rw != 0.0 { (xyp + z * zd) / rw } else { 0.0 },
    }
}
